pub mod bot;
pub mod cli;
