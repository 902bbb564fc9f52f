pub mod composite;
pub mod html;
pub mod telegram;
pub mod terminal;
