pub mod command;
pub mod systemctl;
