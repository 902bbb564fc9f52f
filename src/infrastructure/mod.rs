pub mod collectors;
pub mod notifications;
pub mod os;
pub mod persistence;
pub mod telegram;
