pub mod actions;
pub mod probe;
pub mod selection;
pub mod suppression;
pub mod watchdog;
