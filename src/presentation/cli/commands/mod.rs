pub mod audit;
pub mod check;
pub mod daemon;
pub mod logs;
pub mod restart;
pub mod status;
pub mod targets;
