pub mod disk_collector;
pub mod journal_collector;
pub mod sysinfo_collector;
