pub mod collector;
pub mod log_source;
pub mod notifier;
pub mod service_manager;
pub mod store;

pub use collector::{CollectionError, HostCollector};
pub use log_source::{LogError, LogSource};
pub use notifier::{NotificationError, Notifier};
pub use service_manager::{ServiceError, ServiceManager};
pub use store::{AuditLogStore, AuditRecord, SelectionStore, StoreError};
