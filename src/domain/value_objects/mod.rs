pub mod alert_action;
pub mod alert_identity;
pub mod log_view;
pub mod service_state;
pub mod severity;

pub use alert_action::{ActionKind, ActionTokenError, AlertAction};
pub use alert_identity::AlertIdentity;
pub use log_view::{LogLevelFilter, LogViewError, LogWindow};
pub use service_state::ServiceState;
pub use severity::Severity;
