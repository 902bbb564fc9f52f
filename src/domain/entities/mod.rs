pub mod alert;
pub mod health;
pub mod host;
pub mod report;
pub mod target;

pub use alert::{AlertKind, AlertRecord, CandidateAlert};
pub use health::HealthSample;
pub use host::{HostSnapshot, RootDisk};
pub use report::{ActionReport, ActionStatus};
pub use target::{Target, TargetError, TargetSet};
