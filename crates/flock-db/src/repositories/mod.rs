//! Repository implementations

mod duty;
mod error;
mod group;
mod member;
mod report;
mod sms_log;
mod subscription;
mod territory;

pub use duty::PgDutyRepository;
pub use error::{map_db_error, map_foreign_key_violation, map_unique_violation};
pub use group::PgGroupRepository;
pub use member::PgMemberRepository;
pub use report::PgReportRepository;
pub use sms_log::PgSmsLogRepository;
pub use subscription::PgPushSubscriptionRepository;
pub use territory::{PgAssignmentRepository, PgTerritoryRepository};
