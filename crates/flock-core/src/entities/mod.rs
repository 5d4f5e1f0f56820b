//! Domain entities - core business objects

mod duty;
mod group;
mod member;
mod report;
mod sms_log;
mod subscription;
mod territory;

pub use duty::{Duty, DutyKind};
pub use group::Group;
pub use member::{Member, MemberLocation};
pub use report::{FieldServiceReport, MAX_MONTHLY_HOURS};
pub use sms_log::SmsLog;
pub use subscription::{PushKeys, PushSubscription};
pub use territory::{
    Territory, TerritoryAnalytics, TerritoryAssignment, COMPLETION_WINDOW_DAYS,
    OVERDUE_AFTER_DAYS,
};
