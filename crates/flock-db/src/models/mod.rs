//! Database models - SQLx-compatible structs for PostgreSQL tables

mod member;
mod notification;
mod schedule;
mod territory;

pub use member::{GroupModel, MemberLocationModel, MemberModel};
pub use notification::{PushSubscriptionModel, SmsLogModel};
pub use schedule::{DutyModel, ReportModel};
pub use territory::{AssignmentModel, TerritoryModel};
