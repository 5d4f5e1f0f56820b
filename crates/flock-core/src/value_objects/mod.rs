//! Value objects - immutable types that represent domain concepts

mod capabilities;
mod geo;
mod ids;
mod role;
mod service_month;

pub use capabilities::Capabilities;
pub use geo::GeoLocation;
pub use ids::{
    AssignmentId, DutyId, GroupId, IdParseError, MemberId, ReportId, SmsLogId, SubscriptionId,
    TerritoryId,
};
pub use role::{Role, RoleParseError};
pub use service_month::{ServiceMonth, ServiceMonthParseError};
