//! # flock-core
//!
//! Domain layer containing entities, value objects, the capability model,
//! and repository traits. This crate has zero dependencies on infrastructure
//! (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Duty, DutyKind, FieldServiceReport, Group, Member, MemberLocation, PushKeys,
    PushSubscription, SmsLog, Territory, TerritoryAnalytics, TerritoryAssignment,
};
pub use error::DomainError;
pub use traits::{
    AssignmentRepository, DutyRepository, GroupRepository, HealthProbe, MemberRepository,
    PushSubscriptionRepository, RepoResult, ReportRepository, SessionRecord, SessionStore,
    SmsLogRepository, TerritoryRepository,
};
pub use value_objects::{
    AssignmentId, Capabilities, DutyId, GeoLocation, GroupId, IdParseError, MemberId, ReportId,
    Role, ServiceMonth, SmsLogId, SubscriptionId, TerritoryId,
};
