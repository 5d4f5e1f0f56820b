//! Ports implemented by the infrastructure crates

mod repositories;

pub use repositories::{
    AssignmentRepository, DutyRepository, GroupRepository, HealthProbe, MemberRepository,
    PushSubscriptionRepository, RepoResult, ReportRepository, SessionRecord, SessionStore,
    SmsLogRepository, TerritoryRepository,
};
