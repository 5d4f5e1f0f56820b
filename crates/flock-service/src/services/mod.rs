//! Business logic services
//!
//! Every service borrows the shared [`ServiceContext`] and takes the acting
//! member explicitly. Privileged calls pass the permission gate before any
//! storage access.

pub mod auth;
pub mod context;
pub mod duty;
pub mod error;
pub mod group;
pub mod health;
pub mod member;
pub mod notification;
pub mod report;
pub mod sms;
pub mod subscription;
pub mod territory;

pub use auth::AuthService;
pub use context::{ServiceContext, ServiceContextBuilder, ServiceSettings};
pub use duty::DutyService;
pub use error::{ServiceError, ServiceResult};
pub use group::GroupService;
pub use health::HealthService;
pub use member::MemberService;
pub use notification::NotificationService;
pub use report::ReportService;
pub use sms::SmsService;
pub use subscription::SubscriptionService;
pub use territory::TerritoryService;
