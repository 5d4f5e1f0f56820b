//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation (PostgreSQL in production, in-memory in tests).

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{
    Duty, FieldServiceReport, Group, Member, MemberLocation, PushSubscription, SmsLog, Territory,
    TerritoryAssignment,
};
use crate::error::DomainError;
use crate::value_objects::{
    AssignmentId, DutyId, GroupId, MemberId, ServiceMonth, SubscriptionId, TerritoryId,
};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Member Repository
// ============================================================================

#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Find member by ID
    async fn find_by_id(&self, id: MemberId) -> RepoResult<Option<Member>>;

    /// Find member by login email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Member>>;

    /// List members ordered by name
    async fn list(&self, limit: i64, offset: i64) -> RepoResult<Vec<Member>>;

    /// Members whose latitude and longitude are both set, at most `limit`
    async fn find_with_location(&self, limit: i64) -> RepoResult<Vec<MemberLocation>>;

    /// Members with a non-empty phone number
    async fn find_with_phone(&self) -> RepoResult<Vec<Member>>;

    /// Members belonging to a group
    async fn find_by_group(&self, group_id: GroupId) -> RepoResult<Vec<Member>>;

    /// Check if email is already taken
    async fn email_exists(&self, email: &str) -> RepoResult<bool>;

    /// Create a new member, optionally with login credentials
    async fn create(&self, member: &Member, password_hash: Option<&str>) -> RepoResult<()>;

    /// Update an existing member
    async fn update(&self, member: &Member) -> RepoResult<()>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: MemberId) -> RepoResult<Option<String>>;
}

// ============================================================================
// Group Repository
// ============================================================================

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn find_by_id(&self, id: GroupId) -> RepoResult<Option<Group>>;

    /// List every group ordered by name
    async fn list_all(&self) -> RepoResult<Vec<Group>>;

    /// Groups the member belongs to or leads
    async fn find_for_member(&self, member_id: MemberId) -> RepoResult<Vec<Group>>;

    async fn create(&self, group: &Group) -> RepoResult<()>;

    async fn update(&self, group: &Group) -> RepoResult<()>;
}

// ============================================================================
// Territory Repositories
// ============================================================================

#[async_trait]
pub trait TerritoryRepository: Send + Sync {
    async fn find_by_id(&self, id: TerritoryId) -> RepoResult<Option<Territory>>;

    /// List every territory ordered by number
    async fn list_all(&self) -> RepoResult<Vec<Territory>>;

    /// Create a territory, failing with a conflict if the number is taken
    async fn create(&self, territory: &Territory) -> RepoResult<()>;
}

#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    async fn find_by_id(&self, id: AssignmentId) -> RepoResult<Option<TerritoryAssignment>>;

    /// Full assignment history, newest first
    async fn list_all(&self) -> RepoResult<Vec<TerritoryAssignment>>;

    /// The open assignment for a territory, if checked out
    async fn find_open(&self, territory_id: TerritoryId)
        -> RepoResult<Option<TerritoryAssignment>>;

    /// Check out a territory
    ///
    /// Fails with `TerritoryAlreadyAssigned` if it already has an open assignment.
    async fn create(&self, assignment: &TerritoryAssignment) -> RepoResult<()>;

    /// Record the return of a territory
    async fn complete(&self, id: AssignmentId, at: DateTime<Utc>) -> RepoResult<()>;
}

// ============================================================================
// Duty Repository
// ============================================================================

#[async_trait]
pub trait DutyRepository: Send + Sync {
    /// Duties scheduled within `[from, to]`, ordered by date
    async fn list_between(&self, from: NaiveDate, to: NaiveDate) -> RepoResult<Vec<Duty>>;

    async fn create(&self, duty: &Duty) -> RepoResult<()>;

    /// Remove a scheduled duty
    async fn delete(&self, id: DutyId) -> RepoResult<()>;
}

// ============================================================================
// Report Repository
// ============================================================================

#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Store a report, failing with a conflict if one exists for the member and month
    async fn create(&self, report: &FieldServiceReport) -> RepoResult<()>;

    async fn find_for_member(
        &self,
        member_id: MemberId,
        month: ServiceMonth,
    ) -> RepoResult<Option<FieldServiceReport>>;

    /// All reports for a month
    async fn find_by_month(&self, month: ServiceMonth) -> RepoResult<Vec<FieldServiceReport>>;
}

// ============================================================================
// Push Subscription Repository
// ============================================================================

#[async_trait]
pub trait PushSubscriptionRepository: Send + Sync {
    /// Create or replace the member's single subscription
    ///
    /// Resets `created_at`/`last_used` and reactivates it. Returns the stored
    /// record, whose id is stable across replacements.
    async fn upsert(&self, subscription: &PushSubscription) -> RepoResult<PushSubscription>;

    /// Refresh `last_used` on success, deactivate on failure
    async fn record_send_result(
        &self,
        id: SubscriptionId,
        success: bool,
        at: DateTime<Utc>,
    ) -> RepoResult<()>;

    /// Active subscriptions, optionally for a single member
    async fn list_active(&self, member_id: Option<MemberId>) -> RepoResult<Vec<PushSubscription>>;

    /// The member's subscription regardless of state
    async fn find_by_member(&self, member_id: MemberId) -> RepoResult<Option<PushSubscription>>;
}

// ============================================================================
// SMS Log Repository
// ============================================================================

#[async_trait]
pub trait SmsLogRepository: Send + Sync {
    /// Append an entry; entries are never updated or deleted
    async fn append(&self, entry: &SmsLog) -> RepoResult<()>;

    /// Entries for exactly this recipient and month
    async fn find_by_recipient_and_month(
        &self,
        recipient_id: MemberId,
        month: ServiceMonth,
    ) -> RepoResult<Vec<SmsLog>>;

    /// Entries for a month, newest first
    async fn find_by_month(&self, month: ServiceMonth) -> RepoResult<Vec<SmsLog>>;
}

// ============================================================================
// Session Store
// ============================================================================

/// Refresh-token session as kept by the session store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub member_id: MemberId,
    pub session_id: String,
    /// Unix epoch seconds
    pub created_at: i64,
}

impl SessionRecord {
    pub fn new(member_id: MemberId, session_id: String) -> Self {
        Self {
            member_id,
            session_id,
            created_at: Utc::now().timestamp(),
        }
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Remember a refresh token
    async fn store(&self, token_id: &str, session: &SessionRecord) -> RepoResult<()>;

    /// Session for a token that is still live
    async fn validate(&self, token_id: &str) -> RepoResult<Option<SessionRecord>>;

    /// Forget a token; returns whether it existed
    async fn revoke(&self, token_id: &str) -> RepoResult<bool>;

    /// Forget every token of a member; returns how many were dropped
    async fn revoke_all_for_member(&self, member_id: MemberId) -> RepoResult<u32>;
}

// ============================================================================
// Health
// ============================================================================

/// A dependency that readiness checks can ping
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Component name shown in the readiness report
    fn name(&self) -> &'static str;

    async fn check(&self) -> RepoResult<()>;
}
