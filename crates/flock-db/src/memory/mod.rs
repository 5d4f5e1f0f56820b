//! In-memory storage backend
//!
//! Implements every repository trait over plain maps so services and HTTP
//! handlers can be exercised without PostgreSQL. Latency and outages can be
//! injected to drive timeout and data-access error paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;

use flock_core::entities::{
    Duty, FieldServiceReport, Group, Member, MemberLocation, PushSubscription, SmsLog, Territory,
    TerritoryAssignment,
};
use flock_core::error::DomainError;
use flock_core::traits::{
    AssignmentRepository, DutyRepository, GroupRepository, HealthProbe, MemberRepository,
    PushSubscriptionRepository, RepoResult, ReportRepository, SmsLogRepository,
    TerritoryRepository,
};
use flock_core::value_objects::{
    AssignmentId, DutyId, GroupId, MemberId, ServiceMonth, SubscriptionId, TerritoryId,
};

#[derive(Default)]
struct Tables {
    members: HashMap<MemberId, Member>,
    password_hashes: HashMap<MemberId, String>,
    groups: HashMap<GroupId, Group>,
    territories: HashMap<TerritoryId, Territory>,
    assignments: HashMap<AssignmentId, TerritoryAssignment>,
    duties: HashMap<DutyId, Duty>,
    reports: Vec<FieldServiceReport>,
    subscriptions: HashMap<MemberId, PushSubscription>,
    sms_logs: Vec<SmsLog>,
}

/// Thread-safe in-memory store
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    latency_ms: AtomicU64,
    unavailable: AtomicBool,
    sms_log_writes_fail: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`
    pub fn set_latency(&self, latency: Duration) {
        let ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.latency_ms.store(ms, Ordering::Relaxed);
    }

    /// Make every call fail as if the database were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    /// Make SMS log appends fail while reads keep working
    pub fn set_sms_log_writes_fail(&self, fail: bool) {
        self.sms_log_writes_fail.store(fail, Ordering::Relaxed);
    }

    /// Insert a member directly, bypassing uniqueness checks
    pub fn seed_member(&self, member: Member, password_hash: Option<String>) {
        let mut tables = self.tables.write();
        if let Some(hash) = password_hash {
            tables.password_hashes.insert(member.id, hash);
        }
        tables.members.insert(member.id, member);
    }

    pub fn member_count(&self) -> usize {
        self.tables.read().members.len()
    }

    async fn enter(&self) -> RepoResult<()> {
        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(DomainError::DatabaseError(
                "connection refused: storage unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

fn email_matches(member: &Member, email: &str) -> bool {
    member
        .email
        .as_deref()
        .is_some_and(|e| e.eq_ignore_ascii_case(email))
}

fn sorted_by_name(mut members: Vec<Member>) -> Vec<Member> {
    members.sort_by(|a, b| a.full_name.cmp(&b.full_name));
    members
}

#[async_trait]
impl MemberRepository for MemoryStore {
    async fn find_by_id(&self, id: MemberId) -> RepoResult<Option<Member>> {
        self.enter().await?;
        Ok(self.tables.read().members.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Member>> {
        self.enter().await?;
        let tables = self.tables.read();
        Ok(tables
            .members
            .values()
            .find(|m| email_matches(m, email))
            .cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> RepoResult<Vec<Member>> {
        self.enter().await?;
        let all = sorted_by_name(self.tables.read().members.values().cloned().collect());
        Ok(all
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn find_with_location(&self, limit: i64) -> RepoResult<Vec<MemberLocation>> {
        self.enter().await?;
        let all = sorted_by_name(self.tables.read().members.values().cloned().collect());
        Ok(all
            .iter()
            .filter_map(Member::located)
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn find_with_phone(&self) -> RepoResult<Vec<Member>> {
        self.enter().await?;
        let tables = self.tables.read();
        Ok(sorted_by_name(
            tables
                .members
                .values()
                .filter(|m| m.is_reachable_by_sms())
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_group(&self, group_id: GroupId) -> RepoResult<Vec<Member>> {
        self.enter().await?;
        let tables = self.tables.read();
        Ok(sorted_by_name(
            tables
                .members
                .values()
                .filter(|m| m.group_id == Some(group_id))
                .cloned()
                .collect(),
        ))
    }

    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        self.enter().await?;
        Ok(self
            .tables
            .read()
            .members
            .values()
            .any(|m| email_matches(m, email)))
    }

    async fn create(&self, member: &Member, password_hash: Option<&str>) -> RepoResult<()> {
        self.enter().await?;
        let mut tables = self.tables.write();
        if let Some(email) = member.email.as_deref() {
            if tables.members.values().any(|m| email_matches(m, email)) {
                return Err(DomainError::EmailAlreadyExists);
            }
        }
        if let Some(group_id) = member.group_id {
            if !tables.groups.contains_key(&group_id) {
                return Err(DomainError::GroupNotFound(group_id));
            }
        }
        if let Some(hash) = password_hash {
            tables.password_hashes.insert(member.id, hash.to_string());
        }
        tables.members.insert(member.id, member.clone());
        Ok(())
    }

    async fn update(&self, member: &Member) -> RepoResult<()> {
        self.enter().await?;
        let mut tables = self.tables.write();
        if !tables.members.contains_key(&member.id) {
            return Err(DomainError::MemberNotFound(member.id));
        }
        if let Some(email) = member.email.as_deref() {
            if tables
                .members
                .values()
                .any(|m| m.id != member.id && email_matches(m, email))
            {
                return Err(DomainError::EmailAlreadyExists);
            }
        }
        if let Some(group_id) = member.group_id {
            if !tables.groups.contains_key(&group_id) {
                return Err(DomainError::GroupNotFound(group_id));
            }
        }
        tables.members.insert(member.id, member.clone());
        Ok(())
    }

    async fn get_password_hash(&self, id: MemberId) -> RepoResult<Option<String>> {
        self.enter().await?;
        Ok(self.tables.read().password_hashes.get(&id).cloned())
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn find_by_id(&self, id: GroupId) -> RepoResult<Option<Group>> {
        self.enter().await?;
        Ok(self.tables.read().groups.get(&id).cloned())
    }

    async fn list_all(&self) -> RepoResult<Vec<Group>> {
        self.enter().await?;
        let mut groups: Vec<Group> = self.tables.read().groups.values().cloned().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn find_for_member(&self, member_id: MemberId) -> RepoResult<Vec<Group>> {
        self.enter().await?;
        let tables = self.tables.read();
        let own_group = tables.members.get(&member_id).and_then(|m| m.group_id);
        let mut groups: Vec<Group> = tables
            .groups
            .values()
            .filter(|g| g.is_led_by(member_id) || Some(g.id) == own_group)
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn create(&self, group: &Group) -> RepoResult<()> {
        self.enter().await?;
        self.tables.write().groups.insert(group.id, group.clone());
        Ok(())
    }

    async fn update(&self, group: &Group) -> RepoResult<()> {
        self.enter().await?;
        let mut tables = self.tables.write();
        match tables.groups.get_mut(&group.id) {
            Some(existing) => {
                *existing = group.clone();
                Ok(())
            }
            None => Err(DomainError::GroupNotFound(group.id)),
        }
    }
}

#[async_trait]
impl TerritoryRepository for MemoryStore {
    async fn find_by_id(&self, id: TerritoryId) -> RepoResult<Option<Territory>> {
        self.enter().await?;
        Ok(self.tables.read().territories.get(&id).cloned())
    }

    async fn list_all(&self) -> RepoResult<Vec<Territory>> {
        self.enter().await?;
        let mut territories: Vec<Territory> =
            self.tables.read().territories.values().cloned().collect();
        territories.sort_by(|a, b| {
            a.number
                .len()
                .cmp(&b.number.len())
                .then_with(|| a.number.cmp(&b.number))
        });
        Ok(territories)
    }

    async fn create(&self, territory: &Territory) -> RepoResult<()> {
        self.enter().await?;
        let mut tables = self.tables.write();
        if tables
            .territories
            .values()
            .any(|t| t.number == territory.number)
        {
            return Err(DomainError::TerritoryNumberExists(territory.number.clone()));
        }
        tables.territories.insert(territory.id, territory.clone());
        Ok(())
    }
}

#[async_trait]
impl AssignmentRepository for MemoryStore {
    async fn find_by_id(&self, id: AssignmentId) -> RepoResult<Option<TerritoryAssignment>> {
        self.enter().await?;
        Ok(self.tables.read().assignments.get(&id).cloned())
    }

    async fn list_all(&self) -> RepoResult<Vec<TerritoryAssignment>> {
        self.enter().await?;
        let mut all: Vec<TerritoryAssignment> =
            self.tables.read().assignments.values().cloned().collect();
        all.sort_by(|a, b| b.assigned_at.cmp(&a.assigned_at));
        Ok(all)
    }

    async fn find_open(
        &self,
        territory_id: TerritoryId,
    ) -> RepoResult<Option<TerritoryAssignment>> {
        self.enter().await?;
        Ok(self
            .tables
            .read()
            .assignments
            .values()
            .find(|a| a.territory_id == territory_id && a.is_open())
            .cloned())
    }

    async fn create(&self, assignment: &TerritoryAssignment) -> RepoResult<()> {
        self.enter().await?;
        let mut tables = self.tables.write();
        if !tables.territories.contains_key(&assignment.territory_id) {
            return Err(DomainError::TerritoryNotFound(assignment.territory_id));
        }
        if assignment.is_open()
            && tables
                .assignments
                .values()
                .any(|a| a.territory_id == assignment.territory_id && a.is_open())
        {
            return Err(DomainError::TerritoryAlreadyAssigned);
        }
        tables.assignments.insert(assignment.id, assignment.clone());
        Ok(())
    }

    async fn complete(&self, id: AssignmentId, at: DateTime<Utc>) -> RepoResult<()> {
        self.enter().await?;
        let mut tables = self.tables.write();
        match tables.assignments.get_mut(&id) {
            Some(assignment) if assignment.is_open() => {
                assignment.complete(at.max(assignment.assigned_at));
                Ok(())
            }
            _ => Err(DomainError::AssignmentNotFound),
        }
    }
}

#[async_trait]
impl DutyRepository for MemoryStore {
    async fn list_between(&self, from: NaiveDate, to: NaiveDate) -> RepoResult<Vec<Duty>> {
        self.enter().await?;
        let mut duties: Vec<Duty> = self
            .tables
            .read()
            .duties
            .values()
            .filter(|d| d.date >= from && d.date <= to)
            .cloned()
            .collect();
        duties.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.kind.as_str().cmp(b.kind.as_str()))
        });
        Ok(duties)
    }

    async fn create(&self, duty: &Duty) -> RepoResult<()> {
        self.enter().await?;
        let mut tables = self.tables.write();
        if !tables.members.contains_key(&duty.member_id) {
            return Err(DomainError::MemberNotFound(duty.member_id));
        }
        tables.duties.insert(duty.id, duty.clone());
        Ok(())
    }

    async fn delete(&self, id: DutyId) -> RepoResult<()> {
        self.enter().await?;
        self.tables
            .write()
            .duties
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::DutyNotFound)
    }
}

#[async_trait]
impl ReportRepository for MemoryStore {
    async fn create(&self, report: &FieldServiceReport) -> RepoResult<()> {
        self.enter().await?;
        let mut tables = self.tables.write();
        if tables
            .reports
            .iter()
            .any(|r| r.member_id == report.member_id && r.month == report.month)
        {
            return Err(DomainError::ReportAlreadySubmitted(report.month));
        }
        tables.reports.push(report.clone());
        Ok(())
    }

    async fn find_for_member(
        &self,
        member_id: MemberId,
        month: ServiceMonth,
    ) -> RepoResult<Option<FieldServiceReport>> {
        self.enter().await?;
        Ok(self
            .tables
            .read()
            .reports
            .iter()
            .find(|r| r.member_id == member_id && r.month == month)
            .cloned())
    }

    async fn find_by_month(&self, month: ServiceMonth) -> RepoResult<Vec<FieldServiceReport>> {
        self.enter().await?;
        Ok(self
            .tables
            .read()
            .reports
            .iter()
            .filter(|r| r.month == month)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PushSubscriptionRepository for MemoryStore {
    async fn upsert(&self, subscription: &PushSubscription) -> RepoResult<PushSubscription> {
        self.enter().await?;
        let mut tables = self.tables.write();
        if !tables.members.contains_key(&subscription.member_id) {
            return Err(DomainError::MemberNotFound(subscription.member_id));
        }
        let mut stored = subscription.clone();
        if let Some(existing) = tables.subscriptions.get(&subscription.member_id) {
            stored.id = existing.id;
        }
        stored.last_used = stored.created_at;
        stored.is_active = true;
        tables
            .subscriptions
            .insert(subscription.member_id, stored.clone());
        Ok(stored)
    }

    async fn record_send_result(
        &self,
        id: SubscriptionId,
        success: bool,
        at: DateTime<Utc>,
    ) -> RepoResult<()> {
        self.enter().await?;
        let mut tables = self.tables.write();
        let subscription = tables
            .subscriptions
            .values_mut()
            .find(|s| s.id == id)
            .ok_or(DomainError::SubscriptionNotFound(id))?;
        subscription.record_send_result(success, at);
        Ok(())
    }

    async fn list_active(&self, member_id: Option<MemberId>) -> RepoResult<Vec<PushSubscription>> {
        self.enter().await?;
        let mut active: Vec<PushSubscription> = self
            .tables
            .read()
            .subscriptions
            .values()
            .filter(|s| s.is_active && member_id.map_or(true, |m| s.member_id == m))
            .cloned()
            .collect();
        active.sort_by_key(|s| s.created_at);
        Ok(active)
    }

    async fn find_by_member(&self, member_id: MemberId) -> RepoResult<Option<PushSubscription>> {
        self.enter().await?;
        Ok(self.tables.read().subscriptions.get(&member_id).cloned())
    }
}

#[async_trait]
impl SmsLogRepository for MemoryStore {
    async fn append(&self, entry: &SmsLog) -> RepoResult<()> {
        self.enter().await?;
        if self.sms_log_writes_fail.load(Ordering::Relaxed) {
            return Err(DomainError::DatabaseError(
                "sms_logs: write rejected".to_string(),
            ));
        }
        self.tables.write().sms_logs.push(entry.clone());
        Ok(())
    }

    async fn find_by_recipient_and_month(
        &self,
        recipient_id: MemberId,
        month: ServiceMonth,
    ) -> RepoResult<Vec<SmsLog>> {
        self.enter().await?;
        Ok(self
            .tables
            .read()
            .sms_logs
            .iter()
            .rev()
            .filter(|e| e.recipient_id == recipient_id && e.month == month)
            .cloned()
            .collect())
    }

    async fn find_by_month(&self, month: ServiceMonth) -> RepoResult<Vec<SmsLog>> {
        self.enter().await?;
        Ok(self
            .tables
            .read()
            .sms_logs
            .iter()
            .rev()
            .filter(|e| e.month == month)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl HealthProbe for MemoryStore {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn check(&self) -> RepoResult<()> {
        self.enter().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flock_core::entities::PushKeys;
    use flock_core::value_objects::GeoLocation;

    fn member(name: &str) -> Member {
        Member::new(MemberId::new(), name.to_string())
    }

    #[tokio::test]
    async fn test_location_query_skips_unlocated_and_respects_limit() {
        let store = MemoryStore::new();
        for (i, name) in ["Cara", "Abe", "Bo"].iter().enumerate() {
            let mut m = member(name);
            m.location = Some(GeoLocation::new(10.0 + i as f64, 20.0).unwrap());
            store.seed_member(m, None);
        }
        store.seed_member(member("Dan"), None);

        let all = store.find_with_location(10).await.unwrap();
        let names: Vec<_> = all.iter().map(|m| m.full_name.as_str()).collect();
        assert_eq!(names, ["Abe", "Bo", "Cara"]);

        assert_eq!(store.find_with_location(2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        let mut a = member("A");
        a.email = Some("a@example.com".to_string());
        MemberRepository::create(&store, &a, Some("hash")).await.unwrap();

        let mut b = member("B");
        b.email = Some("A@Example.com".to_string());
        let err = MemberRepository::create(&store, &b, None).await.unwrap_err();
        assert!(matches!(err, DomainError::EmailAlreadyExists));
        assert_eq!(
            store.get_password_hash(a.id).await.unwrap().as_deref(),
            Some("hash")
        );
    }

    #[tokio::test]
    async fn test_email_lookup_ignores_case() {
        let store = MemoryStore::new();
        let mut m = member("Lydia");
        m.email = Some("lydia@example.com".to_string());
        MemberRepository::create(&store, &m, None).await.unwrap();

        let found = store.find_by_email("Lydia@Example.COM").await.unwrap();
        assert_eq!(found.map(|f| f.id), Some(m.id));
        assert!(store.email_exists("LYDIA@example.com").await.unwrap());
        assert!(!store.email_exists("lydia@example.org").await.unwrap());
    }

    #[tokio::test]
    async fn test_single_open_assignment() {
        let store = MemoryStore::new();
        let territory = Territory::new(TerritoryId::new(), "7".to_string(), "Hill".to_string());
        TerritoryRepository::create(&store, &territory).await.unwrap();

        let first = TerritoryAssignment::new(AssignmentId::new(), territory.id, MemberId::new());
        AssignmentRepository::create(&store, &first).await.unwrap();

        let second = TerritoryAssignment::new(AssignmentId::new(), territory.id, MemberId::new());
        let err = AssignmentRepository::create(&store, &second).await.unwrap_err();
        assert!(matches!(err, DomainError::TerritoryAlreadyAssigned));

        store.complete(first.id, Utc::now()).await.unwrap();
        AssignmentRepository::create(&store, &second).await.unwrap();
        assert!(matches!(
            store.complete(first.id, Utc::now()).await,
            Err(DomainError::AssignmentNotFound)
        ));
    }

    #[tokio::test]
    async fn test_upsert_keeps_subscription_id() {
        let store = MemoryStore::new();
        let m = member("Eve");
        store.seed_member(m.clone(), None);

        let keys = PushKeys {
            p256dh: "p".to_string(),
            auth: "a".to_string(),
        };
        let first = PushSubscription::new(
            SubscriptionId::new(),
            m.id,
            "https://push/1".to_string(),
            keys.clone(),
            None,
        );
        let stored = store.upsert(&first).await.unwrap();
        store
            .record_send_result(stored.id, false, Utc::now())
            .await
            .unwrap();
        assert!(store.list_active(None).await.unwrap().is_empty());

        let second = PushSubscription::new(
            SubscriptionId::new(),
            m.id,
            "https://push/2".to_string(),
            keys,
            None,
        );
        let replaced = store.upsert(&second).await.unwrap();
        assert_eq!(replaced.id, stored.id);
        assert!(replaced.is_active);
        assert_eq!(replaced.endpoint, "https://push/2");
        assert_eq!(store.list_active(Some(m.id)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sms_logs_by_recipient_and_month() {
        let store = MemoryStore::new();
        let anna = MemberId::new();
        let ben = MemberId::new();
        let sender = MemberId::new();
        let june = ServiceMonth::new(2024, 6).unwrap();
        let july = ServiceMonth::new(2024, 7).unwrap();

        // Interleaved so no pair sits in a contiguous run
        let entries: Vec<SmsLog> = [
            (anna, june),
            (ben, july),
            (anna, july),
            (ben, june),
            (anna, june),
            (ben, july),
        ]
        .into_iter()
        .map(|(recipient, month)| {
            let phone = "+15550100".to_string();
            SmsLog::new(recipient, phone, "Reminder".to_string(), sender, month)
        })
        .collect();
        for entry in &entries {
            store.append(entry).await.unwrap();
        }

        for recipient in [anna, ben] {
            for month in [june, july] {
                let mut found: Vec<_> = store
                    .find_by_recipient_and_month(recipient, month)
                    .await
                    .unwrap()
                    .into_iter()
                    .map(|e| e.id)
                    .collect();
                let mut expected: Vec<_> = entries
                    .iter()
                    .filter(|e| e.recipient_id == recipient && e.month == month)
                    .map(|e| e.id)
                    .collect();
                found.sort();
                expected.sort();
                assert_eq!(found, expected);
            }
        }

        let outsider = store
            .find_by_recipient_and_month(MemberId::new(), june)
            .await
            .unwrap();
        assert!(outsider.is_empty());
        assert_eq!(
            SmsLogRepository::find_by_month(&store, june).await.unwrap().len(),
            3
        );
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_with_database_error() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let err = store.find_with_location(10).await.unwrap_err();
        assert!(err.is_data_access());
        assert!(store.check().await.is_err());

        store.set_unavailable(false);
        assert!(store.check().await.is_ok());
    }
}
