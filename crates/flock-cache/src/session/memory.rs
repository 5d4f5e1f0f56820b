//! Process-local session store used when Redis is not configured.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use flock_core::traits::{RepoResult, SessionRecord, SessionStore};
use flock_core::value_objects::MemberId;

struct Entry {
    session: SessionRecord,
    expires_at: Instant,
}

/// In-memory [`SessionStore`] with per-token expiry
pub struct MemorySessionStore {
    sessions: DashMap<String, Entry>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Number of stored sessions, expired ones included
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn store(&self, token_id: &str, session: &SessionRecord) -> RepoResult<()> {
        self.sessions.insert(
            token_id.to_string(),
            Entry {
                session: session.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(())
    }

    async fn validate(&self, token_id: &str) -> RepoResult<Option<SessionRecord>> {
        let now = Instant::now();
        // Expired entries are dropped lazily on lookup
        let expired = match self.sessions.get(token_id) {
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.session.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.sessions.remove(token_id);
        }
        Ok(None)
    }

    async fn revoke(&self, token_id: &str) -> RepoResult<bool> {
        Ok(self.sessions.remove(token_id).is_some())
    }

    async fn revoke_all_for_member(&self, member_id: MemberId) -> RepoResult<u32> {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, entry| entry.session.member_id != member_id);
        Ok(u32::try_from(before - self.sessions.len()).unwrap_or(u32::MAX))
    }
}
