//! The authenticated member a request acts on behalf of

use flock_core::entities::Member;
use flock_core::value_objects::{Capabilities, MemberId, Role};

/// Explicit per-request identity handed to every service call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub member_id: MemberId,
    pub role: Role,
    pub capabilities: Capabilities,
}

impl Actor {
    pub fn new(member_id: MemberId, role: Role) -> Self {
        Self {
            member_id,
            role,
            capabilities: role.capabilities(),
        }
    }

    /// Whether the actor holds `required` (administrators hold everything)
    #[inline]
    pub fn can(&self, required: Capabilities) -> bool {
        self.capabilities.grants(required)
    }
}

impl From<&Member> for Actor {
    fn from(member: &Member) -> Self {
        Self::new(member.id, member.role)
    }
}
