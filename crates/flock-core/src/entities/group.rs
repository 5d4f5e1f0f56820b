//! Field-service group entity

use chrono::{DateTime, Utc};

use crate::value_objects::{GroupId, MemberId};

/// Field-service group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub overseer_id: Option<MemberId>,
    pub assistant_id: Option<MemberId>,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn new(id: GroupId, name: String) -> Self {
        Self {
            id,
            name,
            overseer_id: None,
            assistant_id: None,
            created_at: Utc::now(),
        }
    }

    /// Check if the member oversees or assists this group
    pub fn is_led_by(&self, member_id: MemberId) -> bool {
        self.overseer_id == Some(member_id) || self.assistant_id == Some(member_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_led_by() {
        let overseer = MemberId::new();
        let assistant = MemberId::new();
        let mut group = Group::new(GroupId::new(), "North".to_string());
        assert!(!group.is_led_by(overseer));

        group.overseer_id = Some(overseer);
        group.assistant_id = Some(assistant);
        assert!(group.is_led_by(overseer));
        assert!(group.is_led_by(assistant));
        assert!(!group.is_led_by(MemberId::new()));
    }
}
