//! Member entity - a person on the congregation roster

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::value_objects::{Capabilities, GeoLocation, GroupId, MemberId, Role};

/// Congregation member
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: MemberId,
    pub full_name: String,
    pub phone: Option<String>,
    /// Login identity; members without one cannot sign in
    pub email: Option<String>,
    pub role: Role,
    pub location: Option<GeoLocation>,
    pub group_id: Option<GroupId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Create a new Member with the default role
    pub fn new(id: MemberId, full_name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            full_name,
            phone: None,
            email: None,
            role: Role::default(),
            location: None,
            group_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Capabilities granted by the member's role
    #[inline]
    pub fn capabilities(&self) -> Capabilities {
        self.role.capabilities()
    }

    #[inline]
    pub fn has_location(&self) -> bool {
        self.location.is_some()
    }

    /// Whether an SMS can be addressed to this member
    pub fn is_reachable_by_sms(&self) -> bool {
        self.phone.as_deref().is_some_and(|p| !p.trim().is_empty())
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    pub fn set_location(&mut self, location: Option<GeoLocation>) {
        self.location = location;
        self.updated_at = Utc::now();
    }

    pub fn set_group(&mut self, group_id: Option<GroupId>) {
        self.group_id = group_id;
        self.updated_at = Utc::now();
    }

    /// Projection used by the member map, present only when located
    pub fn located(&self) -> Option<MemberLocation> {
        self.location.map(|location| MemberLocation {
            full_name: self.full_name.clone(),
            phone: self.phone.clone(),
            location,
            role: self.role,
        })
    }
}

/// A member as shown on the location map
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberLocation {
    pub full_name: String,
    pub phone: Option<String>,
    pub location: GeoLocation,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_creation() {
        let member = Member::new(MemberId::new(), "Ada Brown".to_string());
        assert_eq!(member.role, Role::Publisher);
        assert!(!member.has_location());
        assert!(member.group_id.is_none());
        assert!(member.located().is_none());
    }

    #[test]
    fn test_located_projection() {
        let mut member = Member::new(MemberId::new(), "Ada Brown".to_string());
        member.phone = Some("+15550100".to_string());
        member.set_location(Some(GeoLocation::new(40.0, -75.0).unwrap()));

        let located = member.located().unwrap();
        assert_eq!(located.full_name, "Ada Brown");
        assert_eq!(located.location.latitude, 40.0);

        let json = serde_json::to_value(&located).unwrap();
        assert_eq!(json["fullName"], "Ada Brown");
        assert_eq!(json["location"]["longitude"], -75.0);
        assert_eq!(json["role"], "publisher");
    }

    #[test]
    fn test_reachable_by_sms() {
        let mut member = Member::new(MemberId::new(), "Ada".to_string());
        assert!(!member.is_reachable_by_sms());
        member.phone = Some("  ".to_string());
        assert!(!member.is_reachable_by_sms());
        member.phone = Some("+15550100".to_string());
        assert!(member.is_reachable_by_sms());
    }
}
