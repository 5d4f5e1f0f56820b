//! Capability bitflags for dashboard access control
//!
//! Each flag has a stable `area:action` name. The names double as resource
//! identifiers that the access policy can register directly.

use bitflags::bitflags;
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Capabilities an actor may hold
    ///
    /// Serialized in JSON as a list of capability names.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        /// Open the dashboard at all
        const VIEW_DASHBOARD           = 1 << 0;
        /// Browse the member roster
        const VIEW_MEMBERS             = 1 << 1;
        /// Create and edit member records
        const MANAGE_MEMBERS           = 1 << 2;
        /// Change a member's role
        const MANAGE_ROLES             = 1 << 3;
        /// See member phone numbers and coordinates on the map
        const VIEW_MEMBER_LOCATIONS    = 1 << 4;
        const VIEW_GROUPS              = 1 << 5;
        const MANAGE_GROUPS            = 1 << 6;
        const VIEW_TERRITORIES         = 1 << 7;
        const VIEW_TERRITORY_ANALYTICS = 1 << 8;
        /// Create territories and check them in or out
        const MANAGE_TERRITORIES       = 1 << 9;
        const VIEW_DUTIES              = 1 << 10;
        const MANAGE_DUTIES            = 1 << 11;
        /// Submit one's own monthly field-service report
        const SUBMIT_REPORTS           = 1 << 12;
        /// Read every member's reports
        const VIEW_REPORTS             = 1 << 13;
        const SUBSCRIBE_NOTIFICATIONS  = 1 << 14;
        const SEND_NOTIFICATIONS       = 1 << 15;
        const SEND_SMS                 = 1 << 16;
        /// Bypass all capability checks
        const ADMINISTRATOR            = 1 << 31;
    }
}

/// Stable names, in declaration order
const NAMES: &[(Capabilities, &str)] = &[
    (Capabilities::VIEW_DASHBOARD, "dashboard:view"),
    (Capabilities::VIEW_MEMBERS, "members:view"),
    (Capabilities::MANAGE_MEMBERS, "members:manage"),
    (Capabilities::MANAGE_ROLES, "roles:manage"),
    (Capabilities::VIEW_MEMBER_LOCATIONS, "members:locations"),
    (Capabilities::VIEW_GROUPS, "groups:view"),
    (Capabilities::MANAGE_GROUPS, "groups:manage"),
    (Capabilities::VIEW_TERRITORIES, "territories:view"),
    (Capabilities::VIEW_TERRITORY_ANALYTICS, "territories:analytics"),
    (Capabilities::MANAGE_TERRITORIES, "territories:manage"),
    (Capabilities::VIEW_DUTIES, "duties:view"),
    (Capabilities::MANAGE_DUTIES, "duties:manage"),
    (Capabilities::SUBMIT_REPORTS, "reports:submit"),
    (Capabilities::VIEW_REPORTS, "reports:view"),
    (Capabilities::SUBSCRIBE_NOTIFICATIONS, "notifications:subscribe"),
    (Capabilities::SEND_NOTIFICATIONS, "notifications:send"),
    (Capabilities::SEND_SMS, "sms:send"),
    (Capabilities::ADMINISTRATOR, "administrator"),
];

impl Capabilities {
    /// Check if the set grants a required capability
    ///
    /// Administrators pass every check.
    #[inline]
    pub fn grants(&self, required: Capabilities) -> bool {
        if self.contains(Capabilities::ADMINISTRATOR) {
            return true;
        }
        self.contains(required)
    }

    /// Look up a single capability by its stable name
    pub fn from_capability_name(name: &str) -> Option<Self> {
        NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(flag, _)| *flag)
    }

    /// Stable name of a single flag
    pub fn name(self) -> Option<&'static str> {
        NAMES
            .iter()
            .find(|(flag, _)| *flag == self)
            .map(|(_, n)| *n)
    }

    /// Names of every flag in the set
    pub fn names(&self) -> Vec<&'static str> {
        NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, n)| *n)
            .collect()
    }

    /// Every named capability with its flag
    pub fn catalog() -> &'static [(Capabilities, &'static str)] {
        NAMES
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities::empty()
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(","))
    }
}

impl Serialize for Capabilities {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let names = self.names();
        let mut seq = serializer.serialize_seq(Some(names.len()))?;
        for name in names {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Capabilities {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CapabilitiesVisitor;

        impl<'de> Visitor<'de> for CapabilitiesVisitor {
            type Value = Capabilities;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a list of capability names")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Capabilities, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut caps = Capabilities::empty();
                while let Some(name) = seq.next_element::<String>()? {
                    let flag = Capabilities::from_capability_name(&name).ok_or_else(|| {
                        de::Error::custom(format!("unknown capability: {name}"))
                    })?;
                    caps |= flag;
                }
                Ok(caps)
            }
        }

        deserializer.deserialize_seq(CapabilitiesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_administrator_bypass() {
        let admin = Capabilities::ADMINISTRATOR;
        assert!(admin.grants(Capabilities::SEND_SMS));
        assert!(admin.grants(Capabilities::VIEW_MEMBER_LOCATIONS));
        assert!(admin.grants(Capabilities::MANAGE_ROLES));
    }

    #[test]
    fn test_grants() {
        let caps = Capabilities::VIEW_DASHBOARD | Capabilities::SUBMIT_REPORTS;
        assert!(caps.grants(Capabilities::SUBMIT_REPORTS));
        assert!(!caps.grants(Capabilities::VIEW_REPORTS));
        assert!(!caps.grants(Capabilities::SUBMIT_REPORTS | Capabilities::VIEW_REPORTS));
    }

    #[test]
    fn test_names_round_trip_through_lookup() {
        for (flag, name) in Capabilities::catalog() {
            assert_eq!(Capabilities::from_capability_name(name), Some(*flag));
            assert_eq!(flag.name(), Some(*name));
        }
        assert_eq!(Capabilities::from_capability_name("members:delete"), None);
    }

    #[test]
    fn test_capability_names_differ_from_flag_names() {
        // bitflags' own lookup uses the constant names
        assert_eq!(Capabilities::from_name("SEND_SMS"), Some(Capabilities::SEND_SMS));
        assert_eq!(Capabilities::from_name("sms:send"), None);
        assert_eq!(
            Capabilities::from_capability_name("sms:send"),
            Some(Capabilities::SEND_SMS)
        );
        assert_eq!(Capabilities::from_capability_name("SEND_SMS"), None);
    }

    #[test]
    fn test_every_flag_is_named() {
        let named = Capabilities::catalog()
            .iter()
            .fold(Capabilities::empty(), |acc, (flag, _)| acc | *flag);
        assert_eq!(named, Capabilities::all());
    }

    #[test]
    fn test_serialize_as_names() {
        let caps = Capabilities::VIEW_MEMBERS | Capabilities::SEND_SMS;
        let json = serde_json::to_string(&caps).unwrap();
        assert_eq!(json, r#"["members:view","sms:send"]"#);
    }

    #[test]
    fn test_deserialize_rejects_unknown_name() {
        let caps: Capabilities = serde_json::from_str(r#"["groups:view"]"#).unwrap();
        assert_eq!(caps, Capabilities::VIEW_GROUPS);
        assert!(serde_json::from_str::<Capabilities>(r#"["groups:delete"]"#).is_err());
    }
}
