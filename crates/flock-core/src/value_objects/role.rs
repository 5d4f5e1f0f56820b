//! Congregation roles and the role -> capability table

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Capabilities;

/// Role held by a member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Elder,
    MinisterialServant,
    Pioneer,
    #[default]
    Publisher,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Elder,
        Role::MinisterialServant,
        Role::Pioneer,
        Role::Publisher,
    ];

    /// Database / wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Elder => "elder",
            Self::MinisterialServant => "ministerial_servant",
            Self::Pioneer => "pioneer",
            Self::Publisher => "publisher",
        }
    }

    /// Capabilities granted by this role
    ///
    /// This is the only place roles are translated into capabilities.
    pub fn capabilities(&self) -> Capabilities {
        let base = Capabilities::VIEW_DASHBOARD
            | Capabilities::VIEW_GROUPS
            | Capabilities::VIEW_TERRITORIES
            | Capabilities::VIEW_DUTIES
            | Capabilities::SUBMIT_REPORTS
            | Capabilities::SUBSCRIBE_NOTIFICATIONS;

        match self {
            Self::Admin => Capabilities::all(),
            Self::Elder => Capabilities::all()
                .difference(Capabilities::ADMINISTRATOR | Capabilities::MANAGE_ROLES),
            Self::MinisterialServant => {
                base | Capabilities::VIEW_MEMBERS
                    | Capabilities::VIEW_TERRITORY_ANALYTICS
                    | Capabilities::MANAGE_TERRITORIES
                    | Capabilities::MANAGE_DUTIES
            }
            Self::Pioneer | Self::Publisher => base,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing a role name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| RoleParseError(s.to_string()))
    }
}
