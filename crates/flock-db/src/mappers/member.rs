//! Member and group row <-> entity mappers

use flock_core::entities::{Group, Member, MemberLocation};
use flock_core::error::DomainError;
use flock_core::value_objects::{GeoLocation, Role};

use crate::models::{GroupModel, MemberLocationModel, MemberModel};

fn parse_role(raw: &str) -> Result<Role, DomainError> {
    raw.parse()
        .map_err(|e| DomainError::DatabaseError(format!("corrupt member row: {e}")))
}

impl TryFrom<MemberModel> for Member {
    type Error = DomainError;

    fn try_from(model: MemberModel) -> Result<Self, Self::Error> {
        // members_location_pair guarantees both or neither
        let location = match (model.latitude, model.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoLocation {
                latitude,
                longitude,
            }),
            _ => None,
        };

        Ok(Member {
            id: model.id.into(),
            full_name: model.full_name,
            phone: model.phone,
            email: model.email,
            role: parse_role(&model.role)?,
            location,
            group_id: model.group_id.map(Into::into),
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl TryFrom<MemberLocationModel> for MemberLocation {
    type Error = DomainError;

    fn try_from(model: MemberLocationModel) -> Result<Self, Self::Error> {
        Ok(MemberLocation {
            full_name: model.full_name,
            phone: model.phone,
            location: GeoLocation {
                latitude: model.latitude,
                longitude: model.longitude,
            },
            role: parse_role(&model.role)?,
        })
    }
}

impl From<GroupModel> for Group {
    fn from(model: GroupModel) -> Self {
        Group {
            id: model.id.into(),
            name: model.name,
            overseer_id: model.overseer_id.map(Into::into),
            assistant_id: model.assistant_id.map(Into::into),
            created_at: model.created_at,
        }
    }
}

/// Convert a batch of rows, failing on the first corrupt one
pub fn members_from_rows(rows: Vec<MemberModel>) -> Result<Vec<Member>, DomainError> {
    rows.into_iter().map(Member::try_from).collect()
}
