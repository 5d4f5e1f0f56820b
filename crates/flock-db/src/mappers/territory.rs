//! Territory row <-> entity mappers

use flock_core::entities::{Territory, TerritoryAssignment};

use crate::models::{AssignmentModel, TerritoryModel};

impl From<TerritoryModel> for Territory {
    fn from(model: TerritoryModel) -> Self {
        Territory {
            id: model.id.into(),
            number: model.number,
            name: model.name,
            locality: model.locality,
            notes: model.notes,
            created_at: model.created_at,
        }
    }
}

impl From<AssignmentModel> for TerritoryAssignment {
    fn from(model: AssignmentModel) -> Self {
        TerritoryAssignment {
            id: model.id.into(),
            territory_id: model.territory_id.into(),
            member_id: model.member_id.into(),
            assigned_at: model.assigned_at,
            completed_at: model.completed_at,
        }
    }
}
