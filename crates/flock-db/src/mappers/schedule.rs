//! Duty and report row <-> entity mappers

use flock_core::entities::{Duty, FieldServiceReport};
use flock_core::error::DomainError;
use flock_core::value_objects::ServiceMonth;

use crate::models::{DutyModel, ReportModel};

impl TryFrom<DutyModel> for Duty {
    type Error = DomainError;

    fn try_from(model: DutyModel) -> Result<Self, Self::Error> {
        Ok(Duty {
            id: model.id.into(),
            kind: model
                .kind
                .parse()
                .map_err(|e| DomainError::DatabaseError(format!("corrupt duty row: {e}")))?,
            date: model.date,
            member_id: model.member_id.into(),
            notes: model.notes,
        })
    }
}

impl From<ReportModel> for FieldServiceReport {
    fn from(model: ReportModel) -> Self {
        FieldServiceReport {
            id: model.id.into(),
            member_id: model.member_id.into(),
            month: ServiceMonth::from(model.month),
            participated: model.participated,
            bible_studies: model.bible_studies,
            hours: model.hours,
            remarks: model.remarks,
            submitted_at: model.submitted_at,
        }
    }
}
