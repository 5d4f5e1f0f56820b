//! Duty entity - a meeting or field-service assignment on a given date

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::value_objects::{DutyId, MemberId};

/// Kind of duty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyKind {
    Attendant,
    Microphones,
    AudioVideo,
    Platform,
    Cleaning,
    FieldServiceMeeting,
}

impl DutyKind {
    pub const ALL: [DutyKind; 6] = [
        DutyKind::Attendant,
        DutyKind::Microphones,
        DutyKind::AudioVideo,
        DutyKind::Platform,
        DutyKind::Cleaning,
        DutyKind::FieldServiceMeeting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attendant => "attendant",
            Self::Microphones => "microphones",
            Self::AudioVideo => "audio_video",
            Self::Platform => "platform",
            Self::Cleaning => "cleaning",
            Self::FieldServiceMeeting => "field_service_meeting",
        }
    }
}

impl fmt::Display for DutyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DutyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown duty kind: {s}"))
    }
}

/// Scheduled duty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duty {
    pub id: DutyId,
    pub kind: DutyKind,
    pub date: NaiveDate,
    pub member_id: MemberId,
    pub notes: Option<String>,
}

impl Duty {
    pub fn new(id: DutyId, kind: DutyKind, date: NaiveDate, member_id: MemberId) -> Self {
        Self {
            id,
            kind,
            date,
            member_id,
            notes: None,
        }
    }
}
