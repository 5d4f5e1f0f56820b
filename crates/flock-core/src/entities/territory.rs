//! Territory entities - preaching territories and their check-out history

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashSet;

use crate::value_objects::{AssignmentId, MemberId, TerritoryId};

/// Assignments open longer than this are reported as overdue
pub const OVERDUE_AFTER_DAYS: i64 = 120;

/// Window used for "recently completed" statistics
pub const COMPLETION_WINDOW_DAYS: i64 = 365;

/// Territory entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Territory {
    pub id: TerritoryId,
    /// Human-facing number printed on the territory card, unique
    pub number: String,
    pub name: String,
    pub locality: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Territory {
    pub fn new(id: TerritoryId, number: String, name: String) -> Self {
        Self {
            id,
            number,
            name,
            locality: None,
            notes: None,
            created_at: Utc::now(),
        }
    }
}

/// A territory checked out to a member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerritoryAssignment {
    pub id: AssignmentId,
    pub territory_id: TerritoryId,
    pub member_id: MemberId,
    pub assigned_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TerritoryAssignment {
    /// Check out a territory now
    pub fn new(id: AssignmentId, territory_id: TerritoryId, member_id: MemberId) -> Self {
        Self {
            id,
            territory_id,
            member_id,
            assigned_at: Utc::now(),
            completed_at: None,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.completed_at.is_none()
    }

    /// Mark the territory as worked and returned
    pub fn complete(&mut self, at: DateTime<Utc>) {
        if self.is_open() {
            self.completed_at = Some(at);
        }
    }

    /// Whole days between check-out and return, if returned
    pub fn days_to_complete(&self) -> Option<i64> {
        self.completed_at
            .map(|done| (done - self.assigned_at).num_days().max(0))
    }

    /// Open and checked out for longer than the overdue threshold
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_open() && now - self.assigned_at > Duration::days(OVERDUE_AFTER_DAYS)
    }
}

/// Aggregate coverage figures for the territory dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TerritoryAnalytics {
    pub total: usize,
    pub assigned: usize,
    pub available: usize,
    pub completed_last_12_months: usize,
    pub average_days_to_complete: Option<f64>,
    pub never_worked: usize,
    pub overdue: usize,
}

impl TerritoryAnalytics {
    /// Compute coverage figures from the full territory list and history
    pub fn compute(
        territories: &[Territory],
        assignments: &[TerritoryAssignment],
        now: DateTime<Utc>,
    ) -> Self {
        let known: HashSet<TerritoryId> = territories.iter().map(|t| t.id).collect();
        let history = assignments
            .iter()
            .filter(|a| known.contains(&a.territory_id));

        let mut checked_out = HashSet::new();
        let mut ever_worked = HashSet::new();
        let mut completed_last_12_months = 0;
        let mut overdue = 0;
        let mut durations = Vec::new();
        let window_start = now - Duration::days(COMPLETION_WINDOW_DAYS);

        for assignment in history {
            ever_worked.insert(assignment.territory_id);
            if assignment.is_open() {
                checked_out.insert(assignment.territory_id);
                if assignment.is_overdue(now) {
                    overdue += 1;
                }
            }
            if let Some(done) = assignment.completed_at {
                if done >= window_start {
                    completed_last_12_months += 1;
                }
            }
            if let Some(days) = assignment.days_to_complete() {
                durations.push(days);
            }
        }

        let average_days_to_complete = if durations.is_empty() {
            None
        } else {
            Some(durations.iter().sum::<i64>() as f64 / durations.len() as f64)
        };

        Self {
            total: territories.len(),
            assigned: checked_out.len(),
            available: territories.len() - checked_out.len(),
            completed_last_12_months,
            average_days_to_complete,
            never_worked: territories.len() - ever_worked.len(),
            overdue,
        }
    }
}
