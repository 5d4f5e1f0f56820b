//! Entity to DTO mappers

use flock_core::entities::{
    Duty, FieldServiceReport, Group, Member, PushSubscription, SmsLog, Territory,
    TerritoryAssignment,
};

use super::responses::{
    AssignmentResponse, CurrentMemberResponse, DutyResponse, GroupResponse, MemberResponse,
    ReportResponse, SmsLogResponse, SubscriptionResponse, TerritoryResponse,
};

impl From<&Member> for MemberResponse {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            full_name: member.full_name.clone(),
            phone: member.phone.clone(),
            email: member.email.clone(),
            role: member.role,
            location: member.location,
            group_id: member.group_id,
            created_at: member.created_at,
            updated_at: member.updated_at,
        }
    }
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self::from(&member)
    }
}

impl From<&Member> for CurrentMemberResponse {
    fn from(member: &Member) -> Self {
        Self {
            member: MemberResponse::from(member),
            capabilities: member.capabilities(),
        }
    }
}

impl From<Group> for GroupResponse {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            name: group.name,
            overseer_id: group.overseer_id,
            assistant_id: group.assistant_id,
            created_at: group.created_at,
        }
    }
}

impl From<Territory> for TerritoryResponse {
    fn from(territory: Territory) -> Self {
        Self {
            id: territory.id,
            number: territory.number,
            name: territory.name,
            locality: territory.locality,
            notes: territory.notes,
            created_at: territory.created_at,
        }
    }
}

impl From<TerritoryAssignment> for AssignmentResponse {
    fn from(assignment: TerritoryAssignment) -> Self {
        let overdue = assignment.is_overdue(chrono::Utc::now());
        Self {
            id: assignment.id,
            territory_id: assignment.territory_id,
            member_id: assignment.member_id,
            assigned_at: assignment.assigned_at,
            completed_at: assignment.completed_at,
            overdue,
        }
    }
}

impl From<Duty> for DutyResponse {
    fn from(duty: Duty) -> Self {
        Self {
            id: duty.id,
            kind: duty.kind,
            date: duty.date,
            member_id: duty.member_id,
            notes: duty.notes,
        }
    }
}

impl From<FieldServiceReport> for ReportResponse {
    fn from(report: FieldServiceReport) -> Self {
        Self {
            id: report.id,
            member_id: report.member_id,
            month: report.month,
            participated: report.participated,
            bible_studies: report.bible_studies,
            hours: report.hours,
            remarks: report.remarks,
            submitted_at: report.submitted_at,
        }
    }
}

impl From<PushSubscription> for SubscriptionResponse {
    fn from(subscription: PushSubscription) -> Self {
        Self {
            id: subscription.id,
            endpoint: subscription.endpoint,
            is_active: subscription.is_active,
            created_at: subscription.created_at,
            last_used: subscription.last_used,
        }
    }
}

impl From<SmsLog> for SmsLogResponse {
    fn from(entry: SmsLog) -> Self {
        Self {
            id: entry.id,
            recipient_id: entry.recipient_id,
            phone: entry.phone,
            message: entry.message,
            sender_id: entry.sender_id,
            month: entry.month,
            sent_at: entry.sent_at,
        }
    }
}
