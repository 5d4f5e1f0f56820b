//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{GroupId, MemberId, ServiceMonth, SubscriptionId, TerritoryId};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Member not found: {0}")]
    MemberNotFound(MemberId),

    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("Territory not found: {0}")]
    TerritoryNotFound(TerritoryId),

    #[error("Assignment not found")]
    AssignmentNotFound,

    #[error("Duty not found")]
    DutyNotFound,

    #[error("Subscription not found: {0}")]
    SubscriptionNotFound(SubscriptionId),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Missing capability: {0}")]
    MissingCapability(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Email already in use")]
    EmailAlreadyExists,

    #[error("Territory number already in use: {0}")]
    TerritoryNumberExists(String),

    #[error("Territory is already checked out")]
    TerritoryAlreadyAssigned,

    #[error("Report for {0} already submitted")]
    ReportAlreadySubmitted(ServiceMonth),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Storage call timed out after {0} s")]
    StorageTimeout(u64),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::MemberNotFound(_) => "UNKNOWN_MEMBER",
            Self::GroupNotFound(_) => "UNKNOWN_GROUP",
            Self::TerritoryNotFound(_) => "UNKNOWN_TERRITORY",
            Self::AssignmentNotFound => "UNKNOWN_ASSIGNMENT",
            Self::DutyNotFound => "UNKNOWN_DUTY",
            Self::SubscriptionNotFound(_) => "UNKNOWN_SUBSCRIPTION",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::WeakPassword(_) => "WEAK_PASSWORD",

            // Authorization
            Self::MissingCapability(_) => "UNAUTHORIZED",

            // Conflict
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::TerritoryNumberExists(_) => "TERRITORY_NUMBER_EXISTS",
            Self::TerritoryAlreadyAssigned => "TERRITORY_ALREADY_ASSIGNED",
            Self::ReportAlreadySubmitted(_) => "REPORT_ALREADY_SUBMITTED",

            // Infrastructure
            Self::DatabaseError(_) | Self::StorageTimeout(_) => "DATA_ACCESS_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::MemberNotFound(_)
                | Self::GroupNotFound(_)
                | Self::TerritoryNotFound(_)
                | Self::AssignmentNotFound
                | Self::DutyNotFound
                | Self::SubscriptionNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::InvalidEmail | Self::WeakPassword(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::MissingCapability(_))
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::EmailAlreadyExists
                | Self::TerritoryNumberExists(_)
                | Self::TerritoryAlreadyAssigned
                | Self::ReportAlreadySubmitted(_)
        )
    }

    /// Check if the backing store failed or did not answer in time
    pub fn is_data_access(&self) -> bool {
        matches!(self, Self::DatabaseError(_) | Self::StorageTimeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DomainError::MemberNotFound(MemberId::new());
        assert_eq!(err.code(), "UNKNOWN_MEMBER");

        let err = DomainError::MissingCapability("sms:send".to_string());
        assert_eq!(err.code(), "UNAUTHORIZED");
    }

    #[test]
    fn test_data_access_variants_share_code() {
        assert_eq!(DomainError::StorageTimeout(5).code(), "DATA_ACCESS_ERROR");
        assert!(DomainError::StorageTimeout(5).is_data_access());
        assert!(DomainError::DatabaseError("boom".to_string()).is_data_access());
        assert!(!DomainError::CacheError("down".to_string()).is_data_access());
    }

    #[test]
    fn test_classification() {
        assert!(DomainError::GroupNotFound(GroupId::new()).is_not_found());
        assert!(!DomainError::EmailAlreadyExists.is_not_found());
        assert!(DomainError::TerritoryAlreadyAssigned.is_conflict());
        assert!(DomainError::InvalidEmail.is_validation());
        assert!(DomainError::MissingCapability("x".to_string()).is_authorization());
    }

    #[test]
    fn test_error_display() {
        let month: ServiceMonth = "2024-05".parse().unwrap();
        let err = DomainError::ReportAlreadySubmitted(month);
        assert_eq!(err.to_string(), "Report for 2024-05 already submitted");

        assert_eq!(
            DomainError::StorageTimeout(5).to_string(),
            "Storage call timed out after 5 s"
        );
    }
}
