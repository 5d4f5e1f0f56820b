//! Pagination extractor
//!
//! Offset pagination from `?limit=&offset=`.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;

use crate::response::ApiError;

/// Default page size
const DEFAULT_LIMIT: i64 = 50;
/// Maximum page size
const MAX_LIMIT: i64 = 200;

/// Raw pagination query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

/// Validated pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Clamped to 1..=200
    pub limit: i64,
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl TryFrom<PaginationParams> for Pagination {
    type Error = ApiError;

    fn try_from(params: PaginationParams) -> Result<Self, Self::Error> {
        let offset = params.offset.unwrap_or(0);
        if offset < 0 {
            return Err(ApiError::invalid_query("offset must not be negative"));
        }

        Ok(Pagination {
            limit: params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PaginationParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.body_text()))?;

        Pagination::try_from(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let pagination = Pagination::try_from(PaginationParams::default()).unwrap();
        assert_eq!(pagination, Pagination::default());
    }

    #[test]
    fn test_limit_clamping() {
        let high = Pagination::try_from(PaginationParams {
            limit: Some(5000),
            offset: None,
        })
        .unwrap();
        assert_eq!(high.limit, MAX_LIMIT);

        let low = Pagination::try_from(PaginationParams {
            limit: Some(0),
            offset: Some(10),
        })
        .unwrap();
        assert_eq!(low.limit, 1);
        assert_eq!(low.offset, 10);
    }

    #[test]
    fn test_negative_offset_rejected() {
        let err = Pagination::try_from(PaginationParams {
            limit: None,
            offset: Some(-1),
        })
        .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_QUERY_PARAMETER");
    }
}
