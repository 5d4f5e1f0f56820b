//! JSON bodies checked with `validator`

use axum::{
    async_trait,
    body::Bytes,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::response::ApiError;

fn body_error(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(e) => ApiError::invalid_body(e.body_text()),
        JsonRejection::JsonSyntaxError(e) => ApiError::invalid_body(e.body_text()),
        JsonRejection::MissingJsonContentType(e) => ApiError::invalid_body(e.body_text()),
        other => ApiError::invalid_body(other.body_text()),
    }
}

/// A JSON body that deserialized and passed its `Validate` rules
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(body_error)?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Like [`ValidatedJson`], but an empty (or whitespace-only) body is `None`
///
/// Used by endpoints whose whole body is a set of optional overrides.
#[derive(Debug, Clone)]
pub struct OptionalValidatedJson<T>(pub Option<T>);

#[async_trait]
impl<S, T> FromRequest<S> for OptionalValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::invalid_body(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(None));
        }

        let Json(value) = Json::<T>::from_bytes(&bytes).map_err(body_error)?;
        value.validate()?;
        Ok(Self(Some(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Overrides {
        #[validate(length(min = 1, max = 10))]
        message: Option<String>,
    }

    fn request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_empty_body_is_none() {
        let OptionalValidatedJson(value) =
            OptionalValidatedJson::<Overrides>::from_request(request(""), &())
                .await
                .unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_present_body_is_validated() {
        let OptionalValidatedJson(value) = OptionalValidatedJson::<Overrides>::from_request(
            request(r#"{"message":"hi"}"#),
            &(),
        )
        .await
        .unwrap();
        assert_eq!(value.unwrap().message.as_deref(), Some("hi"));

        let err = OptionalValidatedJson::<Overrides>::from_request(
            request(r#"{"message":"far too long here"}"#),
            &(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let err = ValidatedJson::<Overrides>::from_request(request("{not json"), &())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_BODY");
    }
}
