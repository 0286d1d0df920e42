/// Request extractors whose rejections use the API error body
///
/// Axum's stock `Json` and `Path` reject with plain-text bodies; these
/// wrappers route the rejection through [`ApiError`] instead.

use crate::error::ApiError;
use axum::extract::{
    rejection::{JsonRejection, PathRejection},
    FromRequest, FromRequestParts,
};

/// JSON body extractor
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameter extractor
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            // Well-formed JSON that does not fit the schema (missing field, bad enum value, bad date)
            JsonRejection::JsonDataError(err) => ApiError::invalid("body", err.body_text()),
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected path parameters");
        ApiError::NotFound("Not found".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::IntoResponse,
        routing::post,
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Named {
        #[allow(dead_code)]
        name: String,
    }

    async fn handler(ApiJson(_): ApiJson<Named>) -> impl IntoResponse {
        StatusCode::OK
    }

    async fn send(body: &'static str) -> StatusCode {
        Router::new()
            .route("/", post(handler))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_schema_mismatch_is_validation_error() {
        assert_eq!(send(r#"{"other": 1}"#).await, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        assert_eq!(send("{not json").await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        assert_eq!(send(r#"{"name": "x"}"#).await, StatusCode::OK);
    }
}
