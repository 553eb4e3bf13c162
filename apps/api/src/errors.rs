use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::cv::extract::ExtractError;
use crate::interpret::InterpretError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Model output error: {0}")]
    ModelOutput(#[from] InterpretError),

    #[error("Invalid request body: {0}")]
    Body(#[from] JsonRejection),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Document error: {0}")]
    Document(#[from] ExtractError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// `Json` extractor whose rejections use the `AppError` envelope.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::ModelOutput(e) => {
                tracing::error!(kind = e.kind(), "Model output rejected: {e}");
                let code = match e {
                    InterpretError::Extraction => "MODEL_OUTPUT_EXTRACTION_ERROR",
                    InterpretError::Parse(_) => "MODEL_OUTPUT_PARSE_ERROR",
                    InterpretError::Validation(_) => "MODEL_OUTPUT_VALIDATION_ERROR",
                };
                (StatusCode::INTERNAL_SERVER_ERROR, code, e.to_string())
            }
            AppError::Body(e) => {
                let status = match e.status() {
                    s @ (StatusCode::UNSUPPORTED_MEDIA_TYPE | StatusCode::PAYLOAD_TOO_LARGE) => s,
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, "VALIDATION_ERROR", e.body_text())
            }
            AppError::Multipart(e) => (e.status(), "INVALID_UPLOAD", e.body_text()),
            AppError::Document(e) => match e {
                ExtractError::UnsupportedFormat | ExtractError::ContentMismatch { .. } => {
                    (StatusCode::BAD_REQUEST, "UNSUPPORTED_FILE", e.to_string())
                }
                ExtractError::Empty => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EMPTY_DOCUMENT",
                    e.to_string(),
                ),
                ExtractError::Malformed(_) => {
                    tracing::warn!("Document extraction failed: {e}");
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "UNREADABLE_DOCUMENT",
                        e.to_string(),
                    )
                }
            },
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_validation_is_bad_request() {
        let (status, body) = render(AppError::Validation("country cannot be empty".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "country cannot be empty");
    }

    #[tokio::test]
    async fn test_model_output_errors_surface_diagnostic() {
        let (status, body) = render(AppError::from(InterpretError::Validation(
            "missing field `summary`".into(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "MODEL_OUTPUT_VALIDATION_ERROR");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("missing field `summary`"));
    }

    #[tokio::test]
    async fn test_extraction_error_code() {
        let (_, body) = render(AppError::from(InterpretError::Extraction)).await;
        assert_eq!(body["error"]["code"], "MODEL_OUTPUT_EXTRACTION_ERROR");
    }

    #[tokio::test]
    async fn test_unsupported_file_is_bad_request() {
        let (status, body) = render(AppError::from(ExtractError::UnsupportedFormat)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "UNSUPPORTED_FILE");
    }

    #[tokio::test]
    async fn test_json_rejection_uses_envelope() {
        use axum::{body::Body, http::Request};

        let request = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"country": 3}"#))
            .unwrap();
        let rejection = AppJson::<crate::insights::models::UserProfile>::from_request(request, &())
            .await
            .err()
            .unwrap();

        let (status, body) = render(rejection).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let (status, body) = render(AppError::Internal(anyhow::anyhow!("secret detail"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "An internal server error occurred");
    }
}
