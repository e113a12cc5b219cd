use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use time::OffsetDateTime;

/// Uniform JSON body returned by every non-binary endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub status: &'static str,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub stack: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: impl Into<String>, stack: T) -> Self {
        Self {
            success: true,
            status: "success",
            message: message.into(),
            timestamp: OffsetDateTime::now_utc(),
            stack: Some(stack),
        }
    }
}

impl Envelope<()> {
    /// Success without payload; `stack` serializes as `null`.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            status: "success",
            message: message.into(),
            timestamp: OffsetDateTime::now_utc(),
            stack: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            status: "error",
            message: message.into(),
            timestamp: OffsetDateTime::now_utc(),
            stack: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
