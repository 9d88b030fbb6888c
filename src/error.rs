use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::cooldown::Remaining;
use crate::relay::RelayError;

#[derive(Debug)]
pub enum AppError {
    MissingText,
    CooldownActive(Remaining),
    Configuration(String),
    Relay(RelayError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl From<RelayError> for AppError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::NotConfigured => AppError::Configuration(err.to_string()),
            other => AppError::Relay(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::MissingText => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "No text provided".into(),
                    message: None,
                    details: None,
                },
            ),
            AppError::CooldownActive(remaining) => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorResponse {
                    error: "Cooldown active".into(),
                    message: Some(remaining.to_string()),
                    details: None,
                },
            ),
            AppError::Configuration(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "Webhook not configured".into(),
                    message: None,
                    details: Some(details),
                },
            ),
            AppError::Relay(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "Webhook error".into(),
                    message: None,
                    details: Some(err.to_string()),
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}
