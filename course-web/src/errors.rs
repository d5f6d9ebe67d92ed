use crate::handlers::Nav;
use askama::Template;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use std::collections::BTreeMap;
use thiserror::Error;

/// Field-level validation messages, keyed by form field name.
///
/// The course API reports validation failures as a JSON object mapping each
/// offending field to a list of messages; local form validation is folded
/// into the same shape so templates render both identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Parse a 400 response body into field errors. Returns None when the
    /// body is not the expected object-of-messages shape.
    pub fn from_body(body: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        let object = value.as_object()?;

        let mut fields = BTreeMap::new();
        for (key, value) in object {
            let messages: Vec<String> = match value {
                serde_json::Value::String(message) => vec![message.clone()],
                serde_json::Value::Array(items) => items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
                _ => continue,
            };
            if !messages.is_empty() {
                fields.insert(key.clone(), messages);
            }
        }

        if fields.is_empty() {
            None
        } else {
            Some(Self(fields))
        }
    }

    pub fn from_validation(errors: &validator::ValidationErrors) -> Self {
        let mut fields = BTreeMap::new();
        for (field, field_errors) in errors.field_errors() {
            let messages = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }
        Self(fields)
    }

    pub fn insert(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn first(&self, field: &str) -> Option<String> {
        self.0.get(field).and_then(|messages| messages.first()).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn summary(&self) -> String {
        self.0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Error surface of the API gateway client. Every failed call carries what
/// the server said (or the fact that it said nothing); nothing is retried.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no response from the course service: {0}")]
    Network(#[source] reqwest::Error),

    #[error("failed to decode course service response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("session token rejected by the course service")]
    TokenRejected,

    #[error("course service denied access")]
    Forbidden,

    #[error("resource not found on the course service")]
    NotFound,

    #[error("course service rejected the submitted fields")]
    Validation(FieldErrors),

    #[error("course service returned {status}")]
    Status { status: StatusCode, body: String },
}

impl ApiError {
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ApiError::TokenRejected,
            StatusCode::FORBIDDEN => ApiError::Forbidden,
            StatusCode::NOT_FOUND => ApiError::NotFound,
            StatusCode::BAD_REQUEST => match FieldErrors::from_body(&body) {
                Some(fields) => ApiError::Validation(fields),
                None => ApiError::Status { status, body },
            },
            _ => ApiError::Status { status, body },
        }
    }
}

/// Page-level failure. Rendered as an error page, except for expired
/// sessions which bounce through /logout so the session is cleared.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("session expired")]
    SessionExpired,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("could not reach the course service")]
    Unreachable,

    #[error("course service returned {0}")]
    Upstream(StatusCode),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PageError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        PageError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        PageError::NotFound(message.into())
    }
}

impl From<ApiError> for PageError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::TokenRejected => PageError::SessionExpired,
            ApiError::Forbidden => {
                PageError::Forbidden("You do not have permission to access this resource.".into())
            }
            ApiError::NotFound => {
                PageError::NotFound("The requested resource was not found.".into())
            }
            ApiError::Network(e) => {
                tracing::error!(error = %e, "Course service unreachable");
                PageError::Unreachable
            }
            ApiError::Decode(e) => {
                tracing::error!(error = %e, "Invalid course service response");
                PageError::Internal(anyhow::anyhow!("invalid course service response: {}", e))
            }
            ApiError::Validation(fields) => {
                // Handlers consume validation errors inline; reaching this
                // path means a form submitted fields the view never renders.
                PageError::Internal(anyhow::anyhow!(
                    "unhandled validation error: {}",
                    fields.summary()
                ))
            }
            ApiError::Status { status, body } => {
                tracing::warn!(status = %status, body = %body, "Course service error response");
                PageError::Upstream(status)
            }
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub nav: Nav,
    pub title: String,
    pub message: String,
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let (status, title, message) = match self {
            PageError::SessionExpired => {
                return Redirect::to("/logout").into_response();
            }
            PageError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, "Access Denied".to_string(), message)
            }
            PageError::NotFound(message) => (StatusCode::NOT_FOUND, "Not Found".to_string(), message),
            PageError::Unreachable => (
                StatusCode::BAD_GATEWAY,
                "Service Unavailable".to_string(),
                "Could not reach the course service. Please try again.".to_string(),
            ),
            PageError::Upstream(_) => (
                StatusCode::BAD_GATEWAY,
                "Service Error".to_string(),
                "The course service returned an error. Please try again.".to_string(),
            ),
            PageError::Internal(err) => {
                tracing::error!(error = %err, "Internal error while rendering page");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something Went Wrong".to_string(),
                    "An unexpected error occurred. Please try again.".to_string(),
                )
            }
        };

        let template = ErrorTemplate {
            nav: Nav::anonymous(),
            title,
            message,
        };
        (status, template).into_response()
    }
}
