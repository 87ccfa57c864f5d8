// Server API layer - typed reqwest client for the streaming server
// Everything the player and admin commands know about the wire lives here

pub mod admin;
pub mod client;
pub mod models;
pub mod token;

pub use client::ApiClient;
pub use models::{
    AdminUser, AppSettings, BackgroundImage, CurrentUser, LoveState, SettingsUpdate, Song, Token,
};
pub use token::TokenStore;

use thiserror::Error;

/// Failure taxonomy for server calls. A 401 anywhere means the session is
/// gone - callers clear the stored token and drop back to logged-out.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("session invalid - please log in again")]
    Unauthorized,

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
}

impl ApiError {
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// Pull the human-readable message out of a FastAPI error body.
/// Bodies look like {"detail": "Song not found"}; anything else comes
/// back verbatim so the user still sees something useful.
pub(crate) fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned())
        .and_then(|d| match d {
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detail_extraction() {
        assert_eq!(error_detail(r#"{"detail": "Song not found"}"#), "Song not found");
        assert_eq!(error_detail("plain text error"), "plain text error");
        // Structured detail (validation errors) should still stringify
        assert_eq!(
            error_detail(r#"{"detail": {"loc": ["body"]}}"#),
            r#"{"loc":["body"]}"#
        );
    }
}
