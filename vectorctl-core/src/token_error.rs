//! Classification of token endpoint failures.

use std::{error::Error, fmt};

use serde::Deserialize;

/// Maximum number of raw body bytes kept for diagnostics.
pub const RAW_BODY_LIMIT: usize = 2048;

/// Stable category of a token endpoint failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenErrorKind {
    /// `invalid_grant`: the refresh token or code is no longer usable.
    SessionExpired,
    /// `invalid_client`.
    InvalidClient,
    /// `invalid_request`, or a bare HTTP 400.
    InvalidRequest,
    /// `unauthorized_client`.
    UnauthorizedClient,
    /// `unsupported_grant_type`.
    UnsupportedGrantType,
    /// `invalid_scope`.
    InvalidScope,
    /// HTTP 429 without a recognised OAuth error code.
    RateLimited,
    /// HTTP 5xx without a recognised OAuth error code.
    AuthServerIssue,
    /// Anything else.
    Unknown,
}

impl TokenErrorKind {
    /// Fixed user-facing message for this kind.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::SessionExpired => "Your session has expired. Run `vectorctl login` again.",
            Self::InvalidClient => {
                "The CLI is not recognised by the identity provider. Update vectorctl and try again."
            }
            Self::InvalidRequest => {
                "The login request was rejected as invalid. Run `vectorctl login` again."
            }
            Self::UnauthorizedClient => {
                "This CLI is not authorized for the requested login. Contact support if this persists."
            }
            Self::UnsupportedGrantType => {
                "The identity provider does not support this login method. Update vectorctl and try again."
            }
            Self::InvalidScope => {
                "The requested permissions were rejected. Run `vectorctl login` again."
            }
            Self::RateLimited => "Too many login attempts. Wait a moment and try again.",
            Self::AuthServerIssue => {
                "The identity provider is having trouble. Try again in a few minutes."
            }
            Self::Unknown => {
                "Authentication failed unexpectedly. Re-run with --verbose for details."
            }
        }
    }
}

/// Which token endpoint call produced the error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenOperation {
    /// Authorization code exchange at login.
    CodeExchange,
    /// Refresh token grant.
    Refresh,
}

impl fmt::Display for TokenOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CodeExchange => f.write_str("code exchange"),
            Self::Refresh => f.write_str("token refresh"),
        }
    }
}

/// A non-2xx token endpoint response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenError {
    /// Classified kind.
    pub kind: TokenErrorKind,
    /// HTTP status code.
    pub http_status: u16,
    /// OAuth `error` field, empty when absent.
    pub error_code: String,
    /// OAuth `error_description` field.
    pub description: String,
    /// OAuth `error_uri` field.
    pub error_uri: String,
    /// Response body, capped at [`RAW_BODY_LIMIT`] bytes.
    pub raw_body: String,
    /// Operation that failed.
    pub operation: TokenOperation,
}

#[derive(Default, Deserialize)]
struct OAuthErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
    #[serde(default)]
    error_uri: String,
}

impl TokenError {
    /// Parse and classify a failed token endpoint response.
    pub fn from_response(status: u16, body: &[u8], operation: TokenOperation) -> Self {
        let payload: OAuthErrorBody = serde_json::from_slice(body).unwrap_or_default();
        Self {
            kind: classify(&payload.error, status),
            http_status: status,
            error_code: payload.error,
            description: payload.error_description,
            error_uri: payload.error_uri,
            raw_body: truncate_body(body),
            operation,
        }
    }

    /// Fixed user-facing message.
    pub fn user_message(&self) -> &'static str {
        self.kind.user_message()
    }

    /// Diagnostic rendering for `--verbose` and support requests.
    pub fn verbose_message(&self) -> String {
        let mut out = format!(
            "{}\n  status: {}\n  error: {}\n  operation: {}",
            self.user_message(),
            self.http_status,
            if self.error_code.is_empty() {
                "<none>"
            } else {
                self.error_code.as_str()
            },
            self.operation
        );
        if !self.description.is_empty() {
            out.push_str(&format!("\n  description: {}", self.description));
        }
        if !self.error_uri.is_empty() {
            out.push_str(&format!("\n  error_uri: {}", self.error_uri));
        }
        if !self.raw_body.is_empty() {
            out.push_str(&format!("\n  body: {}", self.raw_body));
        }
        out
    }
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.user_message())
    }
}

impl Error for TokenError {}

/// Map an OAuth error code and HTTP status to a [`TokenErrorKind`].
pub fn classify(error_code: &str, status: u16) -> TokenErrorKind {
    match error_code {
        "invalid_grant" => TokenErrorKind::SessionExpired,
        "invalid_client" => TokenErrorKind::InvalidClient,
        "invalid_request" => TokenErrorKind::InvalidRequest,
        "unauthorized_client" => TokenErrorKind::UnauthorizedClient,
        "unsupported_grant_type" => TokenErrorKind::UnsupportedGrantType,
        "invalid_scope" => TokenErrorKind::InvalidScope,
        _ => match status {
            429 => TokenErrorKind::RateLimited,
            500.. => TokenErrorKind::AuthServerIssue,
            400 => TokenErrorKind::InvalidRequest,
            _ => TokenErrorKind::Unknown,
        },
    }
}

fn truncate_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= RAW_BODY_LIMIT {
        return text.into_owned();
    }
    let mut cut = RAW_BODY_LIMIT;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...(truncated)", &text[..cut])
}
