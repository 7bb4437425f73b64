//! Error types for vectorctl authentication.

use std::{error::Error, fmt, io};

use crate::token_error::TokenError;

/// Error type for authentication operations.
#[derive(Debug)]
pub enum AuthError {
    /// An underlying I/O error.
    Io(io::Error),
    /// JSON encoding or decoding failed.
    Serialization(serde_json::Error),
    /// The system random source could not produce bytes.
    Entropy,
    /// The callback `state` did not match the value issued for this attempt.
    StateMismatch,
    /// No redirect arrived before the login attempt expired.
    Timeout,
    /// The callback listener failed or stopped before delivering a result.
    Callback(String),
    /// The provider redirected back without an authorization code.
    AuthorizationDenied(String),
    /// The token endpoint could not be reached.
    Transport(String),
    /// The token endpoint answered with a classified OAuth error.
    Token(TokenError),
    /// The token endpoint answered 2xx without an access token.
    MissingAccessToken,
    /// The token needs a refresh but no refresh token is stored.
    MissingRefreshToken,
    /// The access token could not be decoded as a JWT.
    InvalidClaims(String),
    /// The secret store rejected a read or write.
    Store(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Serialization(err) => write!(f, "serialization error: {err}"),
            Self::Entropy => write!(f, "system random source unavailable"),
            Self::StateMismatch => write!(f, "state mismatch in authorization callback"),
            Self::Timeout => write!(f, "timed out waiting for the authorization callback"),
            Self::Callback(message) => write!(f, "callback listener error: {message}"),
            Self::AuthorizationDenied(message) => write!(f, "authorization failed: {message}"),
            Self::Transport(message) => write!(f, "token endpoint unreachable: {message}"),
            Self::Token(err) => write!(f, "{err}"),
            Self::MissingAccessToken => write!(f, "token response did not include an access token"),
            Self::MissingRefreshToken => {
                write!(f, "token expired and no refresh token is available")
            }
            Self::InvalidClaims(message) => write!(f, "invalid access token: {message}"),
            Self::Store(message) => write!(f, "secret store error: {message}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::Token(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for AuthError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

impl From<TokenError> for AuthError {
    fn from(value: TokenError) -> Self {
        Self::Token(value)
    }
}

impl AuthError {
    /// Return the classified token endpoint error, if any.
    pub fn token_error(&self) -> Option<&TokenError> {
        match self {
            Self::Token(err) => Some(err),
            _ => None,
        }
    }
}

/// Convenience result type for vectorctl authentication.
pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::AuthError;
    use crate::token_error::{TokenError, TokenOperation};
    use std::io;

    #[test]
    fn io_error_formats_message() {
        let error = AuthError::Io(io::Error::new(io::ErrorKind::Other, "boom"));
        assert_eq!(format!("{error}"), "io error: boom");
    }

    #[test]
    fn from_io_error_maps_variant() {
        let error: AuthError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        match error {
            AuthError::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::NotFound),
            other => panic!("expected Io variant, got {other:?}"),
        }
    }

    #[test]
    fn token_error_displays_user_message() {
        let token = TokenError::from_response(
            400,
            br#"{"error":"invalid_grant"}"#,
            TokenOperation::Refresh,
        );
        let error: AuthError = token.into();
        assert_eq!(
            format!("{error}"),
            "Your session has expired. Run `vectorctl login` again."
        );
        assert!(error.token_error().is_some());
    }

    #[test]
    fn state_mismatch_mentions_state() {
        assert!(AuthError::StateMismatch.to_string().contains("state mismatch"));
        assert!(AuthError::Timeout.token_error().is_none());
    }
}
