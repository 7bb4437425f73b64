//! OAuth token bundle.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Tolerance applied when comparing expiries of two tokens.
const EXPIRY_TOLERANCE_SECS: i64 = 1;

/// OAuth token bundle issued by the identity provider.
///
/// A token with both `access_token` and `refresh_token` blank is "empty" and
/// means the user is not logged in. An `expiry` of `None` means the expiry is
/// unknown and all expiry checks are skipped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Bearer access token (a JWT).
    #[serde(default)]
    pub access_token: String,
    /// Refresh token used to renew the access token.
    #[serde(default)]
    pub refresh_token: String,
    /// Token type, normally `Bearer`.
    #[serde(default)]
    pub token_type: String,
    /// Access token expiry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl Token {
    /// Return true when neither an access token nor a refresh token is set.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_empty() && self.refresh_token.is_empty()
    }

    /// Return true when the access token is set and has not expired at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expiry {
            Some(expiry) => expiry > now,
            None => true,
        }
    }

    /// Return true when a known expiry falls within `window` of `now`.
    pub fn expires_within(&self, window: Duration, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => expiry - window <= now,
            None => false,
        }
    }

    /// Return true when the token differs from `other` in its secrets or expiry.
    pub fn differs_from(&self, other: &Token) -> bool {
        if self.access_token != other.access_token || self.refresh_token != other.refresh_token {
            return true;
        }
        match (self.expiry, other.expiry) {
            (Some(left), Some(right)) => {
                (left - right).num_seconds().abs() > EXPIRY_TOLERANCE_SECS
            }
            (None, None) => false,
            _ => true,
        }
    }
}
