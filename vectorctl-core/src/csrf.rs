//! Single-use CSRF state for one login attempt.

use base64::{Engine as _, engine::general_purpose};
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::{AuthError, Result};

const STATE_BYTES: usize = 32;

/// Opaque random value round-tripped through the authorize redirect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsrfState(String);

impl CsrfState {
    /// Generate 256 bits of fresh state from the system random source.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; STATE_BYTES];
        SystemRandom::new()
            .fill(&mut bytes)
            .map_err(|_| AuthError::Entropy)?;
        Ok(Self(general_purpose::URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// The encoded state value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact string comparison against a value returned by the browser.
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }
}

impl std::fmt::Display for CsrfState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
