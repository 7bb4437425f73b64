//! PKCE (RFC 7636) verifier and challenge generation.

use base64::{Engine as _, engine::general_purpose};
use ring::digest::{SHA256, digest};
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::{AuthError, Result};

const VERIFIER_BYTES: usize = 32;

/// The only challenge method the CLI uses.
pub const CHALLENGE_METHOD: &str = "S256";

/// A PKCE verifier and its S256 challenge.
///
/// Created per login attempt and dropped after the code exchange.
#[derive(Clone, Debug)]
pub struct PkcePair {
    /// Random URL-safe verifier sent with the code exchange.
    pub verifier: String,
    /// `base64url(sha256(verifier))`, sent with the authorize request.
    pub challenge: String,
}

impl PkcePair {
    /// Generate a fresh pair from the system random source.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; VERIFIER_BYTES];
        SystemRandom::new()
            .fill(&mut bytes)
            .map_err(|_| AuthError::Entropy)?;
        let verifier = general_purpose::URL_SAFE_NO_PAD.encode(bytes);
        let challenge = challenge_for(&verifier);
        Ok(Self {
            verifier,
            challenge,
        })
    }
}

/// Compute the S256 challenge for a verifier.
pub fn challenge_for(verifier: &str) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(digest(&SHA256, verifier.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenge_is_sha256_of_verifier() {
        for _ in 0..16 {
            let pair = PkcePair::generate().expect("pkce");
            let expected = general_purpose::URL_SAFE_NO_PAD
                .encode(digest(&SHA256, pair.verifier.as_bytes()).as_ref());
            assert_eq!(pair.challenge, expected);
        }
    }

    #[test]
    fn verifier_is_url_safe_and_long_enough() {
        let pair = PkcePair::generate().expect("pkce");
        assert_eq!(pair.verifier.len(), 43);
        assert!(
            pair.verifier
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn pairs_are_unique() {
        let first = PkcePair::generate().expect("pkce");
        let second = PkcePair::generate().expect("pkce");
        assert_ne!(first.verifier, second.verifier);
    }

    #[test]
    fn known_vector_from_rfc7636() {
        assert_eq!(
            challenge_for("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }
}
