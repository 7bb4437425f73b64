//! Durable token storage seam.

use crate::error::Result;
use crate::token::Token;

/// Durable key-value storage for the single CLI token.
///
/// Only [`crate::TokenManager`] writes through this trait.
#[cfg_attr(test, mockall::automock)]
pub trait SecretStore {
    /// Read the stored token; an absent entry reads as [`Token::default`].
    fn get_token(&self) -> Result<Token>;
    /// Replace the stored token.
    fn set_token(&self, token: &Token) -> Result<()>;
    /// Remove the stored token.
    fn clear_token(&self) -> Result<()>;
}
