//! Token endpoint seam.

use std::future::Future;
use std::pin::Pin;

use crate::error::Result;
use crate::token::Token;

/// Calls the provider's token endpoint.
///
/// Failures with a non-2xx status are reported as
/// [`crate::AuthError::Token`]; a 2xx body without an access token is
/// [`crate::AuthError::MissingAccessToken`].
pub trait TokenExchanger {
    /// Exchange an authorization code and PKCE verifier for a token.
    fn exchange_code<'a>(
        &'a self,
        code: &'a str,
        verifier: &'a str,
        redirect_uri: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Token>> + Send + 'a>>;

    /// Refresh a token, asking for `org_id` to stay the active organization.
    fn refresh<'a>(
        &'a self,
        refresh_token: &'a str,
        org_id: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<Token>> + Send + 'a>>;
}
