#![deny(missing_docs)]
//! vectorctl core library.
//!
//! This crate contains the OAuth2 authorization-code-with-PKCE primitives and
//! the token lifecycle manager shared by the vectorctl command-line tools.

pub mod authorize;
pub mod claims;
pub mod config;
pub mod csrf;
pub mod error;
pub mod exchange;
pub mod manager;
pub mod pkce;
pub mod store;
pub mod token;
pub mod token_error;

pub use authorize::{AuthorizeRequest, build_authorize_url};
pub use claims::Claims;
pub use config::AuthConfig;
pub use csrf::CsrfState;
pub use error::{AuthError, Result};
pub use exchange::TokenExchanger;
pub use manager::{PREFETCH_WINDOW, TokenManager};
pub use pkce::PkcePair;
pub use store::SecretStore;
pub use token::Token;
pub use token_error::{TokenError, TokenErrorKind, TokenOperation, classify};
