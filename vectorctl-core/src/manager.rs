//! Token lifecycle manager.
//!
//! One [`TokenManager`] is built at process start and handed to every command
//! that needs credentials. All reads, refreshes and writes run under a single
//! async mutex, so at most one refresh is in flight per process.

use std::time::Duration;

use chrono::Utc;
use log::debug;
use tokio::sync::Mutex;

use crate::claims::Claims;
use crate::error::{AuthError, Result};
use crate::exchange::TokenExchanger;
use crate::store::SecretStore;
use crate::token::Token;

/// How long before expiry a token is refreshed.
pub const PREFETCH_WINDOW: Duration = Duration::from_secs(90);

/// Returns a currently valid token to every caller, refreshing ahead of expiry.
pub struct TokenManager<S, E> {
    store: S,
    exchanger: E,
    cached: Mutex<Token>,
    prefetch: chrono::Duration,
}

impl<S: SecretStore, E: TokenExchanger> TokenManager<S, E> {
    /// Create a manager over a secret store and token endpoint client.
    pub fn new(store: S, exchanger: E) -> Self {
        Self {
            store,
            exchanger,
            cached: Mutex::new(Token::default()),
            prefetch: to_chrono(PREFETCH_WINDOW),
        }
    }

    /// Override the prefetch window.
    pub fn with_prefetch_window(mut self, window: Duration) -> Self {
        self.prefetch = to_chrono(window);
        self
    }

    /// Token endpoint client used for refreshes.
    pub fn exchanger(&self) -> &E {
        &self.exchanger
    }

    /// Return a valid token, or the empty token when nobody is logged in.
    ///
    /// The secret store is re-read on every call so a login from another
    /// process is picked up.
    pub async fn token(&self) -> Result<Token> {
        let mut cached = self.cached.lock().await;

        let stored = self.store.get_token()?;
        if stored.is_empty() {
            *cached = Token::default();
            return Ok(Token::default());
        }

        let now = Utc::now();
        let within_window = stored.expires_within(self.prefetch, now);
        let needs_refresh = (stored.access_token.is_empty() && !stored.refresh_token.is_empty())
            || within_window;

        let mut current = stored.clone();
        if needs_refresh && within_window {
            current.expiry = Some(now - chrono::Duration::seconds(1));
        }

        let next = if current.is_valid_at(now) {
            current
        } else {
            self.refresh(&current).await?
        };

        if next.differs_from(&stored) {
            debug!("persisting updated token");
            self.store.set_token(&next)?;
        }
        *cached = next.clone();
        Ok(next)
    }

    /// Store a freshly issued token, typically right after login.
    pub async fn replace(&self, token: Token) -> Result<()> {
        let mut cached = self.cached.lock().await;
        self.store.set_token(&token)?;
        *cached = token;
        Ok(())
    }

    /// Forget the token in memory and in the secret store.
    pub async fn logout(&self) -> Result<()> {
        let mut cached = self.cached.lock().await;
        *cached = Token::default();
        self.store.clear_token()
    }

    /// Last token handed out by this manager.
    pub async fn cached_token(&self) -> Token {
        self.cached.lock().await.clone()
    }

    async fn refresh(&self, current: &Token) -> Result<Token> {
        if current.refresh_token.is_empty() {
            return Err(AuthError::MissingRefreshToken);
        }
        let org_id = active_org(&current.access_token);
        debug!(
            "refreshing access token (org pinned: {})",
            org_id.is_some()
        );
        let mut refreshed = self
            .exchanger
            .refresh(&current.refresh_token, org_id.as_deref())
            .await?;
        if refreshed.refresh_token.is_empty() {
            refreshed.refresh_token = current.refresh_token.clone();
        }
        Ok(refreshed)
    }
}

fn active_org(access_token: &str) -> Option<String> {
    if access_token.is_empty() {
        return None;
    }
    match Claims::decode_unverified(access_token) {
        Ok(claims) => claims.org().map(str::to_string),
        Err(err) => {
            debug!("cannot read organization from access token: {err}");
            None
        }
    }
}

fn to_chrono(window: Duration) -> chrono::Duration {
    chrono::Duration::seconds(i64::try_from(window.as_secs()).unwrap_or(i64::MAX / 1000))
}
