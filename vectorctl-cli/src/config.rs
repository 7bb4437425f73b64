//! Provider settings shared by every command.

use clap::Args;
use std::path::PathBuf;
use vectorctl_core::AuthConfig;
use vectorctl_core::config::{
    DEFAULT_AUDIENCE, DEFAULT_AUTH_SERVER_URL, DEFAULT_CALLBACK_PORT, DEFAULT_CLIENT_ID,
};

use crate::CliResult;

/// Identity provider and token storage flags.
#[derive(Args, Clone, Debug)]
pub struct AuthArgs {
    /// Base URL of the identity provider.
    #[arg(long, global = true, env = "VECTORCTL_AUTH_URL", default_value = DEFAULT_AUTH_SERVER_URL)]
    pub auth_url: String,
    /// OAuth client id of the CLI.
    #[arg(long, global = true, env = "VECTORCTL_CLIENT_ID", default_value = DEFAULT_CLIENT_ID)]
    pub client_id: String,
    /// API audience requested for access tokens.
    #[arg(long, global = true, env = "VECTORCTL_AUDIENCE", default_value = DEFAULT_AUDIENCE)]
    pub audience: String,
    /// Loopback port registered as the login redirect URI.
    #[arg(long, global = true, env = "VECTORCTL_CALLBACK_PORT", default_value_t = DEFAULT_CALLBACK_PORT)]
    pub callback_port: u16,
    /// Override the token file path.
    #[arg(long, global = true)]
    pub auth_path: Option<PathBuf>,
}

impl AuthArgs {
    /// Build the provider configuration from the parsed flags.
    pub fn to_config(&self) -> CliResult<AuthConfig> {
        Ok(AuthConfig {
            auth_server_url: normalize_server_url(&self.auth_url)?,
            client_id: required("client id", &self.client_id)?,
            audience: self.audience.trim().to_string(),
            callback_port: self.callback_port,
            ..AuthConfig::default()
        })
    }
}

/// Normalize the server URL for consistent endpoint construction.
fn normalize_server_url(server_url: &str) -> CliResult<String> {
    let trimmed = server_url.trim();
    if trimmed.is_empty() {
        return Err("auth url is required".into());
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn required(name: &str, value: &str) -> CliResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{name} is required").into());
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> AuthArgs {
        AuthArgs {
            auth_url: "https://login.example.test/".to_string(),
            client_id: " client-1 ".to_string(),
            audience: "https://api.example.test/".to_string(),
            callback_port: 4100,
            auth_path: None,
        }
    }

    #[test]
    fn to_config_trims_values() {
        let config = args().to_config().expect("config");
        assert_eq!(config.auth_server_url, "https://login.example.test");
        assert_eq!(config.client_id, "client-1");
        assert_eq!(config.redirect_uri(), "http://127.0.0.1:4100/auth-callback");
        assert_eq!(config.token_url(), "https://login.example.test/oauth/token");
    }

    #[test]
    fn to_config_rejects_empty_url() {
        let mut args = args();
        args.auth_url = "   ".to_string();
        let err = args.to_config().unwrap_err();
        assert!(err.to_string().contains("auth url"));
    }

    #[test]
    fn to_config_rejects_empty_client_id() {
        let mut args = args();
        args.client_id = String::new();
        let err = args.to_config().unwrap_err();
        assert!(err.to_string().contains("client id"));
    }
}
