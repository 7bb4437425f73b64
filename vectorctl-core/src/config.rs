//! Identity provider settings for the login flow.

/// Default identity provider base URL.
pub const DEFAULT_AUTH_SERVER_URL: &str = "https://login.vectorctl.dev";
/// Public OAuth client id registered for the CLI.
pub const DEFAULT_CLIENT_ID: &str = "vectorctl-cli";
/// API audience requested for access tokens.
pub const DEFAULT_AUDIENCE: &str = "https://api.vectorctl.dev/";
/// Loopback host the callback listener binds.
pub const DEFAULT_CALLBACK_HOST: &str = "127.0.0.1";
/// Fixed loopback port registered as the redirect URI with the provider.
pub const DEFAULT_CALLBACK_PORT: u16 = 59049;
/// Path the provider redirects the browser to.
pub const DEFAULT_CALLBACK_PATH: &str = "/auth-callback";
/// Scopes requested at login; `offline_access` yields a refresh token.
pub const DEFAULT_SCOPES: [&str; 4] = ["openid", "profile", "email", "offline_access"];

/// Identity provider and loopback redirect configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthConfig {
    /// Identity provider base URL.
    pub auth_server_url: String,
    /// OAuth client id.
    pub client_id: String,
    /// Audience requested for access tokens. Empty disables the parameter.
    pub audience: String,
    /// OAuth scopes requested at login.
    pub scopes: Vec<String>,
    /// Host the callback listener binds.
    pub callback_host: String,
    /// Port the callback listener binds.
    pub callback_port: u16,
    /// Path the callback listener serves.
    pub callback_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            auth_server_url: DEFAULT_AUTH_SERVER_URL.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|scope| scope.to_string()).collect(),
            callback_host: DEFAULT_CALLBACK_HOST.to_string(),
            callback_port: DEFAULT_CALLBACK_PORT,
            callback_path: DEFAULT_CALLBACK_PATH.to_string(),
        }
    }
}

impl AuthConfig {
    /// Authorize endpoint the browser is sent to.
    pub fn authorize_url(&self) -> String {
        format!("{}/oauth/authorize", self.base_url())
    }

    /// Token endpoint used for code exchange and refresh.
    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.base_url())
    }

    /// Redirect URI for the configured callback port.
    pub fn redirect_uri(&self) -> String {
        self.redirect_uri_for_port(self.callback_port)
    }

    /// Redirect URI for the port the listener actually bound.
    pub fn redirect_uri_for_port(&self, port: u16) -> String {
        format!(
            "http://{}:{}{}",
            self.callback_host,
            port,
            self.normalized_callback_path()
        )
    }

    /// Callback path with exactly one leading slash.
    pub fn normalized_callback_path(&self) -> String {
        format!("/{}", self.callback_path.trim_start_matches('/'))
    }

    /// Space-separated scope string.
    pub fn scope(&self) -> String {
        self.scopes.join(" ")
    }

    fn base_url(&self) -> &str {
        self.auth_server_url.trim().trim_end_matches('/')
    }
}
