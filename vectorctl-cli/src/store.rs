//! File-backed secret store for the CLI token.

use log::debug;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use vectorctl_core::{AuthError, SecretStore, Token};

use crate::CliResult;

/// Stores the token as JSON in a user-private file.
#[derive(Clone, Debug)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    /// Create a store backed by `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Location of the token file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "auth.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SecretStore for FileSecretStore {
    fn get_token(&self) -> vectorctl_core::Result<Token> {
        let contents = match std::fs::read(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Token::default()),
            Err(err) => return Err(err.into()),
        };
        if contents.iter().all(u8::is_ascii_whitespace) {
            return Ok(Token::default());
        }
        serde_json::from_slice(&contents)
            .map_err(|err| AuthError::Store(format!("{}: {err}", self.path.display())))
    }

    fn set_token(&self, token: &Token) -> vectorctl_core::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_vec_pretty(token)?;
        let temp_path = self.temp_path();
        match std::fs::remove_file(&temp_path) {
            Ok(()) => debug!("removed stale {}", temp_path.display()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        let mut file = private_file_options().open(&temp_path)?;
        file.write_all(&payload)?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&temp_path, &self.path)?;
        debug!("token written to {}", self.path.display());
        Ok(())
    }

    fn clear_token(&self) -> vectorctl_core::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Options for a new file only the owner can read.
fn private_file_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
}

/// Resolve the local path where the token is stored.
pub fn auth_store_path(auth_path: Option<PathBuf>) -> CliResult<PathBuf> {
    if let Some(path) = auth_path {
        return Ok(path);
    }
    if let Ok(path) = std::env::var("VECTORCTL_AUTH_PATH") {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    if let Ok(base) = std::env::var("XDG_CONFIG_HOME") {
        if !base.trim().is_empty() {
            return Ok(PathBuf::from(base).join("vectorctl").join("auth.json"));
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        if !home.trim().is_empty() {
            return Ok(PathBuf::from(home).join(".config/vectorctl/auth.json"));
        }
    }
    Err("unable to resolve auth storage path".into())
}
