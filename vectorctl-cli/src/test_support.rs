//! Shared fakes for CLI tests.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use vectorctl_core::{AuthError, Result, SecretStore, Token, TokenExchanger};

pub(crate) fn env_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .expect("env lock")
}

pub(crate) struct EnvGuard {
    key: &'static str,
    prev: Option<String>,
}

impl EnvGuard {
    pub(crate) fn set(key: &'static str, value: Option<&str>) -> Self {
        let prev = std::env::var(key).ok();
        match value {
            Some(value) => unsafe { std::env::set_var(key, value) },
            None => unsafe { std::env::remove_var(key) },
        }
        Self { key, prev }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        if let Some(prev) = self.prev.take() {
            unsafe { std::env::set_var(self.key, prev) };
        } else {
            unsafe { std::env::remove_var(self.key) };
        }
    }
}

pub(crate) fn unique_temp_dir(label: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "vectorctl-{label}-{}-{nanos}",
        std::process::id()
    ))
}

/// In-memory store that counts writes; clones share state.
#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    token: Mutex<Token>,
    writes: Mutex<usize>,
}

impl MemoryStore {
    pub(crate) fn with_token(token: Token) -> Self {
        let store = Self::default();
        *store.inner.token.lock().expect("token") = token;
        store
    }

    pub(crate) fn writes(&self) -> usize {
        *self.inner.writes.lock().expect("writes")
    }

    pub(crate) fn current(&self) -> Token {
        self.inner.token.lock().expect("token").clone()
    }
}

impl SecretStore for MemoryStore {
    fn get_token(&self) -> Result<Token> {
        Ok(self.current())
    }

    fn set_token(&self, token: &Token) -> Result<()> {
        *self.inner.token.lock().expect("token") = token.clone();
        *self.inner.writes.lock().expect("writes") += 1;
        Ok(())
    }

    fn clear_token(&self) -> Result<()> {
        *self.inner.token.lock().expect("token") = Token::default();
        Ok(())
    }
}

/// Token endpoint stub that records calls and issues a fixed token.
pub(crate) struct StubExchanger {
    issued: Token,
    code_calls: Mutex<Vec<(String, String, String)>>,
    refresh_calls: Mutex<Vec<(String, Option<String>)>>,
}

impl StubExchanger {
    pub(crate) fn issuing(issued: Token) -> Self {
        Self {
            issued,
            code_calls: Mutex::new(Vec::new()),
            refresh_calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn code_calls(&self) -> Vec<(String, String, String)> {
        self.code_calls.lock().expect("code calls").clone()
    }

    pub(crate) fn refresh_calls(&self) -> Vec<(String, Option<String>)> {
        self.refresh_calls.lock().expect("refresh calls").clone()
    }

    fn issue(&self) -> Result<Token> {
        if self.issued.access_token.is_empty() {
            return Err(AuthError::MissingAccessToken);
        }
        Ok(self.issued.clone())
    }
}

impl TokenExchanger for StubExchanger {
    fn exchange_code<'a>(
        &'a self,
        code: &'a str,
        verifier: &'a str,
        redirect_uri: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Token>> + Send + 'a>> {
        self.code_calls.lock().expect("code calls").push((
            code.to_string(),
            verifier.to_string(),
            redirect_uri.to_string(),
        ));
        Box::pin(std::future::ready(self.issue()))
    }

    fn refresh<'a>(
        &'a self,
        refresh_token: &'a str,
        org_id: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<Token>> + Send + 'a>> {
        self.refresh_calls
            .lock()
            .expect("refresh calls")
            .push((refresh_token.to_string(), org_id.map(str::to_string)));
        Box::pin(std::future::ready(self.issue()))
    }
}
