#![deny(missing_docs)]
//! Loopback HTTP listener for the `vectorctl login` redirect.
//!
//! A [`CallbackListener`] serves one callback path on the loopback interface
//! for the lifetime of a single login attempt. The first request to that path
//! settles the attempt; the server is stopped as soon as the result has been
//! taken or the attempt times out.

use std::sync::Mutex;
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::rt::task::JoinHandle;
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use log::{debug, warn};
use serde::Deserialize;
use tokio::sync::oneshot;
use vectorctl_core::{AuthConfig, AuthError, CsrfState, Result};

/// How long a login attempt waits for the browser redirect.
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Upper bound on stopping the server once the attempt has settled.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

const SUCCESS_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>vectorctl</title></head>
<body style="font-family: system-ui; text-align: center; padding-top: 80px;">
<h2>Login successful</h2>
<p>You can close this tab and return to the terminal.</p>
</body>
</html>"#;

const ERROR_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>vectorctl</title></head>
<body style="font-family: system-ui; text-align: center; padding-top: 80px;">
<h2>Login failed</h2>
<p>Return to the terminal for details, then run <code>vectorctl login</code> again.</p>
</body>
</html>"#;

const HANDLED_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>vectorctl</title></head>
<body style="font-family: system-ui; text-align: center; padding-top: 80px;">
<h2>This login attempt is already finished</h2>
<p>You can close this tab.</p>
</body>
</html>"#;

/// Query parameters delivered by the provider's redirect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorizationCallback {
    /// Authorization code; empty when the provider reported a failure.
    pub code: String,
    /// OAuth `error` parameter, if any.
    pub error: Option<String>,
    /// OAuth `error_description` parameter, if any.
    pub error_description: Option<String>,
}

impl AuthorizationCallback {
    /// Human readable reason for a callback without a code.
    pub fn failure_reason(&self) -> String {
        match (&self.error, &self.error_description) {
            (_, Some(description)) if !description.is_empty() => description.clone(),
            (Some(error), _) if !error.is_empty() => error.clone(),
            _ => "no authorization code was returned".to_string(),
        }
    }
}

type CallbackResult = Result<AuthorizationCallback>;

#[derive(Debug, Default, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

struct CallbackState {
    expected_state: CsrfState,
    sender: Mutex<Option<oneshot::Sender<CallbackResult>>>,
}

impl CallbackState {
    fn take_sender(&self) -> Option<oneshot::Sender<CallbackResult>> {
        self.sender.lock().ok().and_then(|mut sender| sender.take())
    }
}

/// Ephemeral loopback server bound for one login attempt.
pub struct CallbackListener {
    port: u16,
    handle: ServerHandle,
    server: JoinHandle<std::io::Result<()>>,
    receiver: oneshot::Receiver<CallbackResult>,
}

impl CallbackListener {
    /// Bind the configured loopback address and start serving the callback path.
    ///
    /// Fails immediately when the port is taken; there is no fallback port
    /// because the redirect URI registered with the provider is fixed.
    pub fn bind(config: &AuthConfig, expected_state: &CsrfState) -> Result<Self> {
        let (sender, receiver) = oneshot::channel();
        let state = web::Data::new(CallbackState {
            expected_state: expected_state.clone(),
            sender: Mutex::new(Some(sender)),
        });
        let path = config.normalized_callback_path();
        let host = config.callback_host.as_str();
        let port = config.callback_port;

        let server = HttpServer::new(move || {
            App::new()
                .wrap(middleware::Logger::new("%a \"%U\" %s %T"))
                .app_data(state.clone())
                .route(&path, web::get().to(handle_callback))
        })
        .workers(1)
        .disable_signals()
        .shutdown_timeout(1)
        .bind((host, port))
        .map_err(|err| AuthError::Callback(format!("cannot listen on {host}:{port}: {err}")))?;

        let port = server
            .addrs()
            .first()
            .map(|addr| addr.port())
            .unwrap_or(port);
        let server = server.run();
        let handle = server.handle();
        let server = actix_web::rt::spawn(server);
        debug!("callback listener ready on {host}:{port}");

        Ok(Self {
            port,
            handle,
            server,
            receiver,
        })
    }

    /// Port the listener is bound to.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Wait for the redirect, then stop the server.
    ///
    /// Resolves with the first callback result, or [`AuthError::Timeout`] once
    /// `timeout` elapses. The server is stopped before this returns either way.
    pub async fn wait(self, timeout: Duration) -> Result<AuthorizationCallback> {
        let Self {
            handle,
            server,
            receiver,
            ..
        } = self;

        let outcome = tokio::select! {
            result = receiver => result.unwrap_or_else(|_| {
                Err(AuthError::Callback("listener stopped before a redirect arrived".to_string()))
            }),
            _ = tokio::time::sleep(timeout) => Err(AuthError::Timeout),
        };

        let shutdown = async {
            handle.stop(true).await;
            server.await
        };
        match tokio::time::timeout(SHUTDOWN_GRACE, shutdown).await {
            Ok(Ok(Ok(()))) => debug!("callback listener stopped"),
            Ok(Ok(Err(err))) => warn!("callback listener exited with error: {err}"),
            Ok(Err(err)) => warn!("callback listener task failed: {err}"),
            Err(_) => warn!("callback listener did not stop within {SHUTDOWN_GRACE:?}"),
        }
        outcome
    }
}

async fn handle_callback(
    state: web::Data<CallbackState>,
    query: web::Query<CallbackQuery>,
) -> HttpResponse {
    let query = query.into_inner();
    let Some(sender) = state.take_sender() else {
        return html(HttpResponse::Gone(), HANDLED_HTML);
    };

    let returned_state = query.state.unwrap_or_default();
    if !state.expected_state.matches(&returned_state) {
        warn!("callback state mismatch; aborting login attempt");
        let _ = sender.send(Err(AuthError::StateMismatch));
        return html(HttpResponse::BadRequest(), ERROR_HTML);
    }

    let callback = AuthorizationCallback {
        code: query.code.unwrap_or_default(),
        error: query.error,
        error_description: query.error_description,
    };
    let succeeded = !callback.code.is_empty();
    if !succeeded {
        warn!("provider redirected without a code: {}", callback.failure_reason());
    }
    let _ = sender.send(Ok(callback));
    if succeeded {
        html(HttpResponse::Ok(), SUCCESS_HTML)
    } else {
        html(HttpResponse::BadRequest(), ERROR_HTML)
    }
}

fn html(mut builder: actix_web::HttpResponseBuilder, body: &'static str) -> HttpResponse {
    builder.content_type("text/html; charset=utf-8").body(body)
}
