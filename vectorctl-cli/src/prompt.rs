//! Terminal presentation of the authorize URL.

use log::{debug, warn};

/// Shows the authorize URL to the user.
pub trait AuthorizePrompt {
    /// Present the URL; must not block the login flow.
    fn present(&self, authorize_url: &str);
}

/// Prints the URL and opens a browser when the user presses Enter.
pub struct TerminalPrompt;

impl AuthorizePrompt for TerminalPrompt {
    fn present(&self, authorize_url: &str) {
        println!("{}", login_instructions(authorize_url));
        spawn_browser_on_enter(authorize_url.to_string());
    }
}

/// Text shown before waiting for the redirect.
fn login_instructions(authorize_url: &str) -> String {
    format!(
        "Visit the following URL to log in to vectorctl:\n\n  {authorize_url}\n\n\
         Press [Enter] to open it in your browser, or open it manually.\n\
         Waiting for authorization (expires in 5 minutes)..."
    )
}

/// Wait for Enter on a detached thread, then try to open the browser.
///
/// Best effort: the login completes whether or not this thread ever fires.
fn spawn_browser_on_enter(url: String) {
    let spawned = std::thread::Builder::new()
        .name("vectorctl-browser".to_string())
        .spawn(move || {
            let mut line = String::new();
            match std::io::stdin().read_line(&mut line) {
                Ok(0) => debug!("stdin closed; not opening a browser"),
                Ok(_) => {
                    if let Err(err) = open::that(&url) {
                        warn!("failed to open browser: {err}");
                        eprintln!("Could not open a browser; open the URL above manually.");
                    }
                }
                Err(err) => debug!("stdin unavailable: {err}"),
            }
        });
    if let Err(err) = spawned {
        warn!("failed to start browser helper: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::login_instructions;

    #[test]
    fn instructions_show_url_and_enter_hint() {
        let text = login_instructions("https://login.example.test/oauth/authorize?x=1");
        assert!(text.contains("  https://login.example.test/oauth/authorize?x=1\n"));
        assert!(text.contains("Press [Enter]"));
    }
}
