#![deny(missing_docs)]
//! vectorctl command-line interface.
//!
//! Logs the user in through the browser and keeps a valid access token on
//! disk for every other command.

mod auth;
mod config;
mod exchange;
mod prompt;
mod session;
mod store;
#[cfg(test)]
mod test_support;

use auth::LoginArgs;
use clap::{Parser, Subcommand};
use config::AuthArgs;
use exchange::ReqwestExchanger;
use store::{FileSecretStore, auth_store_path};
use vectorctl_core::{AuthConfig, AuthError, TokenManager};

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

type CliTokenManager = TokenManager<FileSecretStore, ReqwestExchanger>;

#[derive(Parser)]
#[command(name = "vectorctl", version, about = "vectorctl CLI")]
struct Cli {
    #[command(flatten)]
    auth: AuthArgs,
    /// Print debug logs and full token endpoint diagnostics.
    #[arg(short, long, global = true, env = "VECTORCTL_VERBOSE")]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in through the browser.
    Login(LoginArgs),
    /// Remove the stored token.
    Logout,
    /// Show the logged-in user and organization.
    Whoami,
    /// Print a valid access token.
    Token,
}

#[cfg(not(test))]
#[actix_web::main]
async fn main() -> std::process::ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.auth, cli.command).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", describe_error(&*err, cli.verbose));
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
fn main() {}

#[cfg_attr(test, allow(dead_code))]
fn init_logging(verbose: bool) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(verbose)))
        .init();
}

fn log_filter(verbose: bool) -> &'static str {
    if verbose { "warn,vectorctl=debug" } else { "warn" }
}

#[cfg_attr(test, allow(dead_code))]
async fn run(args: AuthArgs, command: Commands) -> CliResult<()> {
    let config = args.to_config()?;
    let manager = build_manager(&args, config.clone())?;
    match command {
        Commands::Login(login) => auth::run_login(&manager, &config, &login).await,
        Commands::Logout => session::run_logout(&manager).await,
        Commands::Whoami => session::run_whoami(&manager).await,
        Commands::Token => session::run_token(&manager).await,
    }
}

#[cfg_attr(test, allow(dead_code))]
fn build_manager(args: &AuthArgs, config: AuthConfig) -> CliResult<CliTokenManager> {
    let path = auth_store_path(args.auth_path.clone())?;
    log::debug!("token file: {}", path.display());
    Ok(TokenManager::new(
        FileSecretStore::new(path),
        ReqwestExchanger::new(config)?,
    ))
}

/// Message printed for a failed command.
fn describe_error(err: &(dyn std::error::Error + 'static), verbose: bool) -> String {
    match err.downcast_ref::<AuthError>().and_then(AuthError::token_error) {
        Some(token_err) if verbose => token_err.verbose_message(),
        _ => err.to_string(),
    }
}
