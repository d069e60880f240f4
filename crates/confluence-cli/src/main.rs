//! confluence - command-line client for Confluence Cloud pages.
//!
//! Reads OAuth client settings and tokens from a dotenv-style file (or the
//! OS keychain), refreshes the access token when needed, and runs one page
//! operation per invocation.

mod args;
mod commands;
mod render;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use confluence_core::{
    ApiError, AuthError, AuthenticatedClient, Config, CredentialStore, EnvFile, EnvFileCredentialStore,
    KeyringCredentialStore,
};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::{Cli, Commands, StoreKind};
use commands::Output;

/// Directory under the platform config dir used when no env file is found.
const APP_DIR: &str = "confluence-cli";

const ENV_FILE_NAME: &str = ".env";

/// Keychain account used when no client id is configured.
const DEFAULT_KEYRING_ACCOUNT: &str = "default";

/// Initialize the tracing subscriber for logging
fn init_tracing(verbose: bool) {
    // RUST_LOG wins when set; otherwise -v picks debug
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        if needs_reauthorization(&err) {
            eprintln!("Hint: the stored tokens can no longer be refreshed. Run `confluence auth-url` to authorize again.");
        }
        return Err(err);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let env_path = resolve_env_file(cli.env_file, Path::new("."), dirs::config_dir());
    info!(path = %env_path.display(), "Using env file");

    let env_file = EnvFile::load(&env_path)
        .with_context(|| format!("Failed to read {}", env_path.display()))?;
    let config = Config::from_env_file(&env_file)?;
    let store = open_store(cli.store, env_file, &config)?;
    let client = AuthenticatedClient::new(&config, store)?;
    let out = Output { json: cli.json };

    match cli.command {
        Commands::Fetch { id } => commands::fetch(&client, &out, &id).await,
        Commands::FetchAll { space, offset, limit } => {
            let space = space.or_else(|| config.space_key.clone());
            commands::fetch_all(&client, &out, space.as_deref(), offset, limit).await
        }
        Commands::FetchByUpdateDate { date, op } => {
            commands::fetch_by_update_date(&client, &out, &date, op.into()).await
        }
        Commands::Update { id, title, body, message } => {
            commands::update(&client, &out, &id, &title, &body, message.as_deref()).await
        }
        Commands::Delete { id } => commands::delete(&client, &id).await,
        Commands::CheckAccess => commands::check_access(&client, &out).await,
        Commands::AuthUrl => commands::auth_url(client.refresher()),
        Commands::AuthExchange { code } => commands::auth_exchange(client.refresher(), &config, &code).await,
    }
}

/// `explicit`, else `.env` in `cwd` if it exists, else `<config dir>/confluence-cli/.env`.
fn resolve_env_file(explicit: Option<PathBuf>, cwd: &Path, config_dir: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| {
            let local = cwd.join(ENV_FILE_NAME);
            local.exists().then_some(local)
        })
        .or_else(|| config_dir.map(|dir| dir.join(APP_DIR).join(ENV_FILE_NAME)))
        .unwrap_or_else(|| cwd.join(ENV_FILE_NAME))
}

fn open_store(kind: StoreKind, env_file: EnvFile, config: &Config) -> Result<Arc<dyn CredentialStore>> {
    match kind {
        StoreKind::Env => Ok(Arc::new(EnvFileCredentialStore::new(env_file))),
        StoreKind::Keyring => {
            let account = config.client_id.as_deref().unwrap_or(DEFAULT_KEYRING_ACCOUNT);
            debug!(account = account, "Opening keychain store");
            let store = KeyringCredentialStore::open(account).context("Failed to open the OS keychain")?;
            Ok(Arc::new(store))
        }
    }
}

/// True when the failure means the refresh token is gone or rejected.
fn needs_reauthorization(err: &anyhow::Error) -> bool {
    let auth = match err.downcast_ref::<ApiError>() {
        Some(ApiError::Auth(auth)) => Some(auth),
        Some(_) => None,
        None => err.downcast_ref::<AuthError>(),
    };
    matches!(auth, Some(AuthError::RefreshFailed(_)) | Some(AuthError::MissingRefreshToken))
}
