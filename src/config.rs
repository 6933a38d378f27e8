//! Configuration management for playtally.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory. The lookup order is:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (everything except the client credentials)

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use crate::{Error, Result};

pub const APP_DIR: &str = "playtally";

const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 90;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_RETRIES: u32 = 5;

const SCOPE: &str = "user-read-currently-playing user-read-recently-played playlist-read-private playlist-read-collaborative";

/// Loads environment variables from the `.env` file in the local data directory.
///
/// The file lives in:
/// - Linux: `~/.local/share/playtally/.env`
/// - macOS: `~/Library/Application Support/playtally/.env`
/// - Windows: `%LOCALAPPDATA%/playtally/.env`
///
/// A missing file is fine, the process environment alone may be enough.
/// Variables already set in the environment are never overridden.
///
/// # Errors
///
/// Fails if the directory cannot be created or the file exists but cannot
/// be parsed.
pub async fn load_env() -> Result<()> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
    }
    Ok(())
}

/// Root directory for the `.env` file and cached tokens.
///
/// Falls back to the working directory on platforms without a local data
/// directory. Tokens are stored below it as `cache/token-<username>.json`.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Client ID of the registered Spotify application (`SPOTIFY_CLIENT_ID`).
///
/// # Errors
///
/// `Error::Auth` when the variable is unset or blank, since no request to
/// Spotify can succeed without it.
///
/// # Example
///
/// ```ignore
/// let client_id = config::spotify_client_id()?;
/// ```
pub fn spotify_client_id() -> Result<String> {
    required("SPOTIFY_CLIENT_ID")
}

/// Client secret of the registered Spotify application (`SPOTIFY_CLIENT_SECRET`).
///
/// Sent only to the token endpoint and never logged.
///
/// # Errors
///
/// `Error::Auth` when the variable is unset or blank.
pub fn spotify_client_secret() -> Result<String> {
    required("SPOTIFY_CLIENT_SECRET")
}

/// Redirect URI registered for the application (`SPOTIFY_REDIRECT_URI`).
///
/// Defaults to `http://127.0.0.1:8888/callback`. It has to match one of the
/// redirect URIs in the Spotify developer dashboard exactly, and its host and
/// port have to agree with [`server_addr`].
pub fn spotify_redirect_uri() -> String {
    optional("SPOTIFY_REDIRECT_URI", DEFAULT_REDIRECT_URI)
}

/// Scopes requested during authorization: currently playing, recently played,
/// and private plus collaborative playlists.
pub fn spotify_scope() -> &'static str {
    SCOPE
}

/// Authorization endpoint (`SPOTIFY_AUTH_URL`), defaults to Spotify's accounts service.
pub fn spotify_apiauth_url() -> String {
    optional("SPOTIFY_AUTH_URL", DEFAULT_AUTH_URL)
}

/// Base URL of the Web API (`SPOTIFY_API_URL`), e.g. `https://api.spotify.com/v1`.
///
/// A trailing slash is tolerated, callers trim it before appending paths.
pub fn spotify_apiurl() -> String {
    optional("SPOTIFY_API_URL", DEFAULT_API_URL)
}

/// Token endpoint (`SPOTIFY_TOKEN_URL`) used for the code exchange and refreshes.
pub fn spotify_apitoken_url() -> String {
    optional("SPOTIFY_TOKEN_URL", DEFAULT_TOKEN_URL)
}

/// Bind address of the local OAuth callback server. Must agree with the redirect URI.
pub fn server_addr() -> String {
    optional("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Delay between two samples of the recently played endpoint.
///
/// Read from `PLAYTALLY_POLL_INTERVAL_SECS`, 90 seconds when unset or blank.
/// The `--interval` flag of the monitor command takes precedence.
///
/// # Errors
///
/// `Error::Config` when the value is not a whole number of seconds.
///
/// # Example
///
/// ```ignore
/// // PLAYTALLY_POLL_INTERVAL_SECS=30
/// assert_eq!(config::poll_interval()?, Duration::from_secs(30));
/// ```
pub fn poll_interval() -> Result<Duration> {
    let secs = parse_value(
        "PLAYTALLY_POLL_INTERVAL_SECS",
        env::var("PLAYTALLY_POLL_INTERVAL_SECS").ok(),
        DEFAULT_POLL_INTERVAL_SECS,
    )?;
    Ok(Duration::from_secs(secs))
}

/// Timeout applied to every HTTP request, token requests included.
///
/// Read from `PLAYTALLY_REQUEST_TIMEOUT_SECS`, 10 seconds when unset or
/// blank. A request that runs into it fails with the retryable
/// `Error::Fetch`.
///
/// # Errors
///
/// `Error::Config` when the value is not a whole number of seconds.
pub fn request_timeout() -> Result<Duration> {
    let secs = parse_value(
        "PLAYTALLY_REQUEST_TIMEOUT_SECS",
        env::var("PLAYTALLY_REQUEST_TIMEOUT_SECS").ok(),
        DEFAULT_REQUEST_TIMEOUT_SECS,
    )?;
    Ok(Duration::from_secs(secs))
}

/// Attempts per request before a fetch is given up.
///
/// Read from `PLAYTALLY_MAX_RETRIES`, 5 when unset or blank. `0` and `1`
/// both disable retrying.
///
/// # Errors
///
/// `Error::Config` when the value is not a non-negative integer.
pub fn max_retries() -> Result<u32> {
    parse_value(
        "PLAYTALLY_MAX_RETRIES",
        env::var("PLAYTALLY_MAX_RETRIES").ok(),
        DEFAULT_MAX_RETRIES,
    )
}

fn required(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Auth(format!("{} must be set", name))),
    }
}

fn optional(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_value<T: FromStr>(name: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|_| Error::Config(format!("{} has an invalid value: {}", name, value))),
        _ => Ok(default),
    }
}
