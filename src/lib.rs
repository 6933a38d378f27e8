//! Spotify Play Tally Library
//!
//! This library resolves one of the user's playlists, tallies how often each
//! of its tracks is played while a listening session is monitored, and
//! exports the annotated track list to CSV.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints for the local OAuth callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - The crate error type
//! - `export` - CSV export of annotated playlists
//! - `management` - Token caching
//! - `monitor` - The play-count polling loop
//! - `playlist` - Pagination, normalization and playlist lookup
//! - `retry` - Bounded retry with exponential backoff
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - PKCE helpers
//!
//! # Example
//!
//! ```
//! use playtally::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> playtally::Result<()> {
//!     config::load_env().await?;
//!     // Use CLI functions...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod management;
pub mod monitor;
pub mod playlist;
pub mod retry;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Fetching playlists for {}", username);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Exported {} tracks", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Terminates the process with exit code 1. Only used from the CLI layer for
/// errors that end the session.
///
/// # Example
///
/// ```
/// error!("Failed to load token: {}", e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues such as skipped tracks or retried requests.
///
/// # Example
///
/// ```
/// warning!("Skipping playlist entry {}: {}", index, e);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
