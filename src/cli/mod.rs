//! # CLI Module
//!
//! User-facing commands. Each command builds what it needs from the
//! configuration, delegates to the library modules and reports through the
//! crate's output macros. Fatal errors end the process with `error!`.
//!
//! ## Commands
//!
//! - [`auth`] - authorize playtally for a Spotify account
//! - [`playlists`] - list the account's playlists
//! - [`now_playing`] - show the track currently playing
//! - [`export`] - export a playlist's tracks without monitoring
//! - [`monitor`] - tally plays during a session, then export
//!
//! ## Usage
//!
//! ```bash
//! playtally alice auth
//! playtally alice playlists
//! playtally alice monitor --playlist "na" --plays 20 --interval 60
//! ```

mod auth;
mod export;
mod monitor;
mod now_playing;
mod playlists;

pub use auth::auth;
pub use export::export;
pub use monitor::{MonitorOptions, monitor};
pub use now_playing::now_playing;
pub use playlists::playlists;

use crate::{
    config, error, management::TokenManager, retry::RetryPolicy, spotify::SpotifyClient,
};

/// Client for `username` built from the cached token. Exits when there is none.
async fn connect(username: &str) -> SpotifyClient {
    let tokens = match TokenManager::load(username).await {
        Ok(t) => t,
        Err(e) => error!("Failed to load token: {}", e),
    };

    let timeout = match config::request_timeout() {
        Ok(t) => t,
        Err(e) => error!("{}", e),
    };

    match SpotifyClient::new(tokens, timeout) {
        Ok(client) => client,
        Err(e) => error!("{}", e),
    }
}

fn retry_policy() -> RetryPolicy {
    match config::max_retries() {
        Ok(attempts) => RetryPolicy::with_max_attempts(attempts.max(1)),
        Err(e) => error!("{}", e),
    }
}
