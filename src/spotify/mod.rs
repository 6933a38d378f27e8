//! # Spotify Integration Module
//!
//! The rest of the crate talks to Spotify only through the [`SpotifyApi`]
//! trait, so the pagination and monitoring logic can run against a stub.
//! [`SpotifyClient`] is the reqwest implementation used by the CLI.
//!
//! ## API Coverage
//!
//! - `GET /me/player/currently-playing` - track currently playing or paused
//! - `GET /me/player/recently-played?limit=1` - most recently played track
//! - `GET /me/playlists` - the user's playlists, paginated
//! - `GET /playlists/{id}/tracks` - a playlist's tracks, paginated
//! - `POST /api/token` - token exchange and refresh, see [`auth`]
//!
//! ## Error Types
//!
//! All calls return [`crate::Result`]. HTTP 401 maps to `Error::Auth`,
//! HTTP 429 to `Error::RateLimited`, any other 4xx to the non-retryable
//! `Error::Rejected`, and transport failures, timeouts and 5xx to
//! `Error::Fetch`.

pub mod auth;
mod client;

use async_trait::async_trait;

use crate::{
    Result,
    types::{CurrentlyPlaying, Page, PlayHistory, PlaylistItem, PlaylistSummary},
};

pub use client::SpotifyClient;

/// The four read-only calls this tool needs from the Spotify Web API.
///
/// Paginated calls take the continuation cursor returned by the previous
/// page, `None` for the first page.
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    /// Track currently playing or paused, `None` when the player is idle.
    async fn currently_playing(&self) -> Result<Option<CurrentlyPlaying>>;

    /// The single most recently played track, `None` for an empty history.
    async fn recently_played(&self) -> Result<Option<PlayHistory>>;

    async fn user_playlists(&self, cursor: Option<String>) -> Result<Page<PlaylistSummary>>;

    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        cursor: Option<String>,
    ) -> Result<Page<PlaylistItem>>;
}
