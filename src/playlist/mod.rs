//! Building the playlist snapshot a session is tallied against.
//!
//! ```text
//! directory::resolve  ->  pagination::fetch_playlist_items  ->  normalize::normalize_items
//!   (name -> id)            (all pages, in order)                 (raw -> TrackRecord)
//! ```

pub mod directory;
pub mod normalize;
pub mod pagination;
mod snapshot;

pub use snapshot::Snapshot;

use crate::{Result, retry::RetryPolicy, spotify::SpotifyApi};

/// Resolves `name` among the user's playlists and loads its tracks with
/// zeroed play counts.
pub async fn load_snapshot(
    api: &dyn SpotifyApi,
    name: &str,
    retry: &RetryPolicy,
) -> Result<(String, Snapshot)> {
    let playlists = pagination::fetch_user_playlists(api, retry).await?;
    let playlist_id = directory::resolve(&playlists, name)?;
    let items = pagination::fetch_playlist_items(api, &playlist_id, retry).await?;
    let tracks = normalize::normalize_items(items);
    Ok((playlist_id, Snapshot::new(tracks)))
}
