use crate::{Error, Result, types::PlaylistSummary};

/// Id of the playlist called `name`. Names are not unique on Spotify; the
/// last match wins.
pub fn lookup<'a>(playlists: &'a [PlaylistSummary], name: &str) -> Option<&'a str> {
    playlists
        .iter()
        .rev()
        .find(|playlist| playlist.name == name)
        .map(|playlist| playlist.id.as_str())
}

/// Like [`lookup`], but a missing playlist is an error.
pub fn resolve(playlists: &[PlaylistSummary], name: &str) -> Result<String> {
    lookup(playlists, name)
        .map(str::to_string)
        .ok_or_else(|| Error::PlaylistNotFound(name.to_string()))
}
