use crate::{
    Error, Result,
    types::{Observation, PlayHistory, PlaylistItem, RawTrack, TrackRecord},
    warning,
};

/// Projects a raw track onto a [`TrackRecord`] with `play_count` 0.
///
/// Only the first listed artist is kept.
pub fn normalize(track: &RawTrack) -> Result<TrackRecord> {
    let album = track
        .album
        .as_ref()
        .ok_or(Error::MalformedTrack { field: "album" })?;

    Ok(TrackRecord {
        name: required(&track.name, "name")?,
        artist: first_artist(track)?,
        album: required(&album.name, "album.name")?,
        release_date: required(&album.release_date, "album.release_date")?,
        duration_ms: track
            .duration_ms
            .ok_or(Error::MalformedTrack { field: "duration_ms" })?,
        id: required(&track.id, "id")?,
        play_count: 0,
    })
}

/// Normalizes a playlist listing, skipping entries that cannot be used.
///
/// Tracks removed from the catalog show up as `null` entries and local files
/// come without an id; both are skipped with a warning.
pub fn normalize_items(items: Vec<PlaylistItem>) -> Vec<TrackRecord> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(position, item)| {
            let Some(track) = item.track else {
                warning!("Skipping playlist entry {}: track unavailable", position + 1);
                return None;
            };
            match normalize(&track) {
                Ok(record) => Some(record),
                Err(e) => {
                    warning!(
                        "Skipping playlist entry {} ({}): {}",
                        position + 1,
                        track.name.as_deref().unwrap_or("unknown"),
                        e
                    );
                    None
                }
            }
        })
        .collect()
}

/// Turns a recently played entry into an [`Observation`]. Only the id is required.
pub fn observation(history: &PlayHistory) -> Result<Observation> {
    let track = &history.track;
    Ok(Observation {
        id: required(&track.id, "id")?,
        played_at: history.played_at.clone(),
        name: track.name.clone().unwrap_or_default(),
        artist: first_artist(track).unwrap_or_default(),
    })
}

fn first_artist(track: &RawTrack) -> Result<String> {
    track
        .artists
        .first()
        .and_then(|artist| artist.name.clone())
        .ok_or(Error::MalformedTrack { field: "artists" })
}

fn required(value: &Option<String>, field: &'static str) -> Result<String> {
    value.clone().ok_or(Error::MalformedTrack { field })
}
