use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use csv::Writer;

use crate::{Result, types::TrackRecord};

/// CSV header, in column order.
pub const COLUMNS: [&str; 7] = [
    "name",
    "artist",
    "album",
    "release_date",
    "duration_ms",
    "id",
    "play_count",
];

/// `playlist_<name>.csv`, with characters that would escape the working
/// directory replaced by `_`.
pub fn export_file_name(playlist_name: &str) -> String {
    let safe: String = playlist_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    format!("playlist_{}.csv", safe)
}

/// Writes `tracks` to `path` as CSV, header first, in the given order.
///
/// The file is truncated first; a failure halfway leaves a partial file.
pub fn export_tracks(path: impl AsRef<Path>, tracks: &[TrackRecord]) -> Result<PathBuf> {
    let path = path.as_ref();
    write_tracks(File::create(path)?, tracks)?;
    Ok(path.to_path_buf())
}

/// Writes the CSV to any writer.
pub fn write_tracks<W: Write>(writer: W, tracks: &[TrackRecord]) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);

    // written explicitly so an empty playlist still gets a header
    wtr.write_record(COLUMNS)?;
    for track in tracks {
        wtr.write_record([
            track.name.as_str(),
            track.artist.as_str(),
            track.album.as_str(),
            track.release_date.as_str(),
            track.duration_ms.to_string().as_str(),
            track.id.as_str(),
            track.play_count.to_string().as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
