use crate::{error, export, playlist, success};

pub async fn export(username: &str, playlist_name: &str) {
    let client = super::connect(username).await;
    let retry = super::retry_policy();

    let pb = super::playlists::spinner(&format!("Fetching playlist {}...", playlist_name));
    let result = playlist::load_snapshot(&client, playlist_name, &retry).await;
    pb.finish_and_clear();

    let (_, snapshot) = match result {
        Ok(s) => s,
        Err(e) => error!("Failed to load playlist {}: {}", playlist_name, e),
    };

    match export::export_tracks(export::export_file_name(playlist_name), snapshot.tracks()) {
        Ok(path) => success!("Exported {} tracks to {}", snapshot.len(), path.display()),
        Err(e) => error!("Failed to export playlist: {}", e),
    }
}
