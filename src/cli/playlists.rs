use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{error, info, playlist::pagination, types::PlaylistTableRow};

pub async fn playlists(username: &str) {
    let client = super::connect(username).await;
    let retry = super::retry_policy();

    let pb = spinner("Fetching playlists...");
    let result = pagination::fetch_user_playlists(&client, &retry).await;
    pb.finish_and_clear();

    let playlists = match result {
        Ok(p) => p,
        Err(e) => error!("Failed to fetch playlists: {}", e),
    };

    if playlists.is_empty() {
        info!("{} has no playlists", username);
        return;
    }

    let rows: Vec<PlaylistTableRow> = playlists
        .into_iter()
        .map(|p| PlaylistTableRow {
            name: p.name,
            tracks: p
                .tracks
                .map(|t| t.total.to_string())
                .unwrap_or_else(|| "?".to_string()),
            id: p.id,
        })
        .collect();

    println!("{}", Table::new(rows));
}

pub(super) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
