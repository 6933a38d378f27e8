use crate::{error, info, playlist::normalize, spotify::SpotifyApi, success, warning};

pub async fn now_playing(username: &str) {
    let client = super::connect(username).await;

    let current = match super::retry_policy().run(|| client.currently_playing()).await {
        Ok(c) => c,
        Err(e) => error!("Failed to fetch the current track: {}", e),
    };

    let Some(current) = current else {
        info!("Nothing is playing right now");
        return;
    };

    let Some(track) = current.item else {
        info!("The player is active but not playing a track");
        return;
    };

    match normalize::normalize(&track) {
        Ok(record) => {
            let state = if current.is_playing { "Playing" } else { "Paused" };
            success!(
                "{}: {} by {} ({}) [{}]",
                state,
                record.name,
                record.artist,
                record.album,
                record.id
            );
        }
        Err(e) => warning!("The current track cannot be shown: {}", e),
    }
}
