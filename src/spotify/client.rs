use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::HeaderMap};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::{
    Error, Result, config,
    management::TokenManager,
    types::{
        CurrentlyPlaying, Page, PlayHistory, PlaylistItem, PlaylistSummary,
        RecentlyPlayedResponse,
    },
};

use super::SpotifyApi;

const PLAYLIST_TRACKS_PAGE_SIZE: u32 = 100;
const PLAYLISTS_PAGE_SIZE: u32 = 50;

/// reqwest backed [`SpotifyApi`].
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    tokens: Mutex<TokenManager>,
}

impl SpotifyClient {
    pub fn new(tokens: TokenManager, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url: config::spotify_apiurl().trim_end_matches('/').to_string(),
            tokens: Mutex::new(tokens),
        })
    }

    /// GET `url` and decode the body. `Ok(None)` for `204 No Content`.
    async fn get<T: DeserializeOwned + Send>(&self, url: &str) -> Result<Option<T>> {
        let token = self.tokens.lock().await.get_valid_token().await?;
        let response = self.http.get(url).bearer_auth(token).send().await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if status.is_success() {
            let body = response.text().await?;
            return Ok(Some(serde_json::from_str::<T>(&body)?));
        }

        let retry_after = retry_after(response.headers());
        let body = response.text().await.unwrap_or_default();
        Err(status_error(url, status, retry_after, &body))
    }

    async fn get_page<T: DeserializeOwned + Send>(&self, url: &str) -> Result<Page<T>> {
        self.get::<Page<T>>(url)
            .await?
            .ok_or_else(|| Error::Fetch(format!("{} returned no content", url)))
    }
}

/// Error for a non-2xx response. Only 429 and 5xx are worth retrying.
fn status_error(
    url: &str,
    status: StatusCode,
    retry_after: Option<Duration>,
    body: &str,
) -> Error {
    match status {
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited(retry_after),
        StatusCode::UNAUTHORIZED => Error::Auth(
            "Spotify rejected the access token, run the auth command again".to_string(),
        ),
        status if status.is_client_error() => {
            Error::Rejected(format!("{} returned {}: {}", url, status, body))
        }
        status => Error::Fetch(format!("{} returned {}: {}", url, status, body)),
    }
}

/// `Retry-After` in seconds. The HTTP-date form is ignored.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[async_trait]
impl SpotifyApi for SpotifyClient {
    async fn currently_playing(&self) -> Result<Option<CurrentlyPlaying>> {
        let url = format!("{}/me/player/currently-playing", self.api_url);
        self.get::<CurrentlyPlaying>(&url).await
    }

    async fn recently_played(&self) -> Result<Option<PlayHistory>> {
        let url = format!("{}/me/player/recently-played?limit=1", self.api_url);
        let response = self.get::<RecentlyPlayedResponse>(&url).await?;
        Ok(response.and_then(|r| r.items.into_iter().next()))
    }

    async fn user_playlists(&self, cursor: Option<String>) -> Result<Page<PlaylistSummary>> {
        let url = cursor.unwrap_or_else(|| {
            format!(
                "{}/me/playlists?limit={}",
                self.api_url, PLAYLISTS_PAGE_SIZE
            )
        });
        self.get_page(&url).await
    }

    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        cursor: Option<String>,
    ) -> Result<Page<PlaylistItem>> {
        let url = cursor.unwrap_or_else(|| {
            format!(
                "{}/playlists/{}/tracks?limit={}",
                self.api_url, playlist_id, PLAYLIST_TRACKS_PAGE_SIZE
            )
        });
        self.get_page(&url).await
    }
}
