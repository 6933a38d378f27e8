use std::path::PathBuf;

use chrono::Utc;

use crate::{Error, Result, config, spotify, types::Token};

/// Refresh this many seconds before the token actually expires.
const EXPIRY_MARGIN_SECS: u64 = 240;

/// Cached OAuth token of one Spotify user.
pub struct TokenManager {
    username: String,
    token: Token,
}

impl TokenManager {
    pub fn new(username: &str, token: Token) -> Self {
        TokenManager {
            username: username.to_string(),
            token,
        }
    }

    pub async fn load(username: &str) -> Result<Self> {
        let path = Self::token_path(username);
        let content = async_fs::read_to_string(&path).await.map_err(|e| {
            Error::Auth(format!(
                "no cached token for {} ({}), run `playtally {} auth`",
                username, e, username
            ))
        })?;
        let token: Token = serde_json::from_str(&content)?;
        Ok(Self::new(username, token))
    }

    pub async fn persist(&self) -> Result<()> {
        let path = Self::token_path(&self.username);
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.token)?;
        async_fs::write(path, json).await?;
        Ok(())
    }

    /// Access token, refreshed first when it is about to expire.
    pub async fn get_valid_token(&mut self) -> Result<String> {
        if self.is_expired(Utc::now().timestamp() as u64) {
            self.token = spotify::auth::refresh_token(&self.token.refresh_token).await?;
            self.persist().await?;
        }

        Ok(self.token.access_token.clone())
    }

    fn is_expired(&self, now: u64) -> bool {
        now + EXPIRY_MARGIN_SECS >= self.token.obtained_at + self.token.expires_in
    }

    fn token_path(username: &str) -> PathBuf {
        let mut path = config::data_dir();
        path.push(format!("cache/token-{}.json", sanitize(username)));
        path
    }
}

fn sanitize(username: &str) -> String {
    username
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
