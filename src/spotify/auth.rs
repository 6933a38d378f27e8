use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::{Client, Url};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    Error, Result, config,
    management::TokenManager,
    server::start_api_server,
    success,
    types::{PkceToken, Token},
    utils, warning,
};

/// How long the user has to finish the browser consent screen.
const AUTH_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs the OAuth 2.0 authorization code flow with PKCE for `username`.
///
/// 1. Generates a code verifier and its SHA256 challenge
/// 2. Starts the local callback server
/// 3. Opens the authorization URL in the default browser
/// 4. Waits for the callback handler to exchange the code for a token
/// 5. Caches the token for `username`
///
/// # Arguments
///
/// * `username` - Local account name the token is cached under
/// * `shared_state` - State shared with the `/callback` handler, which
///   stores the exchanged token in it
///
/// # Errors
///
/// * `Error::Auth` - The client credentials are missing, or no token
///   arrives within two minutes
/// * `Error::Io` - The token cache cannot be written
pub async fn auth(username: &str, shared_state: Arc<Mutex<Option<PkceToken>>>) -> Result<()> {
    // fail early instead of after the browser round trip
    config::spotify_client_secret()?;

    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let auth_url = authorization_url(&config::spotify_client_id()?, &code_challenge)?;

    {
        let mut lock = shared_state.lock().await;
        *lock = Some(PkceToken {
            code_verifier,
            token: None,
        });
    }

    let server_state = Arc::clone(&shared_state);
    tokio::spawn(async move {
        if let Err(e) = start_api_server(server_state).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let token = wait_for_token(shared_state)
        .await
        .ok_or_else(|| Error::Auth("authentication failed or timed out".to_string()))?;

    TokenManager::new(username, token).persist().await?;
    success!("Authentication for {} successful!", username);
    Ok(())
}

fn authorization_url(client_id: &str, code_challenge: &str) -> Result<Url> {
    let redirect_uri = config::spotify_redirect_uri();
    Url::parse_with_params(
        &config::spotify_apiauth_url(),
        &[
            ("client_id", client_id),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri.as_str()),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("scope", config::spotify_scope()),
        ],
    )
    .map_err(|e| Error::Config(format!("invalid authorization URL: {}", e)))
}

/// Polls the shared state until the callback handler stored a token.
async fn wait_for_token(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Token> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < AUTH_TIMEOUT {
        let lock = shared_state.lock().await;
        if let Some(token) = lock.as_ref().and_then(|pkce| pkce.token.clone()) {
            return Some(token);
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Exchanges a refresh token for a new access token.
///
/// Spotify may omit the refresh token from the response, in which case the
/// old one stays valid and is kept.
///
/// # Arguments
///
/// * `refresh_token` - Refresh token of the cached [`Token`]
///
/// # Returns
///
/// The new token, stamped with the current time as `obtained_at`.
///
/// # Errors
///
/// * `Error::Auth` - Missing client credentials, or the token endpoint
///   rejected the refresh token (revoked access, changed secret)
/// * `Error::Fetch` - Network failure or no answer within
///   `PLAYTALLY_REQUEST_TIMEOUT_SECS`
///
/// # Example
///
/// ```ignore
/// let token = spotify::auth::refresh_token(&cached.refresh_token).await?;
/// ```
pub async fn refresh_token(refresh_token: &str) -> Result<Token> {
    let json = token_request(&[
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
    ])
    .await?;

    token_from_json(&json, Some(refresh_token))
}

/// Exchanges the authorization code received by the callback for a token.
///
/// # Arguments
///
/// * `code` - The `code` query parameter of the `/callback` request
/// * `verifier` - The PKCE code verifier the challenge was derived from
///
/// # Errors
///
/// * `Error::Auth` - Missing client credentials, an expired or reused code,
///   or a verifier that does not match the challenge
/// * `Error::Fetch` - Network failure or no answer within
///   `PLAYTALLY_REQUEST_TIMEOUT_SECS`
pub async fn exchange_code_pkce(code: &str, verifier: &str) -> Result<Token> {
    let redirect_uri = config::spotify_redirect_uri();
    let json = token_request(&[
        ("grant_type", "authorization_code"),
        ("code", code),
        ("code_verifier", verifier),
        ("redirect_uri", redirect_uri.as_str()),
    ])
    .await?;

    token_from_json(&json, None)
}

async fn token_request(form: &[(&str, &str)]) -> Result<Value> {
    let client_id = config::spotify_client_id()?;
    let client_secret = config::spotify_client_secret()?;

    let http = Client::builder()
        .timeout(config::request_timeout()?)
        .build()
        .map_err(|e| Error::Config(format!("cannot build HTTP client: {}", e)))?;

    send_token_request(
        &http,
        &config::spotify_apitoken_url(),
        &client_id,
        &client_secret,
        form,
    )
    .await
}

async fn send_token_request(
    http: &Client,
    url: &str,
    client_id: &str,
    client_secret: &str,
    form: &[(&str, &str)],
) -> Result<Value> {
    let response = http
        .post(url)
        .basic_auth(client_id, Some(client_secret))
        .form(form)
        .send()
        .await?;

    let status = response.status();
    let json: Value = response.json().await?;
    if !status.is_success() {
        return Err(Error::Auth(format!(
            "token endpoint returned {}: {}",
            status,
            json["error_description"].as_str().unwrap_or("no description")
        )));
    }
    Ok(json)
}

fn token_from_json(json: &Value, previous_refresh_token: Option<&str>) -> Result<Token> {
    let access_token = json["access_token"]
        .as_str()
        .ok_or_else(|| Error::Auth("token response without access_token".to_string()))?;

    let refresh_token = json["refresh_token"]
        .as_str()
        .or(previous_refresh_token)
        .ok_or_else(|| Error::Auth("token response without refresh_token".to_string()))?;

    Ok(Token {
        access_token: access_token.to_string(),
        refresh_token: refresh_token.to_string(),
        scope: json["scope"].as_str().unwrap_or_default().to_string(),
        expires_in: json["expires_in"].as_u64().unwrap_or(3600),
        obtained_at: Utc::now().timestamp() as u64,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;

    fn http(timeout: Duration) -> Client {
        Client::builder().timeout(timeout).build().unwrap()
    }

    #[tokio::test]
    async fn test_stalled_token_endpoint_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });
        let url = format!("http://{}/api/token", addr);

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            send_token_request(
                &http(Duration::from_millis(200)),
                &url,
                "client",
                "secret",
                &[("grant_type", "refresh_token"), ("refresh_token", "r")],
            ),
        )
        .await
        .expect("token request outlived its own timeout");

        assert!(matches!(result, Err(Error::Fetch(_))));
    }

    #[tokio::test]
    async fn test_token_endpoint_error_is_auth() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let body = r#"{"error":"invalid_grant","error_description":"Refresh token revoked"}"#;
            let response = format!(
                "HTTP/1.1 400 Bad Request\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
        let url = format!("http://{}/api/token", addr);

        let result = send_token_request(
            &http(Duration::from_secs(5)),
            &url,
            "client",
            "secret",
            &[("grant_type", "refresh_token"), ("refresh_token", "r")],
        )
        .await;

        match result {
            Err(Error::Auth(message)) => assert!(message.contains("Refresh token revoked")),
            other => panic!("expected an auth error, got {:?}", other),
        }
    }

    #[test]
    fn test_token_from_json_keeps_previous_refresh_token() {
        let json = json!({
            "access_token": "new-access",
            "scope": "user-read-recently-played",
            "expires_in": 3600
        });
        let token = token_from_json(&json, Some("old-refresh")).unwrap();
        assert_eq!(token.access_token, "new-access");
        assert_eq!(token.refresh_token, "old-refresh");
        assert_eq!(token.expires_in, 3600);
    }

    #[test]
    fn test_token_from_json_requires_access_token() {
        let json = json!({ "error": "invalid_grant" });
        assert!(matches!(token_from_json(&json, Some("r")), Err(Error::Auth(_))));
    }

    #[test]
    fn test_authorization_url_encodes_scope() {
        let url = authorization_url("client", "challenge").unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("scope".to_string(), config::spotify_scope().to_string())));
        assert!(pairs.contains(&("code_challenge_method".to_string(), "S256".to_string())));
    }
}
