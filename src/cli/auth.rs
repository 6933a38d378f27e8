use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{error, spotify, types::PkceToken};

pub async fn auth(username: &str) {
    let shared_state: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(None));
    if let Err(e) = spotify::auth::auth(username, shared_state).await {
        error!("{}", e);
    }
}
