use std::future::Future;

use crate::{
    Result,
    retry::RetryPolicy,
    spotify::SpotifyApi,
    types::{Page, PlaylistItem, PlaylistSummary},
};

/// Follows `next` cursors until the last page and concatenates the items.
///
/// Every page is retried on its own according to `retry`. When a page still
/// fails, the error is returned and the pages fetched so far are dropped.
pub async fn collect_pages<T, F, Fut>(retry: &RetryPolicy, mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = retry.run(|| fetch_page(cursor.clone())).await?;
        items.extend(page.items);

        match page.next {
            Some(next) if Some(&next) != cursor.as_ref() => cursor = Some(next),
            // a cursor pointing at itself would never end
            _ => break,
        }
    }

    Ok(items)
}

/// All entries of a playlist's track listing, in playlist order.
pub async fn fetch_playlist_items(
    api: &dyn SpotifyApi,
    playlist_id: &str,
    retry: &RetryPolicy,
) -> Result<Vec<PlaylistItem>> {
    collect_pages(retry, |cursor| api.playlist_tracks(playlist_id, cursor)).await
}

/// All playlists owned or followed by the current user.
pub async fn fetch_user_playlists(
    api: &dyn SpotifyApi,
    retry: &RetryPolicy,
) -> Result<Vec<PlaylistSummary>> {
    collect_pages(retry, |cursor| api.user_playlists(cursor)).await
}
