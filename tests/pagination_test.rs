mod common;

use common::{StubApi, item};
use playtally::{
    Error,
    playlist::{self, pagination},
    retry::RetryPolicy,
    types::PlaylistItem,
};

const CORPUS_SIZES: [usize; 5] = [1, 2, 100, 101, 250];

fn corpus(size: usize) -> Vec<PlaylistItem> {
    (0..size).map(|i| item(&format!("t{:03}", i))).collect()
}

fn ids(items: &[PlaylistItem]) -> Vec<String> {
    items
        .iter()
        .map(|i| i.track.as_ref().and_then(|t| t.id.clone()).unwrap())
        .collect()
}

#[tokio::test]
async fn test_pages_concatenate_to_whole_playlist() {
    for page_size in CORPUS_SIZES {
        for size in CORPUS_SIZES {
            let tracks = corpus(size);
            let api = StubApi::new(page_size).with_playlist("pl", "mix", tracks.clone());

            let fetched = pagination::fetch_playlist_items(&api, "pl", &RetryPolicy::none())
                .await
                .unwrap();

            assert_eq!(ids(&fetched), ids(&tracks), "page size {}, corpus {}", page_size, size);
            assert_eq!(
                api.page_requests(),
                size.div_ceil(page_size),
                "page size {}, corpus {}",
                page_size,
                size
            );
        }
    }
}

#[tokio::test]
async fn test_empty_playlist_is_one_request() {
    let api = StubApi::new(100).with_playlist("pl", "empty", Vec::new());

    let fetched = pagination::fetch_playlist_items(&api, "pl", &RetryPolicy::none())
        .await
        .unwrap();

    assert!(fetched.is_empty());
    assert_eq!(api.page_requests(), 1);
}

#[tokio::test]
async fn test_transient_page_failure_is_retried_per_page() {
    let api = StubApi::new(100).with_playlist("pl", "mix", corpus(250));
    api.fail_page(100, 2);

    let retry = RetryPolicy {
        max_attempts: 3,
        ..RetryPolicy::none()
    };
    let fetched = pagination::fetch_playlist_items(&api, "pl", &retry)
        .await
        .unwrap();

    assert_eq!(fetched.len(), 250);
    // 3 pages, the second one requested three times
    assert_eq!(api.page_requests(), 5);
}

#[tokio::test]
async fn test_persistent_page_failure_fails_whole_fetch() {
    let api = StubApi::new(100).with_playlist("pl", "mix", corpus(250));
    api.fail_page(200, 10);

    let retry = RetryPolicy {
        max_attempts: 2,
        ..RetryPolicy::none()
    };
    let result = pagination::fetch_playlist_items(&api, "pl", &retry).await;

    assert!(matches!(result, Err(Error::Fetch(_))));
}

#[tokio::test]
async fn test_user_playlists_are_paginated() {
    let mut api = StubApi::new(2);
    for i in 0..5 {
        api = api.with_playlist(&format!("id{}", i), &format!("list {}", i), Vec::new());
    }

    let playlists = pagination::fetch_user_playlists(&api, &RetryPolicy::none())
        .await
        .unwrap();

    let names: Vec<_> = playlists.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["list 0", "list 1", "list 2", "list 3", "list 4"]);
    assert_eq!(api.page_requests(), 3);
}

#[tokio::test]
async fn test_load_snapshot_resolves_and_normalizes() {
    let mut tracks = corpus(3);
    tracks.insert(1, PlaylistItem::default());
    let api = StubApi::new(100)
        .with_playlist("other", "chill", corpus(1))
        .with_playlist("pl", "na", tracks);

    let (playlist_id, snapshot) = playlist::load_snapshot(&api, "na", &RetryPolicy::none())
        .await
        .unwrap();

    assert_eq!(playlist_id, "pl");
    let ids: Vec<_> = snapshot.tracks().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["t000", "t001", "t002"]);
    assert_eq!(snapshot.total_plays(), 0);
}

#[tokio::test]
async fn test_load_snapshot_unknown_playlist() {
    let api = StubApi::new(100).with_playlist("pl", "na", corpus(3));

    let result = playlist::load_snapshot(&api, "missing", &RetryPolicy::none()).await;

    assert!(matches!(result, Err(Error::PlaylistNotFound(name)) if name == "missing"));
    // no track listing was requested for a made-up id
    assert_eq!(api.page_requests(), 1);
}
