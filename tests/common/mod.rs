#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use playtally::{
    Error, Result,
    monitor::Ticker,
    spotify::SpotifyApi,
    types::{
        CurrentlyPlaying, Page, PlayHistory, PlaylistItem, PlaylistSummary, RawAlbum, RawArtist,
        RawTrack, TrackRecord,
    },
};

/// In-memory Spotify API. Cursors are item offsets.
pub struct StubApi {
    pub page_size: usize,
    pub playlists: Vec<PlaylistSummary>,
    pub tracks: HashMap<String, Vec<PlaylistItem>>,
    pub history: Mutex<VecDeque<Result<Option<PlayHistory>>>>,
    /// offset -> number of times the page request fails before succeeding
    pub flaky_pages: Mutex<HashMap<usize, u32>>,
    pub page_requests: AtomicUsize,
    pub history_requests: AtomicUsize,
}

impl StubApi {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            playlists: Vec::new(),
            tracks: HashMap::new(),
            history: Mutex::new(VecDeque::new()),
            flaky_pages: Mutex::new(HashMap::new()),
            page_requests: AtomicUsize::new(0),
            history_requests: AtomicUsize::new(0),
        }
    }

    pub fn with_playlist(mut self, id: &str, name: &str, items: Vec<PlaylistItem>) -> Self {
        self.playlists.push(PlaylistSummary {
            id: id.to_string(),
            name: name.to_string(),
            tracks: None,
        });
        self.tracks.insert(id.to_string(), items);
        self
    }

    pub fn with_history(self, ids: &[&str]) -> Self {
        {
            let mut history = self.history.lock().unwrap();
            for (i, id) in ids.iter().enumerate() {
                history.push_back(Ok(Some(play(id, i))));
            }
        }
        self
    }

    pub fn push_history(&self, sample: Result<Option<PlayHistory>>) {
        self.history.lock().unwrap().push_back(sample);
    }

    pub fn fail_page(&self, offset: usize, times: u32) {
        self.flaky_pages.lock().unwrap().insert(offset, times);
    }

    pub fn page_requests(&self) -> usize {
        self.page_requests.load(Ordering::SeqCst)
    }

    pub fn history_requests(&self) -> usize {
        self.history_requests.load(Ordering::SeqCst)
    }

    fn page<T: Clone>(&self, items: &[T], cursor: Option<String>) -> Result<Page<T>> {
        self.page_requests.fetch_add(1, Ordering::SeqCst);
        let offset: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);

        if let Some(remaining) = self.flaky_pages.lock().unwrap().get_mut(&offset) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Error::Fetch(format!("page at {} timed out", offset)));
            }
        }

        let end = (offset + self.page_size).min(items.len());
        Ok(Page {
            items: items[offset..end].to_vec(),
            next: (end < items.len()).then(|| end.to_string()),
            total: Some(items.len() as u32),
        })
    }
}

#[async_trait]
impl SpotifyApi for StubApi {
    async fn currently_playing(&self) -> Result<Option<CurrentlyPlaying>> {
        Ok(None)
    }

    async fn recently_played(&self) -> Result<Option<PlayHistory>> {
        self.history_requests.fetch_add(1, Ordering::SeqCst);
        self.history
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Fetch("history exhausted".to_string())))
    }

    async fn user_playlists(&self, cursor: Option<String>) -> Result<Page<PlaylistSummary>> {
        self.page(&self.playlists, cursor)
    }

    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        cursor: Option<String>,
    ) -> Result<Page<PlaylistItem>> {
        let items = self
            .tracks
            .get(playlist_id)
            .ok_or_else(|| Error::Fetch(format!("404 for playlist {}", playlist_id)))?;
        self.page(items, cursor)
    }
}

/// Ticker that never sleeps and counts its ticks.
#[derive(Clone, Default)]
pub struct CountingTicker {
    pub ticks: Arc<AtomicUsize>,
}

impl CountingTicker {
    pub fn count(&self) -> usize {
        self.ticks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Ticker for CountingTicker {
    async fn tick(&mut self) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn raw_track(id: &str, name: &str, artists: &[&str]) -> RawTrack {
    RawTrack {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
        artists: artists
            .iter()
            .map(|a| RawArtist {
                id: Some(format!("{}_id", a)),
                name: Some(a.to_string()),
            })
            .collect(),
        album: Some(RawAlbum {
            name: Some(format!("{} album", name)),
            release_date: Some("2021-06-04".to_string()),
        }),
        duration_ms: Some(215_000),
    }
}

pub fn item(id: &str) -> PlaylistItem {
    PlaylistItem {
        added_at: Some("2024-01-01T00:00:00Z".to_string()),
        track: Some(raw_track(id, &format!("Song {}", id), &["Artist"])),
    }
}

pub fn play(id: &str, n: usize) -> PlayHistory {
    PlayHistory {
        track: raw_track(id, &format!("Song {}", id), &["Artist"]),
        played_at: format!("2024-05-01T12:{:02}:00Z", n % 60),
    }
}

pub fn record(id: &str) -> TrackRecord {
    TrackRecord {
        name: format!("Song {}", id),
        artist: "Artist".to_string(),
        album: format!("Song {} album", id),
        release_date: "2021-06-04".to_string(),
        duration_ms: 215_000,
        id: id.to_string(),
        play_count: 0,
    }
}
