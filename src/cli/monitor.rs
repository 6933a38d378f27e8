use std::time::Duration;

use indicatif::ProgressBar;
use tabled::Table;

use crate::{
    Result, config, error, export, info,
    monitor::{IntervalTicker, Monitor, MonitorConfig, Outcome, RepeatPolicy, Step, Ticker},
    playlist::{self, Snapshot},
    success, warning,
};

#[derive(Debug, Clone)]
pub struct MonitorOptions {
    pub playlist: String,
    pub plays: u32,
    pub interval: Option<u64>,
    pub count_replays: bool,
}

pub async fn monitor(username: &str, opts: MonitorOptions) {
    let client = super::connect(username).await;
    let retry = super::retry_policy();

    let interval = match opts.interval {
        Some(secs) if secs > 0 => Duration::from_secs(secs),
        Some(_) => error!("--interval must be at least one second"),
        None => match config::poll_interval() {
            Ok(i) => i,
            Err(e) => error!("{}", e),
        },
    };

    let pb = super::playlists::spinner(&format!("Fetching playlist {}...", opts.playlist));
    let result = playlist::load_snapshot(&client, &opts.playlist, &retry).await;
    pb.finish_and_clear();

    let (_, snapshot) = match result {
        Ok(s) => s,
        Err(e) => error!("Failed to load playlist {}: {}", opts.playlist, e),
    };

    if snapshot.is_empty() {
        warning!("Playlist {} has no usable tracks, nothing to monitor", opts.playlist);
        write_export(&opts.playlist, &snapshot);
        return;
    }

    info!(
        "Monitoring {} tracks of {} until {} plays are counted, sampling every {}s. Press Ctrl-C to stop early.",
        snapshot.len(),
        opts.playlist,
        opts.plays,
        interval.as_secs()
    );

    let repeat_policy = if opts.count_replays {
        RepeatPolicy::LastObserved
    } else {
        RepeatPolicy::LastCounted
    };
    let mut monitor = Monitor::new(
        &client,
        IntervalTicker::new(interval),
        snapshot,
        MonitorConfig {
            max_plays: opts.plays,
            repeat_policy,
            retry,
        },
    );

    let pb = super::playlists::spinner("Waiting for the first sample...");
    let outcome = tokio::select! {
        result = run_with_progress(&mut monitor, &pb, opts.plays) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };
    pb.finish_and_clear();

    match outcome {
        Some(Ok(())) => success!("Counted {} plays", monitor.transitions()),
        Some(Err(e)) => warning!(
            "Monitoring stopped after {} plays: {}. Exporting partial results.",
            monitor.transitions(),
            e
        ),
        None => warning!(
            "Interrupted after {} plays. Exporting partial results.",
            monitor.transitions()
        ),
    }

    let snapshot = monitor.into_snapshot();
    print_played(&snapshot);
    write_export(&opts.playlist, &snapshot);
}

async fn run_with_progress<T: Ticker>(
    monitor: &mut Monitor<'_, T>,
    pb: &ProgressBar,
    plays: u32,
) -> Result<()> {
    loop {
        match monitor.step().await? {
            Step::Finished => return Ok(()),
            Step::Observed {
                observation,
                outcome,
            } => {
                let last = observation
                    .map(|o| format!("{} by {}", o.name, o.artist))
                    .unwrap_or_else(|| "-".to_string());
                let note = match outcome {
                    Outcome::Counted { play_count, .. } => format!("counted (x{})", play_count),
                    Outcome::Repeat => "already counted".to_string(),
                    Outcome::OffPlaylist => "not in playlist".to_string(),
                    Outcome::NoHistory => "no history".to_string(),
                    Outcome::Malformed => "unreadable sample".to_string(),
                };
                pb.set_message(format!(
                    "{}/{} plays | last: {} ({})",
                    monitor.transitions(),
                    plays,
                    last,
                    note
                ));
            }
        }
    }
}

fn print_played(snapshot: &Snapshot) {
    let played: Vec<_> = snapshot
        .tracks()
        .iter()
        .filter(|t| t.play_count > 0)
        .cloned()
        .collect();

    if !played.is_empty() {
        println!("{}", Table::new(played));
    }
}

fn write_export(playlist_name: &str, snapshot: &Snapshot) {
    match export::export_tracks(export::export_file_name(playlist_name), snapshot.tracks()) {
        Ok(path) => success!(
            "Exported {} tracks ({} plays) to {}",
            snapshot.len(),
            snapshot.total_plays(),
            path.display()
        ),
        Err(e) => error!("Failed to export playlist: {}", e),
    }
}
