use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use playtally::{cli, config, error};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Spotify account the command runs for
    username: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// List your playlists
    Playlists,

    /// Show the track currently playing
    NowPlaying,

    /// Export a playlist to CSV without monitoring
    Export(ExportOptions),

    /// Count plays of a playlist's tracks, then export to CSV
    Monitor(MonitorArgs),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ExportOptions {
    /// Name of the playlist
    #[clap(long)]
    playlist: String,
}

#[derive(Parser, Debug, Clone)]
pub struct MonitorArgs {
    /// Name of the playlist
    #[clap(long)]
    playlist: String,

    /// Stop after this many counted plays
    #[clap(long)]
    plays: u32,

    /// Seconds between two samples (default: PLAYTALLY_POLL_INTERVAL_SECS or 90)
    #[clap(long)]
    interval: Option<u64>,

    /// Count replaying the previous track after an off-playlist track
    #[clap(long)]
    count_replays: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();
    let username = cli.username.as_str();

    match cli.command {
        Command::Auth => cli::auth(username).await,
        Command::Playlists => cli::playlists(username).await,
        Command::NowPlaying => cli::now_playing(username).await,
        Command::Export(opt) => cli::export(username, &opt.playlist).await,
        Command::Monitor(opt) => {
            cli::monitor(
                username,
                cli::MonitorOptions {
                    playlist: opt.playlist,
                    plays: opt.plays,
                    interval: opt.interval,
                    count_replays: opt.count_replays,
                },
            )
            .await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
