//! ytgrab CLI - download media as tagged audio or video files.

use anyhow::Result;
use clap::{ArgGroup, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use ytgrab_lib::StorePaths;

mod commands;
mod display;

#[derive(Parser)]
#[command(name = "ytgrab")]
#[command(about = "Download media as tagged audio or video files", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Directory holding configuration and history (defaults to the platform location)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a video as an MP3 or a video file
    #[command(group(ArgGroup::new("kind").args(["audio", "video"])))]
    Download {
        /// Video URL (youtube.com, youtu.be, music.youtube.com, shorts)
        url: String,

        /// Extract audio to MP3 (default)
        #[arg(long)]
        audio: bool,

        /// Keep the video
        #[arg(long)]
        video: bool,

        /// Audio bitrate (128, 192, 320) or video resolution (360p, 480p, 720p, 1080p)
        #[arg(long)]
        quality: Option<String>,

        /// Video container (mp4, mkv)
        #[arg(short, long)]
        format: Option<String>,

        /// Output directory. Defaults to the configured download directory.
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Do not write title, artist and album tags
        #[arg(long)]
        no_metadata: bool,
    },

    /// Show or clear the download history
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,

        /// Maximum number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Inspect or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Verify that yt-dlp and ffmpeg are installed
    Check,
}

/// Actions on the download history.
#[derive(Subcommand)]
enum HistoryAction {
    /// Remove every history entry
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// Actions on the configuration file.
#[derive(Subcommand)]
enum ConfigAction {
    /// Print the whole configuration
    Show,

    /// Print one value
    Get {
        /// Setting name
        key: String,
    },

    /// Change one value
    Set {
        /// Setting name
        key: String,
        /// New value
        value: String,
    },

    /// Restore the defaults
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},hyper=warn,reqwest=warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose > 1)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let paths = cli
        .config_dir
        .map_or_else(StorePaths::platform_default, StorePaths::in_dir);

    match command {
        Commands::Download {
            url,
            audio: _,
            video,
            quality,
            format,
            output_dir,
            no_metadata,
        } => {
            let args = commands::download::DownloadArgs {
                url,
                video,
                quality,
                format,
                output_dir,
                no_metadata,
            };
            commands::download::download(&paths, args, cli.quiet).await
        }
        Commands::History { action, limit } => match action {
            Some(HistoryAction::Clear { yes }) => commands::history::clear_history(&paths, yes),
            None => commands::history::show_history(&paths, limit),
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&paths),
            ConfigAction::Get { key } => commands::config::get(&paths, &key),
            ConfigAction::Set { key, value } => commands::config::set(&paths, &key, &value),
            ConfigAction::Reset { yes } => commands::config::reset(&paths, yes),
        },
        Commands::Check => commands::check::check(),
    }
}
