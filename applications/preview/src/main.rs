/// Beats Preview - browse the catalog and preview songs in the terminal
use beats_core::Track;
use beats_preview::{Library, PlayOptions, Player, PreviewConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "beats-preview")]
#[command(about = "Browse the Beats catalog and preview songs", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./beats.toml if present)
    #[arg(short, long, global = true, env = "BEATS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search songs by title, artist or mood
    Search {
        /// Search text (empty lists every song)
        #[arg(default_value = "")]
        query: String,

        /// Only show the quick suggestions
        #[arg(short, long)]
        suggest: bool,
    },
    /// List the home page sections
    Sections,
    /// Add a song to favorites, or remove it if already there
    Favorite {
        /// Song ID
        id: String,
    },
    /// List favorite songs
    Favorites,
    /// Preview a song with a live spectrum
    Play {
        /// Song ID
        id: String,
        /// Local audio file to play instead of the song's preview
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Stop after this many seconds
        #[arg(short, long)]
        seconds: Option<f64>,
        /// Loop the preview
        #[arg(short, long = "loop")]
        looping: bool,
        /// Render as fast as possible instead of in real time
        #[arg(long)]
        no_wait: bool,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beats_preview=info,beats_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = PreviewConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Search { query, suggest } => {
            let library = Library::open(&config.library)?;
            if query.trim().is_empty() {
                println!("{}", config.interface.language.search_placeholder());
            }

            let results = if suggest {
                library.catalog.suggestions(&query)
            } else {
                library.catalog.search(&query)
            };
            if results.is_empty() {
                println!("No songs found");
            }
            for track in results {
                print_track(track, library.favorites.contains(&track.id));
            }
        }
        Commands::Sections => {
            let library = Library::open(&config.library)?;
            for section in library.catalog.sections() {
                println!("{} [{}]", section.kind.title(), section.kind.key());
                for track in section.tracks {
                    print!("  ");
                    print_track(track, library.favorites.contains(&track.id));
                }
            }
        }
        Commands::Favorite { id } => {
            let mut library = Library::open(&config.library)?;
            let added = library.toggle_favorite(&id)?;
            let track = library.track(&id)?;
            if added {
                println!("Added to favorites: {}", track.title);
            } else {
                println!("Removed from favorites: {}", track.title);
            }
        }
        Commands::Favorites => {
            let library = Library::open(&config.library)?;
            if library.favorites.is_empty() {
                println!("No favorites yet");
            }
            for track in library.favorites.iter() {
                print_track(track, true);
            }
        }
        Commands::Play {
            id,
            file,
            seconds,
            looping,
            no_wait,
        } => {
            let library = Library::open(&config.library)?;
            let track = library.track(&id)?.clone();

            let limit = match seconds {
                Some(secs) if secs.is_finite() && secs >= 0.0 => Some(Duration::from_secs_f64(secs)),
                Some(secs) => anyhow::bail!("--seconds must be a non-negative number, got {secs}"),
                None => None,
            };
            let options = PlayOptions {
                file,
                limit,
                looping,
                realtime: !no_wait,
            };

            let mut player = Player::new(config, std::io::stdout().lock());
            let summary = player.play(track, &options)?;
            if let (Some(fault), 0) = (&summary.fault, summary.frames) {
                anyhow::bail!("{} could not be previewed: {fault}", summary.track_id);
            }
        }
    }

    Ok(())
}

fn print_track(track: &Track, favorite: bool) {
    let marker = if favorite { '♥' } else { ' ' };
    let moods: Vec<&str> = track.moods.iter().map(|m| m.as_str()).collect();
    let preview = if track.is_playable() { "" } else { "  (no preview)" };
    println!(
        "{marker} {:>3}  {} - {}  [{}]{preview}",
        track.id.as_str(),
        track.title,
        track.artist,
        moods.join(", ")
    );
}
