//! WE-DJ command-line front end
//!
//! - `wedj rank`: rank catalog songs as transitions out of a source song
//! - `wedj transition`: request a rendered transition and save its assets
//! - `wedj playlist`: render a gated playlist mix

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wedj_client::backend::HttpRenderBackend;
use wedj_client::coordinator::{AssetSlot, PollPolicy, TransitionCoordinator, TransitionView};
use wedj_client::media::MediaStore;
use wedj_client::playlist::{PlaylistBuilder, PlaylistGate};
use wedj_client::ClientError;
use wedj_common::config::{ClientConfig, ConfigResolver, ENV_BACKEND_URL};
use wedj_common::events::{AssetKind, EventBus, MixEvent, SettleOutcome};
use wedj_common::labels::describe_label;
use wedj_scorer::catalog::{demo_catalog, find_song, load_catalog};
use wedj_scorer::{HarmonicRule, RandomJitter, ScoreJitter, SeededJitter, TransitionScorer};

const EVENT_BUS_CAPACITY: usize = 64;

/// Command-line arguments for wedj
#[derive(Parser, Debug)]
#[command(name = "wedj")]
#[command(about = "WE-DJ transition finder and render client")]
#[command(version)]
struct Args {
    /// Configuration file (default: <config dir>/wedj/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Render backend base URL
    #[arg(long, global = true, env = ENV_BACKEND_URL)]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank catalog songs as transitions out of a song
    Rank {
        /// Id of the song currently playing
        song_id: String,

        /// Catalog file (TOML or JSON); defaults to the built-in demo catalog
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Seed for reproducible score jitter
        #[arg(long)]
        seed: Option<u64>,

        /// Show every candidate instead of the top six
        #[arg(long)]
        all: bool,

        /// Match keys on the full Camelot wheel instead of the classic table
        #[arg(long)]
        camelot: bool,
    },

    /// Generate a transition for a song search and save its assets
    Transition {
        /// Song title and artist
        query: String,

        /// Directory to write the audio and thumbnails into
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Render a playlist of up to ten comma-separated songs
    Playlist {
        /// Comma-separated song list
        songs: String,

        /// Playlist access key
        #[arg(long)]
        key: String,

        /// Output file for the combined mix
        #[arg(long, default_value = "playlist.mp3")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut resolver = ConfigResolver::new();
    if let Some(path) = &args.config {
        resolver = resolver.with_config_path(path);
    }
    if let Some(url) = &args.backend_url {
        resolver = resolver.with_backend_url(url);
    }
    let config = resolver.resolve().context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting WE-DJ client {}", wedj_client::build_summary());

    match args.command {
        Command::Rank {
            song_id,
            catalog,
            seed,
            all,
            camelot,
        } => {
            let rule = if camelot {
                HarmonicRule::Camelot
            } else {
                HarmonicRule::Classic
            };
            run_rank(&config, &song_id, catalog, seed, all, rule)
        }
        Command::Transition { query, out } => run_transition(&config, &query, &out).await,
        Command::Playlist { songs, key, out } => run_playlist(&config, &songs, &key, &out).await,
    }
}

fn run_rank(
    config: &ClientConfig,
    song_id: &str,
    catalog_path: Option<PathBuf>,
    seed: Option<u64>,
    all: bool,
    rule: HarmonicRule,
) -> Result<()> {
    let catalog = match catalog_path.or_else(|| config.catalog_path.clone()) {
        Some(path) => load_catalog(&path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => demo_catalog(),
    };

    let source = find_song(&catalog, song_id)
        .cloned()
        .ok_or_else(|| anyhow!("No song with id {:?} in catalog", song_id))?;

    let mut jitter: Box<dyn ScoreJitter> = match seed {
        Some(seed) => Box::new(SeededJitter::from_seed(seed)),
        None => Box::new(RandomJitter::new()),
    };

    let scorer = TransitionScorer::new(catalog).with_harmonic_rule(rule);
    let ranked = if all {
        scorer.rank(&source, jitter.as_mut())
    } else {
        scorer.top(&source, jitter.as_mut())
    };

    println!("Transitions from {}", source.display_name());
    for (position, candidate) in ranked.iter().enumerate() {
        let song = &candidate.song;
        let bpm = song.bpm.map(|b| format!("{:.0} BPM", b)).unwrap_or_else(|| "? BPM".to_string());
        let key = song.key.map(|k| k.to_string()).unwrap_or_else(|| "?".to_string());
        let reasons: Vec<&str> = candidate.match_reasons.iter().map(|r| r.label()).collect();
        println!(
            "{:>2}. {:<40} {:>3}%  {:>8} {:>4}  {}",
            position + 1,
            song.display_name(),
            candidate.match_score,
            bpm,
            key,
            reasons.join(", ")
        );
    }
    Ok(())
}

async fn run_transition(config: &ClientConfig, query: &str, out: &Path) -> Result<()> {
    let backend = HttpRenderBackend::new(&config.backend_url, &config.search_suffix)
        .map_err(|e| anyhow!("Failed to create render backend client: {}", e))?;
    let events = EventBus::new(EVENT_BUS_CAPACITY);
    let coordinator = TransitionCoordinator::new(Arc::new(backend), PollPolicy::from_config(config), events.clone());

    let mut rx = events.subscribe();
    println!("Generating transition...");
    let ticket = coordinator.search(query).await.map_err(report)?;
    let generation = ticket.generation();

    let settled = ticket.settled();
    tokio::pin!(settled);
    let outcome = loop {
        tokio::select! {
            outcome = &mut settled => break outcome,
            event = rx.recv() => match event {
                Ok(event) if event.generation() == generation => print_event(&event),
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break (&mut settled).await,
            },
        }
    };
    while let Ok(event) = rx.try_recv() {
        if event.generation() == generation {
            print_event(&event);
        }
    }

    match outcome {
        SettleOutcome::Success => {}
        SettleOutcome::Superseded => bail!("Transition was superseded"),
        SettleOutcome::TimedOut | SettleOutcome::Failed => {
            let notice = coordinator.snapshot().notice.unwrap_or_default();
            error!(?outcome, "Transition did not complete");
            bail!("{}", notice);
        }
    }

    let view = wait_for_thumbnails(&coordinator, generation).await;
    write_assets(&view, coordinator.media(), out)?;
    Ok(())
}

/// Wait until thumbnail polling for `generation` has finished either way
async fn wait_for_thumbnails(coordinator: &TransitionCoordinator, generation: u64) -> TransitionView {
    let mut rx = coordinator.subscribe();
    if coordinator.snapshot().is_loading_thumbnails() {
        println!("Loading thumbnails...");
    }
    let view = match rx
        .wait_for(|view| view.generation != generation || !view.is_loading_thumbnails())
        .await
    {
        Ok(view) => view.clone(),
        Err(_) => coordinator.snapshot(),
    };
    view
}

fn write_assets(view: &TransitionView, media: &MediaStore, out: &Path) -> Result<()> {
    let Some(job) = &view.job else {
        return Ok(());
    };
    std::fs::create_dir_all(out)
        .with_context(|| format!("Failed to create output directory {}", out.display()))?;

    for asset in AssetKind::ALL {
        let url = match job.slot(asset) {
            AssetSlot::Resolved(url) => url,
            _ => continue,
        };
        if !url.is_local() {
            println!("{}: {}", asset, url);
            continue;
        }
        let Some(resource) = media.get(url) else {
            continue;
        };

        let path = out.join(format!(
            "{}.{}",
            asset,
            extension_for(resource.content_type.as_deref())
        ));
        std::fs::write(&path, &resource.bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{}: {}", asset, path.display());
    }
    Ok(())
}

async fn run_playlist(config: &ClientConfig, songs: &str, key: &str, out: &Path) -> Result<()> {
    let backend = HttpRenderBackend::new(&config.backend_url, &config.search_suffix)
        .map_err(|e| anyhow!("Failed to create render backend client: {}", e))?;
    let builder = PlaylistBuilder::new(
        Arc::new(backend),
        PlaylistGate::new(config.playlist_secret.clone()),
        PollPolicy::from_config(config),
    );

    println!("Generating playlist...");
    let mix = builder.build(key, songs).await.map_err(report)?;

    std::fs::write(out, &mix.audio.bytes)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    println!("Playlist {} ({} songs): {}", mix.id, mix.songs.len(), out.display());
    Ok(())
}

fn print_event(event: &MixEvent) {
    match event {
        MixEvent::LabelsAvailable {
            current_song,
            transition_song,
            ..
        } => {
            println!("Current:    {}", describe_label(current_song));
            println!("Transition: {}", describe_label(transition_song));
        }
        MixEvent::AssetResolved { asset, .. } => println!("Ready: {}", asset),
        MixEvent::JobSubmitted { .. } | MixEvent::JobSettled { .. } => {}
    }
}

/// Show the short user message, keep the detail for the error chain
fn report(e: ClientError) -> anyhow::Error {
    eprintln!("{}", e.user_message());
    anyhow::Error::new(e)
}

fn extension_for(content_type: Option<&str>) -> &'static str {
    let essence = content_type
        .and_then(|c| c.split(';').next())
        .map(|c| c.trim().to_ascii_lowercase())
        .unwrap_or_default();
    match essence.as_str() {
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/ogg" => "ogg",
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "bin",
    }
}
