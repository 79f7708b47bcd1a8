use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, Interval};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod error;
mod models;
mod render;
mod routes;
mod services;

use api::{stream_url, ApiClient};
use config::AppConfig;
use error::ClientError;
use models::{
    CreateLibraryRequest, EpisodeId, LibraryId, LibraryType, Movie, MovieId, Series, SeriesId,
};
use routes::Route;
use services::listing::{ListingItem, ListingView};
use services::{
    playback_notice, resolve_playable, settled, setup, BootRouter, ClientContext, ClientOptions,
    CollectionLoader, Destination, EpisodeDetail, LoadState, LoaderOptions, MovieDetail,
    PlayableOwner, ScanActions,
};

#[derive(Parser)]
#[command(name = "vio-client", version, about = "Terminal client for a personal media library")]
struct Cli {
    /// Catalog service URL (overrides config.toml and VIO_SERVER_URL)
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Pick the start page from the configured libraries and show it (default)
    Boot,
    /// Create a library, then boot again
    Setup {
        #[arg(long)]
        name: String,
        /// Media folder on the service host
        #[arg(long)]
        path: String,
        /// movies or series
        #[arg(long = "type", default_value = "movies")]
        library_type: LibraryType,
    },
    /// List the first movie library
    Movies,
    /// List series
    Series,
    /// Show a series with its seasons and episodes
    Show { id: SeriesId },
    /// Show one episode
    Episode {
        id: EpisodeId,
        /// Series the episode was opened from
        #[arg(long)]
        series: Option<SeriesId>,
    },
    /// Show one movie
    Movie {
        id: MovieId,
        /// Library the movie was opened from
        #[arg(long)]
        library: Option<LibraryId>,
    },
    /// Resolve a movie or episode to a stream URL
    Play {
        #[arg(value_enum)]
        kind: PlayKind,
        id: i64,
    },
    /// Scan every library, then refresh
    Scan {
        /// Rescan instead of looking for new files only
        #[arg(long)]
        full: bool,
    },
    /// Enrich everything listed on the start page
    Enrich,
    /// Keep the start page on screen and re-render it on every change
    Watch {
        /// Run an incremental scan every N seconds
        #[arg(long)]
        scan_every: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlayKind {
    Movie,
    Episode,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vio_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = AppConfig::load();
    if let Some(server) = cli.server {
        config.base_url = server.trim_end_matches('/').to_string();
    }
    config.log_config();

    let client = Arc::new(
        ApiClient::new(&config.base_url, config.request_timeout)
            .context("Failed to create catalog client")?,
    );
    let base_url = client.base_url().to_string();
    let base_url = base_url.as_str();
    let ctx = ClientContext::new(client, ClientOptions::from(&config));

    match cli.command.unwrap_or(Command::Boot) {
        Command::Boot => {
            boot(&ctx, base_url).await;
        }
        Command::Setup {
            name,
            path,
            library_type,
        } => {
            let request = CreateLibraryRequest {
                name,
                path,
                library_type,
            };
            let (library, destination) = setup(ctx.catalog.as_ref(), &request)
                .await
                .context("Failed to create library")?;
            println!("Created {} library '{}'", library.library_type.as_str(), library.name);
            show_destination(&ctx, destination, base_url).await;
        }
        Command::Movies => show_listing::<Movie>(&ctx, base_url).await,
        Command::Series => show_listing::<Series>(&ctx, base_url).await,
        Command::Show { id } => {
            let loader = CollectionLoader::mount(
                &ctx,
                LoaderOptions {
                    timeout: ctx.options.load_timeout,
                },
            );
            let mut rx = loader.watch();
            loader.set_root(id);
            let state = settled(&mut rx).await.unwrap_or(LoadState::Pending);
            println!("{}", render::series_tree(&state));
        }
        Command::Episode { id, series } => {
            match EpisodeDetail::load(ctx.catalog.as_ref(), id, series).await {
                Ok(detail) => println!("{}", render::episode_detail(&detail, base_url)),
                Err(ClientError::Api(e)) if e.is_not_found() => {
                    println!("Episode {} not found", id)
                }
                Err(e) => return Err(e).context("Failed to load episode"),
            }
        }
        Command::Movie { id, library } => {
            match MovieDetail::load(ctx.catalog.as_ref(), id, library).await {
                Ok(detail) => println!("{}", render::movie_detail(&detail, base_url)),
                Err(ClientError::Api(e)) if e.is_not_found() => {
                    println!("Movie {} not found", id)
                }
                Err(e) => return Err(e).context("Failed to load movie"),
            }
        }
        Command::Play { kind, id } => {
            let owner = match kind {
                PlayKind::Movie => PlayableOwner::Movie(id),
                PlayKind::Episode => PlayableOwner::Episode(id),
            };
            match resolve_playable(ctx.catalog.as_ref(), owner).await {
                Ok(file_id) => {
                    println!("{}", Route::Player(file_id));
                    println!("{}", stream_url(base_url, file_id));
                }
                Err(e) => {
                    tracing::debug!("Resolving {:?} failed: {}", owner, e);
                    println!("{}", playback_notice(owner, &e));
                }
            }
        }
        Command::Scan { full } => {
            let scans = ScanActions::new(&ctx);
            let report = if full {
                scans.full_scan().await
            } else {
                scans.incremental_scan().await
            }
            .context("Scan failed")?;
            println!("Scanned {} libraries", report.libraries);
            for job in &report.failed_jobs {
                println!(
                    "Job {} failed: {}",
                    job.id,
                    job.error.as_deref().unwrap_or("unknown error")
                );
            }
            for job_id in &report.unfinished_jobs {
                println!("Job {} still running", job_id);
            }
        }
        Command::Enrich => match BootRouter::new().run(ctx.catalog.as_ref()).await {
            Destination::Setup => println!("Nothing to enrich: no libraries configured."),
            Destination::MoviesListing => enrich_listing::<Movie>(&ctx).await?,
            Destination::SeriesListing => enrich_listing::<Series>(&ctx).await?,
        },
        Command::Watch { scan_every } => {
            let scan_every = scan_every.filter(|s| *s > 0).map(Duration::from_secs);
            match BootRouter::new().run(ctx.catalog.as_ref()).await {
                Destination::Setup => println!("{}", setup_hint()),
                Destination::MoviesListing => {
                    watch_listing::<Movie>(&ctx, base_url, scan_every).await
                }
                Destination::SeriesListing => {
                    watch_listing::<Series>(&ctx, base_url, scan_every).await
                }
            }
        }
    }

    Ok(())
}

fn setup_hint() -> &'static str {
    "No libraries configured. Create one with: vio-client setup --name <name> --path <path> --type movies|series"
}

async fn boot(ctx: &ClientContext, base_url: &str) {
    let destination = BootRouter::new().run(ctx.catalog.as_ref()).await;
    show_destination(ctx, destination, base_url).await;
}

async fn show_destination(ctx: &ClientContext, destination: Destination, base_url: &str) {
    println!("→ {}", destination.route());
    match destination {
        Destination::Setup => println!("{}", setup_hint()),
        Destination::MoviesListing => show_listing::<Movie>(ctx, base_url).await,
        Destination::SeriesListing => show_listing::<Series>(ctx, base_url).await,
    }
}

async fn show_listing<T: ListingItem>(ctx: &ClientContext, base_url: &str) {
    let view = ListingView::<T>::mount(ctx);
    let mut rx = view.watch();
    let state = settled(&mut rx).await.unwrap_or(LoadState::Pending);
    println!("{}", render::listing(&state, base_url));
}

async fn enrich_listing<T: ListingItem>(ctx: &ClientContext) -> Result<()> {
    let view = ListingView::<T>::mount(ctx);
    let mut rx = view.watch();
    settled(&mut rx).await;

    let ran = ctx
        .enrich_actions
        .trigger()
        .await
        .context("Enrich failed")?;
    if ran {
        println!("Enrichment requested for {}", T::HEADING.to_lowercase());
    }
    drop(view);
    Ok(())
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn watch_listing<T: ListingItem>(
    ctx: &ClientContext,
    base_url: &str,
    scan_every: Option<Duration>,
) {
    let view = ListingView::<T>::mount(ctx);
    let mut rx = view.watch();
    let scans = ScanActions::new(ctx);
    let mut ticker =
        scan_every.map(|period| tokio::time::interval_at(Instant::now() + period, period));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    println!("{}\n", render::listing(&view.state(), base_url));

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                println!("{}\n", render::listing(&state, base_url));
            }
            _ = next_tick(&mut ticker) => {
                if let Err(e) = scans.incremental_scan().await {
                    tracing::warn!("Background scan failed: {}", e);
                }
            }
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    tracing::warn!("Failed to listen for Ctrl+C: {}", e);
                }
                tracing::info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }
}
