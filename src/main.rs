use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use league_analytics::api::{build_router, state::AppState};
use league_analytics::cache::{FileCache, KeyValueCache, MemoryCache};
use league_analytics::calculate::{build_report, top_teams_by, AnalyticsReport, ReportOptions};
use league_analytics::config::AppConfig;
use league_analytics::fetch::{
    ApiClientConfig, ApiSportsClient, CachedSource, DataSource, DirectorySource, Endpoint,
    RequestTrace,
};
use league_analytics::models::TeamMetric;
use league_analytics::storage::{JsonlReader, StorageConfig};

#[derive(Parser)]
#[command(name = "league-analytics")]
#[command(about = "Football league analytics over API-Sports data")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a league season and print its analytics
    Analyze {
        #[arg(long)]
        league: Option<u32>,

        #[arg(long)]
        season: Option<u32>,

        /// Moving-average window size
        #[arg(long)]
        window: Option<usize>,

        /// Length of each top-N list
        #[arg(long)]
        limit: Option<usize>,

        /// Ignore cached payloads
        #[arg(long)]
        refresh: bool,

        /// Read `{endpoint}.json` payloads from this directory instead of the API
        #[arg(long)]
        offline_dir: Option<PathBuf>,

        /// Part of the report to print
        #[arg(long, value_enum, default_value = "all")]
        section: Section,

        /// Print one ranking instead, e.g. points, goal-difference, efficiency
        #[arg(long)]
        rank_by: Option<TeamMetric>,

        /// Also write the full report under the data directory
        #[arg(long)]
        save: bool,
    },

    /// Print one raw upstream payload
    Fetch {
        /// standings, fixtures or teams
        #[arg(long)]
        endpoint: String,

        #[arg(long)]
        league: Option<u32>,

        #[arg(long)]
        season: Option<u32>,

        /// Ignore cached payloads
        #[arg(long)]
        refresh: bool,
    },

    /// Inspect or prune the payload cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show recent upstream requests
    Traces {
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cached entries
    Info,
    /// Drop expired and unreadable entries
    Cleanup,
    /// Drop every entry
    Clear,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Section {
    All,
    Teams,
    Ratios,
    Fixtures,
    Time,
    Moving,
    Top,
}

fn section_value(report: &AnalyticsReport, section: Section) -> Result<serde_json::Value> {
    let value = match section {
        Section::All => serde_json::to_value(report)?,
        Section::Teams => serde_json::to_value(&report.teams)?,
        Section::Ratios => serde_json::to_value(&report.team_ratios)?,
        Section::Fixtures => {
            let mut value = serde_json::Map::new();
            value.insert("fixtures".into(), serde_json::to_value(&report.fixtures)?);
            value.insert(
                "rejected".into(),
                serde_json::to_value(&report.rejected_fixtures)?,
            );
            serde_json::Value::Object(value)
        }
        Section::Time => serde_json::to_value(&report.time_aggregations)?,
        Section::Moving => serde_json::to_value(&report.moving_averages)?,
        Section::Top => serde_json::to_value(&report.top_teams)?,
    };
    Ok(value)
}

fn open_cache(config: &AppConfig, storage: &StorageConfig) -> Result<Arc<dyn KeyValueCache>> {
    let ttl = config
        .cache
        .ttl_duration()
        .with_context(|| format!("invalid cache TTL {:?}", config.cache.ttl))?;

    Ok(match config.cache.backend.as_str() {
        "memory" => Arc::new(MemoryCache::new(ttl)),
        _ => Arc::new(
            FileCache::new(storage.cache_dir())
                .with_ttl(ttl)
                .with_prefix(&config.cache.file_prefix),
        ),
    })
}

fn open_source(
    config: &AppConfig,
    storage: &StorageConfig,
    offline_dir: Option<PathBuf>,
) -> Result<Arc<dyn DataSource>> {
    if let Some(dir) = offline_dir {
        tracing::info!("Reading payloads from {}", dir.display());
        return Ok(Arc::new(DirectorySource::new(dir)));
    }

    let base_url = Url::parse(&config.api.base_url)
        .with_context(|| format!("invalid API base URL {}", config.api.base_url))?;
    let client = ApiSportsClient::new(
        ApiClientConfig::new(base_url, &config.api.api_key()?)
            .with_host(&config.api.host)
            .with_timeout(config.api.timeout())
            .with_trace_log(storage.trace_log_path()),
    )?;
    Ok(Arc::new(client))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(Some(&cli.config))
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Starting league-analytics v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(config.data_dir.clone());

    match cli.command {
        Commands::Analyze {
            league,
            season,
            window,
            limit,
            refresh,
            offline_dir,
            section,
            rank_by,
            save,
        } => {
            let league = league.unwrap_or(config.analytics.league);
            let season = season.unwrap_or(config.analytics.season);
            let defaults = config.analytics.report_options();
            let options = ReportOptions {
                window_size: window.unwrap_or(defaults.window_size),
                top_limit: limit.unwrap_or(defaults.top_limit),
            };

            let source = CachedSource::new(
                open_source(&config, &storage, offline_dir)?,
                open_cache(&config, &storage)?,
            );
            let fetched = source.fetch_all(league, season, refresh).await?;
            let [standings, fixtures, teams] = fetched.as_slice() else {
                anyhow::bail!("expected 3 payloads, got {}", fetched.len());
            };

            let report = build_report(&teams.payload, &standings.payload, &fixtures.payload, options);
            if !report.rejected_fixtures.is_empty() {
                tracing::warn!("{} fixtures were rejected", report.rejected_fixtures.len());
            }

            if save {
                let path = storage
                    .reports_dir()
                    .join(format!("{}_{}.json", league, season));
                std::fs::create_dir_all(storage.reports_dir())?;
                std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
                tracing::info!("Saved report to {}", path.display());
            }

            match rank_by {
                Some(metric) => print_json(&top_teams_by(
                    &report.team_ratios,
                    options.top_limit,
                    metric,
                ))?,
                None => print_json(&section_value(&report, section)?)?,
            }
        }
        Commands::Fetch {
            endpoint,
            league,
            season,
            refresh,
        } => {
            let endpoint: Endpoint = endpoint.parse()?;
            let league = league.unwrap_or(config.analytics.league);
            let season = season.unwrap_or(config.analytics.season);

            let source = CachedSource::new(
                open_source(&config, &storage, None)?,
                open_cache(&config, &storage)?,
            );
            let fetched = if refresh {
                source.refetch(endpoint, league, season).await?
            } else {
                source.fetch(endpoint, league, season).await?
            };
            tracing::info!("Served {} (from cache: {})", endpoint, fetched.from_cache);

            print_json(&fetched.payload)?;
        }
        Commands::Cache { action } => {
            let cache = open_cache(&config, &storage)?;
            match action {
                CacheAction::Info => {
                    let entries = cache.entries();
                    println!("{} cached entries", entries.len());
                    for entry in entries {
                        println!(
                            "  {:<32} {:>9} bytes  written {}  expires {}",
                            entry.key,
                            entry.size,
                            entry.timestamp.format("%Y-%m-%d %H:%M"),
                            entry.expires.format("%Y-%m-%d %H:%M"),
                        );
                    }
                }
                CacheAction::Cleanup => {
                    let removed = cache.invalidate_expired()?;
                    println!("Removed {} expired entries", removed);
                }
                CacheAction::Clear => {
                    let removed = cache.clear()?;
                    println!("Removed {} entries", removed);
                }
            }
        }
        Commands::Traces { limit } => {
            let reader: JsonlReader<RequestTrace> = JsonlReader::new(storage.trace_log_path());
            if !reader.exists() {
                println!("No requests logged yet");
                return Ok(());
            }

            for trace in reader.read_last(limit)? {
                let outcome = match (&trace.status, &trace.error) {
                    (Some(status), _) => status.to_string(),
                    (None, Some(error)) => format!("error: {}", error),
                    (None, None) => "-".to_string(),
                };
                println!(
                    "{}  {} {}  {}  {}ms",
                    trace.ts.format("%Y-%m-%d %H:%M:%S"),
                    trace.method,
                    trace.url,
                    outcome,
                    trace.duration_ms
                );
            }
        }
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let source = CachedSource::new(
                open_source(&config, &storage, None)?,
                open_cache(&config, &storage)?,
            );
            let state = AppState::new(source, config.analytics.clone())
                .with_cors_origin(&config.server.cors_origin);

            let app = build_router(state);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Serving API on http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
