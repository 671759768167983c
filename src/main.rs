use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use hill_guide::client_store::{Analytics, FileStore, LocalStore, OfflineCache};
use hill_guide::config::Config;
use hill_guide::search::{ListingQuery, SortOrder};
use hill_guide::seed::{self, SeedFile};
use hill_guide::state::AppState;
use hill_guide::storage::{CatalogStore, InMemoryCatalog, SqliteCatalog};
use hill_guide::{logging, metrics, server};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "hill_guide")]
#[command(about = "Tourist information service for a hill-station destination")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
        /// Serve an in-memory catalog filled with the built-in seed data
        #[arg(long)]
        memory: bool,
    },
    /// Create the schema and insert seed data
    Seed {
        /// JSON seed file; the built-in catalog is used when omitted
        #[arg(long)]
        file: Option<PathBuf>,
        /// Delete existing listings and categories first
        #[arg(long)]
        reset: bool,
    },
    /// Query listings from the command line
    Listings {
        /// Category slug
        #[arg(long)]
        category: Option<String>,
        /// Substring to match against name or description
        #[arg(long)]
        q: Option<String>,
        /// Sort by name (ascending)
        #[arg(long, conflicts_with = "name_desc")]
        name: bool,
        /// Sort by name (descending)
        #[arg(long)]
        name_desc: bool,
        /// Read from the offline snapshot instead of the database
        #[arg(long)]
        offline: bool,
    },
    /// Inspect or append to the client analytics log
    Analytics {
        #[command(subcommand)]
        action: AnalyticsAction,
    },
    /// Manage the offline listings snapshot
    Offline {
        #[command(subcommand)]
        action: OfflineAction,
    },
}

#[derive(Subcommand)]
enum AnalyticsAction {
    /// Append an event
    Track {
        event: String,
        /// Event payload as JSON
        #[arg(long)]
        data: Option<String>,
    },
    /// Print stored events and counts
    Show,
    /// Delete the log
    Clear,
}

#[derive(Subcommand)]
enum OfflineAction {
    /// Snapshot every listing from the database
    Save,
    /// Print the stored snapshot
    Show,
}

fn open_catalog(config: &Config) -> anyhow::Result<Arc<dyn CatalogStore>> {
    let catalog = SqliteCatalog::open(&config.database.path)
        .with_context(|| format!("opening {}", config.database.path.display()))?;
    Ok(Arc::new(catalog))
}

fn open_client_store(config: &Config) -> anyhow::Result<Arc<dyn LocalStore>> {
    Ok(Arc::new(FileStore::open(&config.client_store.dir)?))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = logging::init_logging();

    let cli = Cli::parse();
    let mut config = Config::load()?;

    match cli.command {
        Commands::Serve { port, memory } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(metrics_port) = config.metrics.port {
                metrics::init_metrics(metrics_port);
            }

            let catalog: Arc<dyn CatalogStore> = if memory {
                let catalog: Arc<dyn CatalogStore> = Arc::new(InMemoryCatalog::new());
                seed::apply(catalog.as_ref(), &seed::default_seed()).await?;
                catalog
            } else {
                open_catalog(&config)?
            };

            let state = AppState::new(config, catalog)?;
            server::start_server(state).await?;
        }
        Commands::Seed { file, reset } => {
            let catalog = open_catalog(&config)?;
            if reset {
                warn!("Resetting catalog before seeding");
                catalog.clear().await?;
            }

            let seed_data = match file {
                Some(path) => SeedFile::load(&path)
                    .with_context(|| format!("reading seed file {}", path.display()))?,
                None => seed::default_seed(),
            };
            let summary = seed::apply(catalog.as_ref(), &seed_data).await?;
            println!(
                "Seeded {} categories and {} listings",
                summary.categories, summary.listings
            );
        }
        Commands::Listings {
            category,
            q,
            name,
            name_desc,
            offline,
        } => {
            let sort = if name {
                SortOrder::Name
            } else if name_desc {
                SortOrder::NameDesc
            } else {
                SortOrder::Default
            };
            let query = ListingQuery::new(category.as_deref(), q.as_deref()).sorted(sort);

            let cache = OfflineCache::new(open_client_store(&config)?);
            cache.set_online(!offline);
            let listings = match cache.offline_listings(&query)? {
                Some(listings) => listings,
                None if !cache.is_online() => {
                    bail!("no offline snapshot saved; run `hill_guide offline save`")
                }
                None => open_catalog(&config)?.find_listings(&query).await?,
            };
            info!(online = cache.is_online(), count = listings.len(), "Listings read");
            print_json(&listings)?;
        }
        Commands::Analytics { action } => {
            let analytics = Analytics::new(open_client_store(&config)?);
            match action {
                AnalyticsAction::Track { event, data } => {
                    let data = match data {
                        Some(raw) => serde_json::from_str(&raw).context("--data must be JSON")?,
                        None => serde_json::Value::Null,
                    };
                    print_json(&analytics.track(&event, data)?)?;
                }
                AnalyticsAction::Show => {
                    print_json(&analytics.events()?)?;
                    print_json(&analytics.summary()?)?;
                }
                AnalyticsAction::Clear => {
                    analytics.clear()?;
                    println!("Analytics log cleared");
                }
            }
        }
        Commands::Offline { action } => {
            let cache = OfflineCache::new(open_client_store(&config)?);
            match action {
                OfflineAction::Save => {
                    let listings = open_catalog(&config)?
                        .find_listings(&ListingQuery::default())
                        .await?;
                    let snapshot = cache.save(listings)?;
                    println!(
                        "Saved {} listings for offline use at {}",
                        snapshot.listings.len(),
                        snapshot.saved_at
                    );
                }
                OfflineAction::Show => match cache.load()? {
                    Some(snapshot) => print_json(&snapshot)?,
                    None => println!("No offline snapshot saved"),
                },
            }
        }
    }

    Ok(())
}
