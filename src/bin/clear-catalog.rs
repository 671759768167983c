use hill_guide::config::Config;
use hill_guide::storage::{CatalogStore, SqliteCatalog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::load()?;

    println!(
        "⚠️  WARNING: This will delete ALL listings and categories from {}!",
        config.database.path.display()
    );
    println!("Press Enter to continue or Ctrl+C to cancel...");
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    println!("🗑️  Clearing catalog...");
    let catalog = SqliteCatalog::open(&config.database.path)?;
    catalog.clear().await?;

    println!("✅ Catalog cleared successfully!");
    Ok(())
}
