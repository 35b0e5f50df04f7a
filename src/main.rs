use lightbnb::config::Settings;
use lightbnb::services::{FixtureStore, PostgresClient, RentalStore};
use lightbnb::ListingFilter;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    // Initialize logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }

    info!("Starting LightBnB schema tool...");

    // Opening the handle applies pending migrations
    let postgres = PostgresClient::from_settings(&settings.database)
        .await
        .map_err(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            e
        })?;

    info!("Migrations applied");

    match postgres.health_check().await {
        Ok(_) => info!("PostgreSQL is healthy"),
        Err(e) => warn!("PostgreSQL health check failed: {}", e),
    }

    let listings = postgres.get_all_listings(&ListingFilter::new()).await?;
    info!("{} reviewed listings available", listings.len());

    if let Some(path) = &settings.fixtures.path {
        let fixtures = FixtureStore::load(path).await?;
        let fixture_listings = fixtures.get_all_listings(&ListingFilter::new()).await?;
        info!("Fixture set at {} serves {} reviewed listings", path, fixture_listings.len());
    }

    postgres.close().await;
    info!("Shutdown complete");

    Ok(())
}
