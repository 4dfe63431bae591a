use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use common::database;
use shop::{
    AppState,
    middleware::JwtVerifier,
    repositories::{BuyRepository, ClothRepository, StorageRepository},
    routes,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting shop service");

    // Initialize database connection pool
    let db_config = database::DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool).await?;

    let jwt_verifier = JwtVerifier::from_env()?;

    let cloth_repository = ClothRepository::new(pool.clone());
    let storage_repository = StorageRepository::new(pool.clone());
    let buy_repository = BuyRepository::new(pool.clone());

    let app_state = AppState {
        db_pool: pool,
        cloth_repository,
        storage_repository,
        buy_repository,
        jwt_verifier,
    };

    info!("Shop service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3001").await?;
    info!("Shop service listening on 0.0.0.0:3001");

    axum::serve(listener, app).await?;

    Ok(())
}
