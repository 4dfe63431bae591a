use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod email;
mod error;
mod jwt;
mod middleware;
mod models;
mod rate_limiter;
mod repositories;
mod routes;
mod session;
mod validation;

use sqlx::PgPool;

use common::cache::RedisPool;
use common::database;

use crate::{
    email::Mailer, jwt::JwtService, rate_limiter::RateLimiter, repositories::UserRepository,
    session::SessionManager,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub redis_pool: RedisPool,
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
    pub session_manager: SessionManager,
    pub rate_limiter: RateLimiter,
    pub mailer: Mailer,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting authentication service");

    // Initialize database connection pool
    let db_config = database::DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool).await?;

    // Initialize JWT service
    let jwt_config = jwt::JwtConfig::from_env()?;
    let jwt_service = JwtService::new(jwt_config);

    // Initialize Redis connection pool
    let redis_config = common::cache::RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;

    // Initialize mailer
    let email_config = email::EmailConfig::from_env()?;
    let mailer = Mailer::new(&email_config)?;

    let user_repository = UserRepository::new(pool.clone());
    let session_manager =
        SessionManager::new(redis_pool.clone(), jwt_service.refresh_token_expiry());
    let rate_limiter = RateLimiter::new(rate_limiter::RateLimiterConfig::default());

    let app_state = AppState {
        db_pool: pool,
        redis_pool,
        jwt_service,
        user_repository,
        session_manager,
        rate_limiter,
        mailer,
    };

    info!("Authentication service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    info!("Authentication service listening on 0.0.0.0:3000");

    axum::serve(listener, app).await?;

    Ok(())
}
