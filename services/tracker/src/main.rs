use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use common::{
    cache::{RedisConfig, RedisPool},
    database::{self, DatabaseConfig},
};
use tracker::{
    AppState,
    clock::SystemClock,
    config::{AppConfig, Backend},
    logging,
    models::NewUser,
    repositories::{
        InMemoryIntervalRepository, InMemoryUserRepository, PgIntervalRepository,
        PgUserRepository, UserRepository, postgres::MIGRATOR,
    },
    routes,
    session::{InMemorySessionStore, RedisSessionStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("info,tower_http=debug")?;

    info!("Starting flowtime");

    let config = AppConfig::from_env()?;
    let bind_address = config.bind_address.clone();

    let app_state = match config.backend {
        Backend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = database::init_pool(&db_config).await?;

            if database::health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }
            database::run_migrations(&pool, &MIGRATOR).await?;

            let redis_pool = RedisPool::new(&RedisConfig::from_env()?)?;
            if !redis_pool.health_check().await? {
                anyhow::bail!("Failed to connect to Redis");
            }

            AppState::new(
                Arc::new(PgIntervalRepository::new(pool.clone())),
                Arc::new(PgUserRepository::new(pool.clone())),
                Arc::new(RedisSessionStore::new(redis_pool, config.session_ttl())),
                Arc::new(SystemClock),
                config,
            )
            .with_db_pool(pool)
        }
        Backend::Memory => {
            info!("Using in-memory storage; data is lost on shutdown");
            let users = Arc::new(InMemoryUserRepository::new());
            if let (Some(username), Some(password)) =
                (config.seed_username.clone(), config.seed_password.clone())
            {
                users.create(&NewUser { username, password }).await?;
                info!("Seeded account {:?}", config.seed_username);
            }

            AppState::new(
                Arc::new(InMemoryIntervalRepository::new()),
                users,
                Arc::new(InMemorySessionStore::new()),
                Arc::new(SystemClock),
                config,
            )
        }
    };

    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("flowtime listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("flowtime stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
