use sqlx::PgPool;
use std::sync::Arc;

use klub_timetable::config::{Config, StoreBackend};
use klub_timetable::crypto::{generate_random_passcode, hash_passcode};
use klub_timetable::routes::{build_router, is_valid_account, AppData, AppState};
use klub_timetable::service::TimetableService;
use klub_timetable::store::{MemoryStore, PgStore, Store, UserStore};

async fn open_store(config: &Config) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
    match config.store {
        StoreBackend::Postgres => {
            let db = PgPool::connect(&config.database_url).await?;
            let store = PgStore::new(db);
            store.migrate().await?;
            log::info!("Connected to PostgreSQL, migrations applied");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            log::warn!("Using in-memory store; events are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

// Users are created out-of-band; make sure the configured club account exists
async fn seed_account(store: &Arc<dyn Store>, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if !is_valid_account(&config.seed_account) {
        return Err(format!("SEED_ACCOUNT '{}' is not a valid account name", config.seed_account).into());
    }

    let passcode = match &config.seed_passcode {
        Some(passcode) => passcode.clone(),
        None => {
            let generated = generate_random_passcode();
            tokio::fs::write(
                "seed_credentials.txt",
                format!("Account: {}\nPasscode: {}", config.seed_account, generated),
            )
            .await?;
            log::info!("Seed credentials written to seed_credentials.txt");
            generated
        }
    };

    let hash = hash_passcode(&passcode).await?;
    let user = store.upsert_user(&config.seed_account, &hash).await?;
    log::info!("Seed account '{}' ready ({})", user.username, user.id);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    config.log_configuration();

    let store = open_store(&config).await?;
    seed_account(&store, &config).await?;

    let app_state = AppState::new(AppData {
        service: TimetableService::new(store, config.enforce_time_order),
        sessions: Default::default(),
    });

    let app = build_router(app_state, &config.cors_origins, config.body_limit_bytes);

    log::info!("Timetable server starting on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
