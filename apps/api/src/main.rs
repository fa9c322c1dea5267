use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use traq_album_api::app::create_app;
use traq_album_api::config::{load_config, save_default_config, Config};
use traq_album_api::constants::{CONFIG_PATH, DATA_DIR};
use traq_album_api::database::{create_pool, init_database, run_migrations, DbPool};
use traq_album_api::error::AppResult;
use traq_album_api::logging::{init_logging, install_panic_hook};
use traq_album_api::traq::TraqClient;

fn init_directories(config: &Config) -> AppResult<()> {
    std::fs::create_dir_all(&*DATA_DIR)?;
    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn open_database(config: &Config) -> AppResult<DbPool> {
    init_directories(config)?;
    let pool = create_pool(&config.database.path)?;
    let conn = pool.get()?;
    init_database(&conn)?;
    run_migrations(&conn)?;
    Ok(pool)
}

#[tokio::main]
async fn main() {
    if std::env::args().any(|arg| arg == "--init-config") {
        match save_default_config(&CONFIG_PATH) {
            Ok(_) => {
                println!("Default configuration saved to {:?}", *CONFIG_PATH);
                std::process::exit(0);
            }
            Err(e) => {
                eprintln!("Failed to save default configuration: {}", e);
                std::process::exit(1);
            }
        }
    }

    init_logging();
    install_panic_hook();

    let config = Arc::new(load_config(&CONFIG_PATH));

    if !config.oauth_configured() {
        tracing::warn!("traQ OAuth client is not configured; /api/auth/request will fail");
    }

    let pool = match open_database(&config) {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open database {:?}: {}", config.database.path, e);
            std::process::exit(1);
        }
    };

    let traq = match TraqClient::from_config(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let app = create_app(Arc::clone(&config), pool, traq);

    info!("Starting traQ album API on {}", config.server.addr);
    let listener = match TcpListener::bind(&config.server.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", config.server.addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }
}
