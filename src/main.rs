use rgenbot::{logger, CommandRouter, Config, RecordStoreManager};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    if let Err(e) = logger::init_with_config(logger::LoggerConfig::from_env()) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }
    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();
    logger::log_config_info(&config);

    if let Err(e) = config.validate() {
        log::error!("❌ {}", e);
        return ExitCode::FAILURE;
    }

    log::info!("🔄 Connecting {} record store...", config.backend.as_str());
    let store = match RecordStoreManager::new(&config).await {
        Ok(manager) => {
            log::info!("✅ Record store connected successfully");
            manager.storage()
        }
        Err(e) => {
            log::error!("❌ Failed to connect record store: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let router = match CommandRouter::from_config(&config, store) {
        Ok(router) => Arc::new(router),
        Err(e) => {
            log::error!("❌ Failed to build clients: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match rgenbot::discord::run(&config, router).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}
