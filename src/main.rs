use dotenv::dotenv;
use tracing::{error, info, warn};

use woostaa_backend::app::app::App;
use woostaa_backend::util::logger::Logger;

#[tokio::main]
async fn main() {
    // Load environment variables before the logger reads RUST_LOG
    let env_loaded = dotenv();

    let _logger = match Logger::new() {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    info!("🚀 Starting Woostaa Backend Application");
    match env_loaded {
        Ok(_) => info!("✅ Successfully loaded .env file"),
        Err(e) => warn!("⚠️ Failed to load .env file: {} (using system env vars)", e),
    }

    let app = match App::new().await {
        Ok(app) => app,
        Err(e) => {
            error!("❌ Failed to start application: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = app.start().await {
        error!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}
