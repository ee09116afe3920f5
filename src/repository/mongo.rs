use mongodb::{options::{ClientOptions, Credential, ResolverConfig}, Client, Database};
use tracing::{error, info};

use crate::config::mongo_conf::MongoConfig;

/// Opens one client for the whole process; repositories share its pool.
pub async fn connect(config: &MongoConfig) -> Result<Database, mongodb::error::Error> {
    info!(database = %config.database, "Connecting to MongoDB");
    let mut client_options = ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare())
        .await
        .map_err(|e| {
            error!("Failed to parse MongoDB URI: {}", e);
            e
        })?;
    client_options.app_name = Some("WoostaaBackend".to_string());
    client_options.max_pool_size = Some(config.pool_size);
    client_options.connect_timeout = Some(std::time::Duration::from_secs(config.connection_timeout_secs));
    if let (Some(ref username), Some(ref password)) = (&config.username, &config.password) {
        client_options.credential = Some(Credential::builder()
            .username(username.clone())
            .password(password.clone())
            .build());
    }
    let client = Client::with_options(client_options)?;
    Ok(client.database(&config.database))
}

/// Skip/limit pair for 1-based page numbers. The skip saturates at `i64::MAX`,
/// the largest value the server accepts.
pub fn page_window(page: u64, limit: u64) -> (u64, i64) {
    let page = page.max(1);
    let limit = limit.clamp(1, 100);
    let skip = (page - 1).saturating_mul(limit).min(i64::MAX as u64);
    (skip, limit as i64)
}

/// Case-insensitive "contains" filter for user supplied search text.
pub fn contains_regex(search: &str) -> bson::Regex {
    bson::Regex {
        pattern: escape_regex(search.trim()),
        options: "i".to_string(),
    }
}

fn escape_regex(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if "\\^$.|?*+()[]{}".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
