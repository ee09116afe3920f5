use std::env;
use tracing::{debug, warn};

/// HTTP server settings and the public URL used in email links.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Public site address, e.g. `https://woostaa.in`. No trailing slash.
    pub base_url: String,
    /// Fold the old per-kind service collections into the catalog on startup.
    pub import_legacy_catalog: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);
        let base_url = env::var("BASE_URL").unwrap_or_else(|_| {
            warn!("BASE_URL not set, defaulting to http://localhost:{}", port);
            format!("http://localhost:{}", port)
        });
        let import_legacy_catalog = env::var("CATALOG_IMPORT_LEGACY")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(false);
        debug!("App config: host={}, port={}, base_url={}", host, port, base_url);
        AppConfig {
            host,
            port,
            base_url: base_url.trim_end_matches('/').to_string(),
            import_legacy_catalog,
        }
    }

    pub fn login_url(&self) -> String {
        format!("{}/login?verified=true", self.base_url)
    }

    pub fn verification_url(&self, token: &str) -> String {
        format!("{}/api/auth/verify-email?token={}", self.base_url, token)
    }

    pub fn reset_password_url(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.base_url, token)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            base_url: "http://localhost:8080".to_string(),
            import_legacy_catalog: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_are_built_from_base() {
        let config = AppConfig::default();
        assert_eq!(config.login_url(), "http://localhost:8080/login?verified=true");
        assert_eq!(
            config.verification_url("abc"),
            "http://localhost:8080/api/auth/verify-email?token=abc"
        );
        assert_eq!(
            config.reset_password_url("xyz"),
            "http://localhost:8080/reset-password?token=xyz"
        );
    }
}
