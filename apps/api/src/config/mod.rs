mod env;

pub use env::{parse_flag, EnvSource, ProcessEnv};

use crate::constants::{
    DATABASE_PATH, DEFAULT_HTTP_TIMEOUT_SECONDS, DEFAULT_TRAQ_API_BASE, DEFAULT_TRAQ_WEB_BASE,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    /// Public base URL of this server, e.g. `https://albums.example.com`.
    #[serde(default)]
    pub base_url: String,
    /// Where the callback redirect lands when the frontend is served elsewhere.
    #[serde(default)]
    pub frontend_base_url: String,
}

fn default_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            base_url: String::new(),
            frontend_base_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

fn default_database_path() -> PathBuf {
    DATABASE_PATH.clone()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraqConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_web_base")]
    pub web_base: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_api_base() -> String {
    DEFAULT_TRAQ_API_BASE.to_string()
}

fn default_web_base() -> String {
    DEFAULT_TRAQ_WEB_BASE.to_string()
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECONDS
}

impl Default for TraqConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            web_base: default_web_base(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OAuthConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// e.g. `http://localhost:8080/api/auth/callback`
    #[serde(default)]
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CookieConfig {
    #[serde(default)]
    pub secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub traq: TraqConfig,
    #[serde(default)]
    pub oauth: OAuthConfig,
    #[serde(default)]
    pub cookies: CookieConfig,
}

impl Config {
    /// Overrides file values with environment variables.
    pub fn apply_env(&mut self, env: &impl EnvSource) {
        if let Some(addr) = env.get("APP_ADDR") {
            self.server.addr = normalize_addr(&addr);
        } else if let Some(port) = env.get("PORT") {
            self.server.addr = format!("0.0.0.0:{}", port);
        }

        if let Some(path) = env.get_any(&["APP_DATABASE_PATH", "DB_PATH"]) {
            self.database.path = PathBuf::from(path);
        }

        if let Some(v) = env.get("TRAQ_OAUTH_CLIENT_ID") {
            self.oauth.client_id = v;
        }
        if let Some(v) = env.get("TRAQ_OAUTH_CLIENT_SECRET") {
            self.oauth.client_secret = v;
        }
        if let Some(v) = env.get("TRAQ_OAUTH_REDIRECT_URI") {
            self.oauth.redirect_uri = v;
        }

        if let Some(v) = env.get("TRAQ_API_BASE") {
            self.traq.api_base = v;
        }
        if let Some(v) = env.get("TRAQ_WEB_BASE") {
            self.traq.web_base = v;
        }
        if let Some(secs) = env
            .get("TRAQ_HTTP_TIMEOUT_SECONDS")
            .and_then(|v| v.trim().parse().ok())
        {
            self.traq.timeout_seconds = secs;
        }

        if let Some(v) = env.get("SERVER_BASE_URL") {
            self.server.base_url = v;
        }
        if let Some(v) = env.get("FRONTEND_BASE_URL") {
            self.server.frontend_base_url = v;
        }

        match env.get("COOKIE_SECURE").as_deref().and_then(parse_flag) {
            Some(secure) => self.cookies.secure = secure,
            None => {
                if self.server.base_url.to_ascii_lowercase().starts_with("https://") {
                    self.cookies.secure = true;
                }
            }
        }
    }

    pub fn oauth_configured(&self) -> bool {
        !self.oauth.client_id.is_empty() && !self.oauth.redirect_uri.is_empty()
    }
}

/// `:8080` binds on every interface.
fn normalize_addr(addr: &str) -> String {
    match addr.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{}", port),
        None => addr.to_string(),
    }
}

pub fn load_config(config_path: &Path) -> Config {
    let mut config = if config_path.exists() {
        match fs::read_to_string(config_path) {
            Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
            Err(_) => Config::default(),
        }
    } else {
        Config::default()
    };

    config.apply_env(&ProcessEnv);
    config
}

pub fn save_default_config(config_path: &Path) -> std::io::Result<()> {
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let config = Config::default();
    let yaml = serde_yaml::to_string(&config).map_err(|e| std::io::Error::other(e.to_string()))?;
    fs::write(config_path, yaml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn resolve(pairs: &[(&str, &str)]) -> Config {
        let mut config = Config::default();
        config.apply_env(&env(pairs));
        config
    }

    #[test]
    fn test_addr_prefers_app_addr_over_port() {
        assert_eq!(resolve(&[]).server.addr, "0.0.0.0:8080");
        assert_eq!(resolve(&[("PORT", "3000")]).server.addr, "0.0.0.0:3000");
        assert_eq!(
            resolve(&[("APP_ADDR", ":9000"), ("PORT", "3000")]).server.addr,
            "0.0.0.0:9000"
        );
        assert_eq!(
            resolve(&[("APP_ADDR", "127.0.0.1:1234")]).server.addr,
            "127.0.0.1:1234"
        );
    }

    #[test]
    fn test_database_path_fallback_chain() {
        assert_eq!(
            resolve(&[("DB_PATH", "/tmp/b.sqlite")]).database.path,
            PathBuf::from("/tmp/b.sqlite")
        );
        assert_eq!(
            resolve(&[("APP_DATABASE_PATH", "/tmp/a.sqlite"), ("DB_PATH", "/tmp/b.sqlite")])
                .database
                .path,
            PathBuf::from("/tmp/a.sqlite")
        );
    }

    #[test]
    fn test_empty_value_counts_as_unset() {
        let config = resolve(&[("APP_DATABASE_PATH", ""), ("DB_PATH", "/tmp/b.sqlite")]);
        assert_eq!(config.database.path, PathBuf::from("/tmp/b.sqlite"));
    }

    #[test]
    fn test_cookie_secure_explicit_flag_wins() {
        assert!(resolve(&[("COOKIE_SECURE", " YES ")]).cookies.secure);
        assert!(
            !resolve(&[("COOKIE_SECURE", "off"), ("SERVER_BASE_URL", "https://x.example")])
                .cookies
                .secure
        );
    }

    #[test]
    fn test_cookie_secure_inferred_from_base_url() {
        assert!(resolve(&[("SERVER_BASE_URL", "HTTPS://x.example")]).cookies.secure);
        assert!(!resolve(&[("SERVER_BASE_URL", "http://localhost:8080")]).cookies.secure);
        assert!(
            resolve(&[("COOKIE_SECURE", "maybe"), ("SERVER_BASE_URL", "https://x.example")])
                .cookies
                .secure
        );
        assert!(!resolve(&[]).cookies.secure);
    }

    #[test]
    fn test_oauth_configured_requires_client_and_redirect() {
        assert!(!resolve(&[("TRAQ_OAUTH_CLIENT_ID", "abc")]).oauth_configured());
        assert!(resolve(&[
            ("TRAQ_OAUTH_CLIENT_ID", "abc"),
            ("TRAQ_OAUTH_REDIRECT_URI", "http://localhost/api/auth/callback"),
        ])
        .oauth_configured());
    }

    #[test]
    fn test_yaml_round_trip_of_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        save_default_config(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: Config = serde_yaml::from_str(&content).unwrap();
        assert_eq!(parsed.traq.api_base, DEFAULT_TRAQ_API_BASE);
        assert_eq!(parsed.traq.timeout_seconds, DEFAULT_HTTP_TIMEOUT_SECONDS);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let parsed: Config = serde_yaml::from_str("oauth:\n  client_id: abc\n").unwrap();
        assert_eq!(parsed.oauth.client_id, "abc");
        assert_eq!(parsed.server.addr, "0.0.0.0:8080");
        assert_eq!(parsed.traq.web_base, DEFAULT_TRAQ_WEB_BASE);
    }
}
