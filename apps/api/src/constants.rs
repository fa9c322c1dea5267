use once_cell::sync::Lazy;
use std::path::PathBuf;

pub static DATA_DIR: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var("APP_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./data"))
});

pub static CONFIG_PATH: Lazy<PathBuf> = Lazy::new(|| DATA_DIR.join("config.yaml"));
pub static DATABASE_PATH: Lazy<PathBuf> = Lazy::new(|| DATA_DIR.join("database.sqlite"));

pub const COOKIE_TOKEN: &str = "traq-auth-token";
pub const COOKIE_STATE: &str = "traq-auth-state";
pub const COOKIE_VERIFIER: &str = "traq-auth-code-verifier";
pub const COOKIE_CALLBACK: &str = "traq-auth-callback";

/// Lifetime of the `state` and `code_verifier` cookies.
pub const PKCE_COOKIE_TTL_SECONDS: i64 = 10 * 60;
pub const CALLBACK_COOKIE_TTL_SECONDS: i64 = 15 * 60;

pub const STATE_LENGTH: usize = 32;
pub const CODE_VERIFIER_LENGTH: usize = 64;

pub const FORWARDED_USER_HEADER: &str = "X-Forwarded-User";

pub const DEFAULT_ALBUM_LIMIT: i64 = 20;
pub const MAX_ALBUM_LIMIT: i64 = 100;

pub const DEFAULT_TRAQ_API_BASE: &str = "https://q.trap.jp/api/v3";
pub const DEFAULT_TRAQ_WEB_BASE: &str = "https://q.trap.jp";
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 10;

/// Response headers copied from the platform when relaying files.
pub const RELAYED_HEADERS: [&str; 5] = [
    "content-type",
    "content-length",
    "cache-control",
    "etag",
    "last-modified",
];
