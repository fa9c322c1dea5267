use axum_extra::extract::cookie::{Cookie, SameSite};
use cookie::time::{Duration as CookieDuration, OffsetDateTime};

use crate::config::CookieConfig;

/// Every auth cookie is http-only, same-site lax and scoped to `/`.
/// Without a max age the cookie lasts for the browser session.
pub fn build_cookie(
    config: &CookieConfig,
    name: &'static str,
    value: String,
    max_age_seconds: Option<i64>,
) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .build();
    if let Some(seconds) = max_age_seconds {
        cookie.set_max_age(CookieDuration::seconds(seconds));
    }
    cookie
}

/// Expires a cookie on the client whether or not the request carried it.
pub fn expired_cookie(config: &CookieConfig, name: &'static str) -> Cookie<'static> {
    let mut cookie = build_cookie(config, name, String::new(), Some(0));
    cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
    cookie
}
