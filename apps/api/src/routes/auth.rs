use axum::{
    extract::{Query, State},
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::{CookieJar, WithRejection};

use crate::auth::cookies::{build_cookie, expired_cookie};
use crate::auth::pkce::{code_challenge, random_string};
use crate::auth::{AppState, TraqToken};
use crate::constants::{
    CALLBACK_COOKIE_TTL_SECONDS, CODE_VERIFIER_LENGTH, COOKIE_CALLBACK, COOKIE_STATE,
    COOKIE_TOKEN, COOKIE_VERIFIER, PKCE_COOKIE_TTL_SECONDS, STATE_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::models::{AuthCallbackQuery, AuthRequestQuery, TraqMe};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/request", get(request_authorization))
        .route("/callback", get(handle_callback))
        .route("/me", get(me))
        .route("/logout", post(logout))
}

/// 302 Found, as expected by the OAuth endpoints and the frontend.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

fn cookie_value(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

async fn request_authorization(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Query(query), _): WithRejection<Query<AuthRequestQuery>, AppError>,
) -> AppResult<(CookieJar, Response)> {
    if !state.config.oauth_configured() {
        return Err(AppError::Internal("OAuth not configured".to_string()));
    }

    let oauth_state = random_string(STATE_LENGTH)?;
    let verifier = random_string(CODE_VERIFIER_LENGTH)?;
    let challenge = code_challenge(&verifier);

    let cookies = &state.config.cookies;
    let mut jar = jar
        .add(build_cookie(
            cookies,
            COOKIE_STATE,
            oauth_state.clone(),
            Some(PKCE_COOKIE_TTL_SECONDS),
        ))
        .add(build_cookie(
            cookies,
            COOKIE_VERIFIER,
            verifier,
            Some(PKCE_COOKIE_TTL_SECONDS),
        ));

    if let Some(callback) = query.callback.filter(|cb| cb.starts_with('/')) {
        jar = jar.add(build_cookie(
            cookies,
            COOKIE_CALLBACK,
            callback,
            Some(CALLBACK_COOKIE_TTL_SECONDS),
        ));
    }

    let url = state.traq.authorize_url(&oauth_state, &challenge)?;
    Ok((jar, found(url.as_str())))
}

async fn handle_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Query(query), _): WithRejection<Query<AuthCallbackQuery>, AppError>,
) -> AppResult<(CookieJar, Response)> {
    let (code, returned_state) = match (query.code, query.state) {
        (Some(code), Some(st)) if !code.is_empty() && !st.is_empty() => (code, st),
        _ => return Err(AppError::BadRequest("missing code/state".to_string())),
    };

    if cookie_value(&jar, COOKIE_STATE).as_deref() != Some(returned_state.as_str()) {
        return Err(AppError::BadRequest("state mismatch".to_string()));
    }
    let verifier = cookie_value(&jar, COOKIE_VERIFIER)
        .ok_or_else(|| AppError::BadRequest("verifier missing".to_string()))?;

    let grant = state.traq.exchange_token(&code, &verifier).await?;

    let callback = cookie_value(&jar, COOKIE_CALLBACK)
        .filter(|cb| cb.starts_with('/'))
        .unwrap_or_else(|| "/".to_string());

    let cookies = &state.config.cookies;
    let max_age = (grant.expires_in > 0).then_some(grant.expires_in);
    let jar = jar
        .add(build_cookie(cookies, COOKIE_TOKEN, grant.access_token, max_age))
        .add(expired_cookie(cookies, COOKIE_STATE))
        .add(expired_cookie(cookies, COOKIE_VERIFIER))
        .add(expired_cookie(cookies, COOKIE_CALLBACK));

    let frontend = state.config.server.frontend_base_url.trim_end_matches('/');
    let target = format!("{}{}", frontend, callback);
    tracing::info!("OAuth callback completed, redirecting to {}", target);

    Ok((jar, found(&target)))
}

async fn me(State(state): State<AppState>, TraqToken(token): TraqToken) -> AppResult<Json<TraqMe>> {
    Ok(Json(state.traq.fetch_me(&token).await?))
}

async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.add(expired_cookie(&state.config.cookies, COOKIE_TOKEN));
    (jar, StatusCode::NO_CONTENT)
}
