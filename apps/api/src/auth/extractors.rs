use crate::config::Config;
use crate::constants::{COOKIE_TOKEN, FORWARDED_USER_HEADER};
use crate::database::DbPool;
use crate::error::AppError;
use crate::traq::TraqClient;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pool: DbPool,
    pub traq: Arc<TraqClient>,
}

/// The caller's platform access token, read from the auth cookie.
#[derive(Clone, Debug)]
pub struct TraqToken(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for TraqToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        jar.get(COOKIE_TOKEN)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
            .map(TraqToken)
            .ok_or_else(|| AppError::Authentication("authentication required".to_string()))
    }
}

/// Username set by the authenticating reverse proxy.
#[derive(Clone, Debug)]
pub struct ForwardedUser(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for ForwardedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(FORWARDED_USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| ForwardedUser(name.to_string()))
            .ok_or_else(|| AppError::Authentication("Unauthorized".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn request_parts(header: Option<(&str, &str)>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_token_from_cookie() {
        let mut parts = request_parts(Some(("cookie", "other=1; traq-auth-token=abc")));
        let token = TraqToken::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(token.0, "abc");
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let mut parts = request_parts(None);
        let err = TraqToken::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));

        let mut parts = request_parts(Some(("cookie", "traq-auth-token=")));
        assert!(TraqToken::from_request_parts(&mut parts, &()).await.is_err());
    }

    #[tokio::test]
    async fn test_forwarded_user() {
        let mut parts = request_parts(Some(("X-Forwarded-User", "alice")));
        let user = ForwardedUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.0, "alice");

        let mut parts = request_parts(None);
        assert!(ForwardedUser::from_request_parts(&mut parts, &()).await.is_err());
    }
}
