use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::auth::AppState;
use crate::config::Config;
use crate::database::DbPool;
use crate::logging::request_logger;
use crate::routes::{api_router, auth_router};
use crate::traq::TraqClient;
use crate::VERSION;

#[derive(Serialize)]
struct HealthcheckResponse {
    status: String,
    version: String,
}

async fn healthcheck() -> Json<HealthcheckResponse> {
    Json(HealthcheckResponse {
        status: "healthy".to_string(),
        version: VERSION.to_string(),
    })
}

async fn ping() -> &'static str {
    "pong"
}

pub fn create_app(config: Arc<Config>, pool: DbPool, traq: Arc<TraqClient>) -> Router {
    let state = AppState { config, pool, traq };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/ping", get(ping))
        .merge(api_router());

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/api/auth", auth_router())
        .layer(middleware::from_fn(request_logger))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use crate::test_utils::create_test_app;
    use axum::http::StatusCode;
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_ping_and_healthcheck() {
        let (app, _pool, _fake) = create_test_app();
        let server = TestServer::new(app).unwrap();

        server.get("/api/v1/ping").await.assert_text("pong");

        let response = server.get("/api/v1/healthcheck").await;
        response.assert_status_ok();
        response.assert_json(&serde_json::json!({
            "status": "healthy",
            "version": crate::VERSION,
        }));
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let (app, _pool, _fake) = create_test_app();
        let server = TestServer::new(app).unwrap();

        server
            .get("/api/v1/nothing-here")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
