#![cfg(test)]

use crate::app::create_app;
use crate::config::Config;
use crate::database::{albums, init_database, DbPool};
use crate::models::PostAlbumParams;
use crate::traq::{OutboundRequest, TraqClient, Transport, TransportError, UpstreamResponse};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    Router,
};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// `Cookie` header carrying the token `test-token`.
pub const TOKEN_COOKIE: &str = "traq-auth-token=test-token";

/// Create an in-memory SQLite database pool with full schema applied.
///
/// Every in-memory connection is its own database, so the pool holds exactly one.
/// Release pooled connections before calling into a router that uses the same pool.
pub fn create_test_db() -> DbPool {
    let manager = SqliteConnectionManager::memory().with_init(|conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        Ok(())
    });

    let pool = Pool::builder()
        .max_size(1)
        .build(manager)
        .expect("Failed to create test database pool");

    let conn = pool.get().expect("Failed to get connection from pool");
    init_database(&conn).expect("Failed to initialize test database schema");

    pool
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.oauth.client_id = "client-id".to_string();
    config.oauth.redirect_uri = "http://localhost:8080/api/auth/callback".to_string();
    config
}

type CannedResponse = Result<(StatusCode, Vec<(String, String)>, Vec<u8>), String>;

/// Records outbound requests and answers them from a queue of canned responses.
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<CannedResponse>>,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, status: StatusCode, headers: &[(&str, &str)], body: &[u8]) {
        let headers = headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok((status, headers, body.to_vec())));
    }

    pub fn push_json(&self, status: StatusCode, body: &str) {
        self.push_response(status, &[("content-type", "application/json")], body.as_bytes());
    }

    pub fn push_error(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: OutboundRequest) -> Result<UpstreamResponse, TransportError> {
        self.requests.lock().unwrap().push(request);

        let canned = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("no canned response".to_string()));
        let (status, headers, body) = canned.map_err(TransportError::Unavailable)?;

        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            header_map.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(&value).unwrap(),
            );
        }

        Ok(UpstreamResponse {
            status,
            headers: header_map,
            body: Body::from(body),
        })
    }
}

/// Create a test app with an in-memory database and a fake platform.
pub fn create_test_app() -> (Router, DbPool, Arc<FakeTransport>) {
    create_test_app_with(test_config())
}

pub fn create_test_app_with(config: Config) -> (Router, DbPool, Arc<FakeTransport>) {
    let pool = create_test_db();
    let fake = Arc::new(FakeTransport::new());
    let traq = TraqClient::new(&config, fake.clone()).expect("Failed to build traQ client");
    let app = create_app(Arc::new(config), pool.clone(), Arc::new(traq));
    (app, pool, fake)
}

/// Test fixture: Create an album without images.
pub fn create_test_album(pool: &DbPool, title: &str, creator: &str) -> Uuid {
    let mut conn = pool.get().expect("Failed to get connection");
    let album = albums::post_album(
        &mut conn,
        PostAlbumParams {
            title: title.to_string(),
            description: String::new(),
            creator: creator.to_string(),
            images: Vec::new(),
        },
    )
    .expect("Failed to insert test album");
    album.id
}

pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .expect("Failed to count rows")
}
