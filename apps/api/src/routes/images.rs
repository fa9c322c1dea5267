use axum::{
    extract::{Path, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::{Query, WithRejection};

use crate::auth::{AppState, TraqToken};
use crate::error::{AppError, AppResult};
use crate::models::{ImageReferences, MessageSearchParams, MessageSearchQuery};
use crate::traq::EarliestMessage;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/images", get(search_images))
        .route("/images/:id", get(get_earliest_message))
}

async fn search_images(
    State(state): State<AppState>,
    TraqToken(token): TraqToken,
    WithRejection(Query(query), _): WithRejection<Query<MessageSearchQuery>, AppError>,
) -> AppResult<Json<ImageReferences>> {
    let params = MessageSearchParams::from(query);
    let refs = state.traq.search_image_references(&token, params).await?;
    Ok(Json(refs))
}

async fn get_earliest_message(
    State(state): State<AppState>,
    TraqToken(token): TraqToken,
    Path(file_id): Path<String>,
) -> AppResult<Response> {
    let json = [(CONTENT_TYPE, "application/json")];

    match state.traq.find_earliest_message(&token, &file_id).await? {
        EarliestMessage::Found(hit) => Ok((StatusCode::OK, json, hit).into_response()),
        EarliestMessage::NotFound => Err(AppError::NotFound(
            "no message found for the given image id".to_string(),
        )),
        EarliestMessage::Upstream { status, body } => Ok((status, json, body).into_response()),
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_test_app, TOKEN_COOKIE};
    use axum::http::{header, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    const FILE: &str = "550e8400-e29b-41d4-a716-446655440000";

    #[tokio::test]
    async fn test_search_images() {
        let (app, _pool, fake) = create_test_app();
        fake.push_json(
            StatusCode::OK,
            &format!(
                r#"{{"totalHits":1,"hits":[{{"content":"look https://q.trap.jp/files/{}"}}]}}"#,
                FILE
            ),
        );
        let server = TestServer::new(app).unwrap();

        let response = server
            .get("/api/v1/images?word=cat&hasImage=false")
            .add_header(header::COOKIE, HeaderValue::from_static(TOKEN_COOKIE))
            .await;
        response.assert_status_ok();
        response.assert_json(&json!({ "totalHits": 1, "hits": [FILE] }));

        let query = fake.requests()[0].url.query().unwrap().to_string();
        assert_eq!(query, "word=cat&hasImage=true");
    }

    #[tokio::test]
    async fn test_search_images_requires_token() {
        let (app, _pool, _fake) = create_test_app();
        let server = TestServer::new(app).unwrap();

        server
            .get("/api/v1/images")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_earliest_message() {
        let (app, _pool, fake) = create_test_app();
        fake.push_json(
            StatusCode::OK,
            r#"{"totalHits":3,"hits":[{"id":"m1","content":"first"}]}"#,
        );
        fake.push_json(StatusCode::OK, r#"{"totalHits":0,"hits":[]}"#);
        fake.push_json(StatusCode::UNAUTHORIZED, r#"{"message":"expired"}"#);
        let server = TestServer::new(app).unwrap();
        let path = format!("/api/v1/images/{}", FILE);

        let response = server
            .get(&path)
            .add_header(header::COOKIE, HeaderValue::from_static(TOKEN_COOKIE))
            .await;
        response.assert_status_ok();
        let hit: Value = response.json();
        assert_eq!(hit["id"], "m1");

        server
            .get(&path)
            .add_header(header::COOKIE, HeaderValue::from_static(TOKEN_COOKIE))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let response = server
            .get(&path)
            .add_header(header::COOKIE, HeaderValue::from_static(TOKEN_COOKIE))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_text(r#"{"message":"expired"}"#);
    }
}
