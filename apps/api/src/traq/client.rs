use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::value::RawValue;
use url::Url;
use uuid::Uuid;

use super::links::FileLinkMatcher;
use super::transport::{
    OutboundRequest, ReqwestTransport, Transport, TransportError, UpstreamResponse,
};
use crate::config::{Config, OAuthConfig};
use crate::error::{AppError, AppResult};
use crate::models::{ImageReferences, MessageSearchParams, TokenGrant, TraqMe};

/// Raw result of a message search. Non-2xx bodies are kept for relaying.
#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub status: StatusCode,
    pub body: Bytes,
    pub failure: Option<String>,
}

#[derive(Debug)]
pub enum EarliestMessage {
    /// The hit's JSON exactly as the platform returned it.
    Found(Bytes),
    NotFound,
    Upstream { status: StatusCode, body: Bytes },
}

#[derive(Deserialize)]
struct SearchEnvelope {
    #[serde(rename = "totalHits", default)]
    total_hits: i64,
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct RawHits<'a> {
    #[serde(borrow, default)]
    hits: Vec<&'a RawValue>,
}

/// Client for the platform's REST API, acting with the caller's own token.
pub struct TraqClient {
    transport: Arc<dyn Transport>,
    api_base: String,
    oauth: OAuthConfig,
    links: FileLinkMatcher,
}

impl TraqClient {
    pub fn new(config: &Config, transport: Arc<dyn Transport>) -> AppResult<Self> {
        Ok(Self {
            transport,
            api_base: config.traq.api_base.trim_end_matches('/').to_string(),
            oauth: config.oauth.clone(),
            links: FileLinkMatcher::new(&config.traq.web_base)?,
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.traq.timeout_seconds))?;
        Self::new(config, Arc::new(transport))
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        let raw = format!("{}/{}", self.api_base, path);
        Url::parse(&raw).map_err(|e| AppError::Internal(format!("invalid URL {}: {}", raw, e)))
    }

    async fn get<F>(&self, path: &str, token: &str, on_error: F) -> AppResult<UpstreamResponse>
    where
        F: FnOnce(TransportError) -> AppError,
    {
        let url = self.endpoint(path)?;
        self.transport
            .send(OutboundRequest::get(url, token))
            .await
            .map_err(on_error)
    }

    pub async fn fetch_file(&self, token: &str, file_id: Uuid) -> AppResult<UpstreamResponse> {
        self.get(&format!("files/{}", file_id), token, |e| {
            AppError::Internal(format!("failed to fetch file from traQ: {}", e))
        })
        .await
    }

    pub async fn fetch_file_thumbnail(
        &self,
        token: &str,
        file_id: Uuid,
    ) -> AppResult<UpstreamResponse> {
        self.get(&format!("files/{}/thumbnail", file_id), token, |e| {
            AppError::Internal(format!("failed to fetch thumbnail from traQ: {}", e))
        })
        .await
    }

    pub async fn fetch_user(&self, token: &str, user_id: Uuid) -> AppResult<UpstreamResponse> {
        self.get(&format!("users/{}", user_id), token, |e| {
            AppError::BadGateway(format!("failed to request traQ user: {}", e))
        })
        .await
    }

    /// Any upstream failure counts as an invalid session.
    pub async fn fetch_me(&self, token: &str) -> AppResult<TraqMe> {
        let response = self
            .get("users/me", token, |e| {
                AppError::Authentication(format!("me request failed: {}", e))
            })
            .await?;

        let status = response.status;
        let body = response
            .into_bytes()
            .await
            .map_err(|e| AppError::Authentication(e.to_string()))?;
        if status != StatusCode::OK {
            tracing::warn!(
                "traQ /users/me returned {}: {}",
                status,
                String::from_utf8_lossy(&body)
            );
            return Err(AppError::Authentication("Not authenticated".to_string()));
        }

        serde_json::from_slice(&body)
            .map_err(|e| AppError::Authentication(format!("invalid me response: {}", e)))
    }

    pub async fn search_messages(
        &self,
        token: &str,
        params: &MessageSearchParams,
    ) -> AppResult<SearchResponse> {
        let mut url = self.endpoint("messages")?;
        let pairs = params.to_query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let response = self
            .transport
            .send(OutboundRequest::get(url, token))
            .await
            .map_err(|e| AppError::BadGateway(format!("traQ messages search: {}", e)))?;

        let status = response.status;
        let body = response
            .into_bytes()
            .await
            .map_err(|e| AppError::BadGateway(format!("traQ messages search: {}", e)))?;

        let failure = (!status.is_success()).then(|| {
            format!(
                "traQ messages search failed: status={} body={}",
                status.as_u16(),
                String::from_utf8_lossy(&body)
            )
        });

        Ok(SearchResponse {
            status,
            body,
            failure,
        })
    }

    /// Searches with `hasImage=true` and collects the file ids linked from each hit.
    pub async fn search_image_references(
        &self,
        token: &str,
        mut params: MessageSearchParams,
    ) -> AppResult<ImageReferences> {
        params.has_image = Some(true);

        let response = self.search_messages(token, &params).await?;
        if let Some(failure) = response.failure {
            return Err(AppError::Internal(format!(
                "traQ search failed (status={}): {}",
                response.status.as_u16(),
                failure
            )));
        }

        let envelope: SearchEnvelope = serde_json::from_slice(&response.body)?;
        let hits = envelope
            .hits
            .iter()
            .filter(|hit| !hit.content.is_empty())
            .flat_map(|hit| self.links.extract(&hit.content))
            .collect();

        Ok(ImageReferences {
            total_hits: envelope.total_hits,
            hits,
        })
    }

    /// Oldest message linking to the file, ordered and truncated by the platform.
    pub async fn find_earliest_message(
        &self,
        token: &str,
        file_id: &str,
    ) -> AppResult<EarliestMessage> {
        let params = MessageSearchParams {
            word: Some(self.links.file_url(file_id)),
            limit: Some(1),
            sort: Some("createdAt".to_string()),
            ..Default::default()
        };

        let response = self.search_messages(token, &params).await?;
        if response.failure.is_some() {
            return Ok(EarliestMessage::Upstream {
                status: response.status,
                body: response.body,
            });
        }

        let raw: RawHits<'_> = serde_json::from_slice(&response.body)
            .map_err(|e| AppError::Internal(format!("failed to parse traQ response: {}", e)))?;

        Ok(match raw.hits.first() {
            Some(hit) => EarliestMessage::Found(Bytes::copy_from_slice(hit.get().as_bytes())),
            None => EarliestMessage::NotFound,
        })
    }

    pub fn authorize_url(&self, state: &str, code_challenge: &str) -> AppResult<Url> {
        let mut url = self.endpoint("oauth2/authorize")?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.oauth.client_id)
            .append_pair("redirect_uri", &self.oauth.redirect_uri)
            .append_pair("state", state)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", "S256");
        Ok(url)
    }

    pub async fn exchange_token(&self, code: &str, code_verifier: &str) -> AppResult<TokenGrant> {
        let mut form = vec![
            ("grant_type".to_string(), "authorization_code".to_string()),
            ("client_id".to_string(), self.oauth.client_id.clone()),
        ];
        if !self.oauth.client_secret.is_empty() {
            form.push(("client_secret".to_string(), self.oauth.client_secret.clone()));
        }
        form.push(("code".to_string(), code.to_string()));
        form.push(("code_verifier".to_string(), code_verifier.to_string()));
        if !self.oauth.redirect_uri.is_empty() {
            form.push(("redirect_uri".to_string(), self.oauth.redirect_uri.clone()));
        }

        let url = self.endpoint("oauth2/token")?;
        let response = self
            .transport
            .send(OutboundRequest::post_form(url, form))
            .await
            .map_err(|e| AppError::BadGateway(format!("token exchange failed: {}", e)))?;

        let status = response.status;
        let body = response
            .into_bytes()
            .await
            .map_err(|e| AppError::BadGateway(format!("token exchange failed: {}", e)))?;
        if !status.is_success() {
            return Err(AppError::BadGateway(format!(
                "token endpoint error ({}): {}",
                status,
                String::from_utf8_lossy(&body)
            )));
        }

        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadGateway(format!("invalid token response: {}", e)))
    }
}
