//! HTTP client for the listing backend.
//!
//! Wraps the agent, admin, stats, and inquiry endpoints using [`reqwest`].
//! Create and update requests are sent as multipart forms: every scalar is a
//! text part and every new image is a binary part.

use crate::api::error::ApiError;
use crate::api::traits::PropertyApi;
use crate::api::types::{
    ApiScope, MessageResponse, SubmissionPayload, SubmitAck, SubmitTarget, REMOVED_IMAGES_FIELD,
};
use crate::config::ConsoleConfig;
use crate::models::{Inquiry, LoginRequest, LoginResponse, Property, PropertyStats};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Listing backend client
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client from loaded configuration
    pub fn new(config: &ConsoleConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("propconnect/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self::with_client(client, &config.api_url))
    }

    /// Reuse an existing [`reqwest::Client`]
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self
            .request(Method::POST, "/auth/agent/login")
            .json(&body)
            .send()
            .await?;

        let login: LoginResponse = parse_json(response).await?;
        info!("Signed in as {} (agent {})", login.agent.username, login.agent.id);
        Ok(login)
    }

    pub async fn my_properties(&self, agent_id: i64) -> Result<Vec<Property>, ApiError> {
        self.get_json(&format!("/agent/properties/my-properties/{agent_id}"))
            .await
    }

    pub async fn all_properties(&self) -> Result<Vec<Property>, ApiError> {
        self.get_json("/properties").await
    }

    pub async fn property_stats(&self, agent_id: i64) -> Result<PropertyStats, ApiError> {
        self.get_json(&format!("/agent/properties/stats/{agent_id}"))
            .await
    }

    pub async fn inquiries(&self, agent_id: i64) -> Result<Vec<Inquiry>, ApiError> {
        self.get_json(&format!("/inquiries/agent/{agent_id}")).await
    }

    pub async fn inquiry(&self, id: i64) -> Result<Inquiry, ApiError> {
        self.get_json(&format!("/inquiries/{id}")).await
    }

    /// Delete a listing through the admin endpoint
    pub async fn delete_property(&self, id: i64) -> Result<MessageResponse, ApiError> {
        let response = self
            .request(Method::DELETE, &format!("/properties/{id}"))
            .send()
            .await?;
        parse_json(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .request(Method::GET, path)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        parse_json(response).await
    }
}

#[async_trait]
impl PropertyApi for ApiClient {
    async fn get_property(&self, id: i64, scope: ApiScope) -> Result<Property, ApiError> {
        match scope {
            ApiScope::Agent(_) => self.get_json(&format!("/agent/properties/{id}")).await,
            ApiScope::Admin => self.get_json(&format!("/properties/{id}")).await,
        }
    }

    async fn get_properties(&self, scope: ApiScope) -> Result<Vec<Property>, ApiError> {
        match scope {
            ApiScope::Agent(agent_id) => self.my_properties(agent_id).await,
            ApiScope::Admin => self.all_properties().await,
        }
    }

    async fn submit(&self, payload: SubmissionPayload) -> Result<SubmitAck, ApiError> {
        let (method, path) = match payload.target {
            SubmitTarget::Create => (Method::POST, "/agent/properties".to_string()),
            SubmitTarget::Update(id) => (Method::PUT, format!("/agent/properties/{id}")),
            SubmitTarget::AdminUpdate(id) => (Method::PUT, format!("/properties/{id}")),
        };

        info!(
            "Submitting listing: {} fields, {} new images, {} removals",
            payload.fields.len(),
            payload.new_files.len(),
            payload.removed_ids.len()
        );

        let form = build_form(payload)?;
        let response = self.request(method, &path).multipart(form).send().await?;
        parse_json(response).await
    }
}

/// Encode a payload as multipart form data
fn build_form(payload: SubmissionPayload) -> Result<Form, ApiError> {
    let file_field = payload.target.file_field();
    let mut form = Form::new();

    for (key, value) in payload.fields {
        form = form.text(key, value);
    }

    for file in payload.new_files {
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)?;
        form = form.part(file_field, part);
    }

    for id in payload.removed_ids {
        form = form.text(REMOVED_IMAGES_FIELD, id.to_string());
    }

    Ok(form)
}

/// Turn a non-2xx response into an [`ApiError`]; pass success through.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(status, &body);
    warn!("Request failed with status {}: {}", status, message);

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(ApiError::Unauthorized {
            status: status.as_u16(),
            message,
        })
    } else {
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = check_status(response).await?;
    let body = response.text().await?;
    debug!("Received {} bytes", body.len());
    Ok(serde_json::from_str(&body)?)
}

/// Pick the most useful message from an error response body: a JSON
/// `message` or `error` field, then the raw text, then the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()))
}
