//! Signed cloud API client: production implementation of `MachineInventory`.
//!
//! `request` is the signed request layer: it takes an API path (never a full
//! URL), signs the call, and returns the response headers and JSON body. It
//! does not retry and does not interpret status codes beyond success/failure.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, DATE};
use serde::de::DeserializeOwned;

use crate::application::ports::MachineInventory;
use crate::domain::{CloudApiError, Credentials, Machine, TagMap};
use crate::infra::signing::{RequestSigner, http_date};

/// CloudAPI version requested with every call.
pub const API_VERSION: &str = "~7";

/// Machines returned per page by the provider.
pub const PAGE_LIMIT: usize = 1000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Headers and parsed body of a successful response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Lowercase header names.
    pub headers: BTreeMap<String, String>,
    /// `Null` when the response had no body.
    pub body: serde_json::Value,
}

/// Client for one account on one cloud endpoint.
pub struct CloudApiClient {
    http: reqwest::Client,
    base_url: String,
    account: String,
    signer: RequestSigner,
    page_limit: usize,
}

impl CloudApiClient {
    /// Build a client, loading the signing key from `creds.key_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be loaded or the HTTP client
    /// cannot be built.
    pub fn new(creds: &Credentials) -> Result<Self> {
        let signer = RequestSigner::load(creds)?;
        Self::with_signer(&creds.url, &creds.account, signer)
    }

    /// Build a client around an already loaded signer.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_signer(base_url: &str, account: &str, signer: RequestSigner) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("ci-reaper/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            account: account.to_string(),
            signer,
            page_limit: PAGE_LIMIT,
        })
    }

    /// Override the listing page size.
    #[must_use]
    pub fn with_page_limit(mut self, limit: usize) -> Self {
        self.page_limit = limit.max(1);
        self
    }

    /// Send a signed request to `path` and return headers and body.
    ///
    /// # Errors
    ///
    /// - `CloudApiError::InvalidPath` if `path` is not an absolute API path.
    /// - `CloudApiError::Transport` if the request could not be completed.
    /// - `CloudApiError::Api` for any non-2xx status.
    /// - `CloudApiError::InvalidResponse` if the body is not JSON.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<ApiResponse> {
        if !path.starts_with('/') {
            return Err(CloudApiError::InvalidPath(path.to_string()).into());
        }
        let transport = |e: reqwest::Error| CloudApiError::Transport {
            path: path.to_string(),
            message: e.to_string(),
        };

        let date = http_date(Utc::now());
        let authorization = self.signer.authorization(&date)?;
        let mut request = self
            .http
            .request(method.clone(), format!("{}{path}", self.base_url))
            .header(DATE, &date)
            .header(AUTHORIZATION, authorization)
            .header(ACCEPT, "application/json")
            .header("Api-Version", API_VERSION);
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(%method, path, "cloud API request");
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let text = response.text().await.map_err(transport)?;
        tracing::debug!(%method, path, status = status.as_u16(), "cloud API response");

        if !status.is_success() {
            return Err(CloudApiError::Api {
                status: status.as_u16(),
                body: text,
            }
            .into());
        }

        let body = if text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| CloudApiError::InvalidResponse {
                path: path.to_string(),
                message: e.to_string(),
            })?
        };
        Ok(ApiResponse { headers, body })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path, None).await?;
        decode(path, response.body)
    }

    fn machine_path(&self, id: &str) -> String {
        format!("/{}/machines/{id}", self.account)
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: serde_json::Value) -> Result<T> {
    serde_json::from_value(body).map_err(|e| {
        CloudApiError::InvalidResponse {
            path: path.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

impl MachineInventory for CloudApiClient {
    async fn list_machines(&self) -> Result<Vec<Machine>> {
        let mut machines = Vec::new();
        loop {
            let path = format!(
                "/{}/machines?limit={}&offset={}",
                self.account,
                self.page_limit,
                machines.len()
            );
            let page: Vec<Machine> = self.get_json(&path).await?;
            let count = page.len();
            machines.extend(page);
            if count < self.page_limit {
                return Ok(machines);
            }
        }
    }

    async fn get_machine(&self, id: &str) -> Result<Machine> {
        self.get_json(&self.machine_path(id)).await
    }

    async fn list_machine_tags(&self, id: &str) -> Result<TagMap> {
        let path = format!("{}/tags", self.machine_path(id));
        let response = self.request(Method::GET, &path, None).await?;
        if response.body.is_null() {
            return Ok(TagMap::new());
        }
        decode(&path, response.body)
    }

    async fn delete_machine(&self, id: &str) -> Result<()> {
        self.request(Method::DELETE, &self.machine_path(id), None)
            .await
            .map(|_| ())
    }
}
