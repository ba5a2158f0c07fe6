// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! reqwest-backed transport for the ticketing API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::transport::{ApiResponse, PreparedRequest, Transport, TransportError};

/// HTTP transport bound to one API base URL.
pub struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder().timeout(timeout).build().unwrap_or_default();
        Self { base_url: base_url.into(), client }
    }

    fn url(&self, request: &PreparedRequest) -> Result<Url, TransportError> {
        let raw = format!("{}{}", self.base_url.trim_end_matches('/'), request.path);
        let mut url = Url::parse(&raw).map_err(|e| TransportError(format!("{raw}: {e}")))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &PreparedRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url(request)?;
        let mut req = self.client.request(request.method.clone(), url);
        if let Some(ref body) = request.body {
            req = req.json(body);
        }
        if let Some(ref token) = request.bearer {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await.map_err(|e| TransportError(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await.map_err(|e| TransportError(e.to_string()))?;
        tracing::debug!(id = %request.id, method = %request.method, path = %request.path, status, "response");
        Ok(ApiResponse { status, body })
    }
}
