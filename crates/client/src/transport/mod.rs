// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response types and the network boundary.

pub mod http;

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use serde::de::DeserializeOwned;
use uuid::Uuid;

pub use http::HttpTransport;

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const FORGOT_PASSWORD_PATH: &str = "/auth/forgot-password";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Path fragments that may be called without an access credential.
pub const PUBLIC_PATHS: &[&str] = &[LOGIN_PATH, REGISTER_PATH, FORGOT_PASSWORD_PATH, LOGOUT_PATH];

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|p| path.contains(p))
}

/// An outbound call as issued by a caller, before interception.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub id: Uuid,
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    retryable: bool,
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            retryable: true,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Drop the retry context: a 401 on this call is final.
    pub fn without_retry(mut self) -> Self {
        self.retryable = false;
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// True once this call has been replayed after a refresh.
    pub fn retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }

    pub fn is_public(&self) -> bool {
        is_public_path(&self.path)
    }

    pub fn is_logout(&self) -> bool {
        self.path.contains(LOGOUT_PATH)
    }

    pub fn is_refresh(&self) -> bool {
        self.path.contains(REFRESH_PATH)
    }
}

/// A call cleared for transmission, with its bearer credential attached.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub id: Uuid,
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub bearer: Option<String>,
}

impl PreparedRequest {
    pub fn new(request: &ApiRequest, bearer: Option<String>) -> Self {
        Self {
            id: request.id,
            method: request.method.clone(),
            path: request.path.clone(),
            query: request.query.clone(),
            body: request.body.clone(),
            bearer,
        }
    }
}

/// A response with any HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn json_body(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Connectivity failure: no HTTP status was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError(pub String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for TransportError {}

/// The remote service boundary.
///
/// Any HTTP status is an `Ok` response; only connectivity failures are `Err`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &PreparedRequest) -> Result<ApiResponse, TransportError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
