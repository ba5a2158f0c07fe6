// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `{ success, data, message }` envelope every API endpoint returns.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::transport::ApiResponse;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Decode a 2xx response and unwrap its `data`.
    pub fn decode(response: &ApiResponse) -> Result<T, ClientError> {
        let envelope: Envelope<T> =
            response.json().map_err(|e| ClientError::Decode(e.to_string()))?;
        if !envelope.success {
            return Err(ClientError::Rejected(
                envelope.message.unwrap_or_else(|| "request was not successful".to_owned()),
            ));
        }
        envelope.data.ok_or_else(|| ClientError::Decode("envelope has no data".to_owned()))
    }
}

/// `data` of a successful `/auth/refresh` or `/auth/login` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub token: String,
    /// Present only when the server rotated the refresh credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}
