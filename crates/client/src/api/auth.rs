// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Public authentication endpoints.
//!
//! These calls carry no retry context: a 401 from a wrong password must not
//! start a credential refresh.

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::envelope::{Envelope, TokenPair};
use crate::error::ClientError;
use crate::transport::{ApiRequest, FORGOT_PASSWORD_PATH, LOGIN_PATH, REGISTER_PATH};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Exchange username/password for a credential pair and start a session.
pub async fn authenticate(
    client: &ApiClient,
    username: &str,
    password: &str,
) -> Result<(), ClientError> {
    let request = ApiRequest::post(LOGIN_PATH)
        .with_json(serde_json::json!({ "username": username, "password": password }))
        .without_retry();
    let response = client.send(request).await?;
    let pair: TokenPair = Envelope::decode(&response)?;
    let refresh = pair
        .refresh_token
        .ok_or_else(|| ClientError::Decode("login response has no refresh_token".to_owned()))?;
    client.login(&pair.token, &refresh).await
}

pub async fn register(
    client: &ApiClient,
    account: &NewAccount,
) -> Result<serde_json::Value, ClientError> {
    let body = serde_json::to_value(account).map_err(|e| ClientError::Decode(e.to_string()))?;
    let response = client.send(ApiRequest::post(REGISTER_PATH).with_json(body).without_retry()).await?;
    Envelope::decode(&response)
}

pub async fn forgot_password(client: &ApiClient, email: &str) -> Result<(), ClientError> {
    let request = ApiRequest::post(FORGOT_PASSWORD_PATH)
        .with_json(serde_json::json!({ "email": email }))
        .without_retry();
    let response = client.send(request).await?;
    let envelope: Envelope<serde_json::Value> =
        response.json().map_err(|e| ClientError::Decode(e.to_string()))?;
    if !envelope.success {
        return Err(ClientError::Rejected(
            envelope.message.unwrap_or_else(|| "password reset was not accepted".to_owned()),
        ));
    }
    Ok(())
}
