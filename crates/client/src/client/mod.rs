// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated API client.
//!
//! Every call runs request interception (fence + bearer credential), the
//! transport, then response interception (401 → shared refresh → one replay).
//! All coordination state is owned by the client instance; clones share it.

mod request;
mod response;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::broadcast;

use crate::config::ClientConfig;
use crate::credential::CredentialStore;
use crate::envelope::Envelope;
use crate::error::ClientError;
use crate::events::{self, SessionEvent};
use crate::navigation::Navigator;
use crate::refresh::{RefreshCoordinator, RefreshOutcome, RefreshState};
use crate::session::SessionController;
use crate::transport::{
    ApiRequest, ApiResponse, HttpTransport, PreparedRequest, Transport, LOGOUT_PATH,
};

struct Shared {
    transport: Arc<dyn Transport>,
    session: SessionController,
    coordinator: RefreshCoordinator,
}

#[derive(Clone)]
pub struct ApiClient {
    shared: Arc<Shared>,
}

impl ApiClient {
    /// Client talking HTTP to `config.base_url`.
    pub fn new(
        config: &ClientConfig,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let transport = Arc::new(HttpTransport::new(config.base_url.clone(), config.timeout()));
        Self::with_transport(config, transport, store, navigator)
    }

    pub fn with_transport(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let session =
            SessionController::new(store, navigator, events::channel(), config.logout_settle());
        Self {
            shared: Arc::new(Shared {
                transport,
                session,
                coordinator: RefreshCoordinator::new(config.refresh_timeout()),
            }),
        }
    }

    /// Send a call through both interceptors.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let prepared = request::prepare(&self.shared.session, &request, None).await?;
        let response = self.transmit(&prepared).await?;
        self.on_response(request, response).await
    }

    async fn transmit(&self, prepared: &PreparedRequest) -> Result<ApiResponse, ClientError> {
        tracing::debug!(id = %prepared.id, method = %prepared.method, path = %prepared.path, "sending");
        self.shared.transport.send(prepared).await.map_err(|e| {
            tracing::debug!(id = %prepared.id, err = %e, "transport failure");
            ClientError::Transport(e.0)
        })
    }

    /// `GET` and unwrap the envelope's `data`.
    pub async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, ClientError> {
        let response = self.send(ApiRequest::get(path).with_query(query)).await?;
        Envelope::decode(&response)
    }

    /// `POST` a JSON body and unwrap the envelope's `data`.
    pub async fn post_data<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ClientError> {
        let response = self.send(ApiRequest::post(path).with_json(body)).await?;
        Envelope::decode(&response)
    }

    /// `PATCH` a JSON body and unwrap the envelope's `data`.
    pub async fn patch_data<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ClientError> {
        let response = self.send(ApiRequest::patch(path).with_json(body)).await?;
        Envelope::decode(&response)
    }

    /// Store a credential pair. Any refresh still in flight from an earlier
    /// session is invalidated first.
    pub async fn login(&self, access: &str, refresh: &str) -> Result<(), ClientError> {
        self.shared.coordinator.cancel_pending();
        self.shared.session.login(access, refresh).await
    }

    /// End the session: fence requests, notify the server, drop credentials,
    /// navigate, and lift the fence after the settle delay.
    pub async fn logout(&self) {
        let notify = self.send(ApiRequest::post(LOGOUT_PATH).without_retry());
        self.shared.session.logout(&self.shared.coordinator, notify).await;
    }

    /// Run (or join) a credential refresh directly.
    pub async fn ensure_fresh_credential(&self) -> RefreshOutcome {
        self.shared
            .coordinator
            .ensure_fresh_credential(self.shared.transport.as_ref(), &self.shared.session)
            .await
    }

    pub async fn has_session(&self) -> Result<bool, ClientError> {
        Ok(self.shared.session.access_token().await?.is_some())
    }

    pub fn is_logging_out(&self) -> bool {
        self.shared.session.is_logging_out()
    }

    pub fn refresh_state(&self) -> RefreshState {
        self.shared.coordinator.state()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.session.subscribe()
    }
}
