// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session controller: login, logout fencing, and the forced redirect taken
//! when a refresh cannot recover the session.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};

use crate::credential::{CredentialKey, CredentialStore};
use crate::error::{ClientError, RefreshError};
use crate::events::{EventSender, SessionEvent};
use crate::navigation::Navigator;
use crate::refresh::RefreshCoordinator;
use crate::transport::ApiResponse;

pub struct SessionController {
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    events: EventSender,
    logging_out: AtomicBool,
    logout_settle: Duration,
    /// Serializes credential writes between a completing refresh and logout.
    writes: Mutex<()>,
}

impl SessionController {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
        events: EventSender,
        logout_settle: Duration,
    ) -> Self {
        Self {
            store,
            navigator,
            events,
            logging_out: AtomicBool::new(false),
            logout_settle,
            writes: Mutex::new(()),
        }
    }

    pub fn is_logging_out(&self) -> bool {
        self.logging_out.load(Ordering::SeqCst)
    }

    pub fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn access_token(&self) -> Result<Option<String>, ClientError> {
        self.store.get(CredentialKey::Access).await.map_err(store_error)
    }

    pub async fn refresh_token(&self) -> Result<Option<String>, ClientError> {
        self.store.get(CredentialKey::Refresh).await.map_err(store_error)
    }

    /// Persist a credential pair obtained by a prior authentication step.
    pub async fn login(&self, access: &str, refresh: &str) -> Result<(), ClientError> {
        {
            let _writes = self.writes.lock().await;
            self.store.set(CredentialKey::Access, access).await.map_err(store_error)?;
            self.store.set(CredentialKey::Refresh, refresh).await.map_err(store_error)?;
        }
        self.emit(SessionEvent::LoggedIn);
        tracing::info!("logged in");
        Ok(())
    }

    /// User-initiated logout.
    ///
    /// The fence goes up before anything else and stays up until
    /// `logout_settle` after navigation. `notify` is the best-effort call to
    /// the logout endpoint; it runs after the fence is up and its outcome is
    /// ignored. A logout issued while another is in progress returns at once.
    pub async fn logout<F>(&self, coordinator: &RefreshCoordinator, notify: F)
    where
        F: Future<Output = Result<ApiResponse, ClientError>>,
    {
        if self.logging_out.swap(true, Ordering::SeqCst) {
            tracing::debug!("logout already in progress");
            return;
        }
        self.emit(SessionEvent::LoggingOut);
        coordinator.cancel_pending();

        if let Err(e) = notify.await {
            tracing::debug!(err = %e, "logout notification failed");
        }

        {
            let _writes = self.writes.lock().await;
            self.clear_credentials().await;
        }
        self.navigator.redirect_to_login();
        self.emit(SessionEvent::RedirectToLogin);

        tokio::time::sleep(self.logout_settle).await;
        self.logging_out.store(false, Ordering::SeqCst);
        self.emit(SessionEvent::LoggedOut);
        tracing::info!("logged out");
    }

    /// Tear the session down after an unrecoverable refresh failure.
    pub async fn forced_redirect(&self, reason: &RefreshError) {
        tracing::warn!(err = %reason, "session expired, redirecting to login");
        self.emit(SessionEvent::RefreshFailed { error: reason.to_string() });
        {
            let _writes = self.writes.lock().await;
            self.clear_credentials().await;
        }
        self.navigator.redirect_to_login();
        self.emit(SessionEvent::RedirectToLogin);
    }

    /// Lock credential writes. Held by a completing refresh while it checks
    /// for a logout and persists the new pair.
    pub(crate) async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().await
    }

    /// Store a refreshed pair. Caller holds [`Self::lock_writes`].
    pub(crate) async fn store_refreshed(
        &self,
        access: &str,
        refresh: Option<&str>,
    ) -> Result<(), ClientError> {
        self.store.set(CredentialKey::Access, access).await.map_err(store_error)?;
        if let Some(refresh) = refresh {
            self.store.set(CredentialKey::Refresh, refresh).await.map_err(store_error)?;
        }
        Ok(())
    }

    async fn clear_credentials(&self) {
        for key in [CredentialKey::Access, CredentialKey::Refresh] {
            if let Err(e) = self.store.delete(key).await {
                tracing::warn!(key = key.as_str(), err = %e, "failed to delete credential");
            }
        }
    }
}

fn store_error(e: anyhow::Error) -> ClientError {
    ClientError::Store(format!("{e:#}"))
}
