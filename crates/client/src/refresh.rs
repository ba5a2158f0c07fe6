// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-flight credential refresh.
//!
//! The first caller to find the coordinator `Idle` becomes the leader and
//! performs the one refresh round-trip; every caller arriving while it is in
//! flight parks on a oneshot channel and receives the leader's outcome. The
//! state mutex is never held across an `.await`, and the switch back to
//! `Idle` happens in the same critical section that takes the waiter list,
//! so a waiter is either drained by this attempt or starts the next one.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::envelope::{Envelope, TokenPair};
use crate::error::RefreshError;
use crate::events::SessionEvent;
use crate::session::SessionController;
use crate::transport::{ApiRequest, PreparedRequest, Transport, REFRESH_PATH};

/// Outcome delivered to the leader and every waiter.
pub type RefreshOutcome = Result<String, RefreshError>;

/// Observable phase of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
}

enum Phase {
    Idle,
    /// Attempt started under `generation`, with its parked callers.
    Refreshing { generation: u64, waiters: Vec<oneshot::Sender<RefreshOutcome>> },
}

struct Inner {
    phase: Phase,
    /// Bumped by every logout/login; a refresh started under an older
    /// generation must not persist its result.
    generation: u64,
}

pub struct RefreshCoordinator {
    inner: Mutex<Inner>,
    refresh_timeout: Duration,
}

enum Role {
    Leader(u64),
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

impl RefreshCoordinator {
    pub fn new(refresh_timeout: Duration) -> Self {
        Self { inner: Mutex::new(Inner { phase: Phase::Idle, generation: 0 }), refresh_timeout }
    }

    pub fn state(&self) -> RefreshState {
        match self.inner.lock().phase {
            Phase::Idle => RefreshState::Idle,
            Phase::Refreshing { .. } => RefreshState::Refreshing,
        }
    }

    /// Number of callers parked behind the in-flight refresh.
    pub fn pending(&self) -> usize {
        match &self.inner.lock().phase {
            Phase::Idle => 0,
            Phase::Refreshing { waiters, .. } => waiters.len(),
        }
    }

    /// Obtain a fresh access credential, sharing one refresh among all
    /// concurrent callers.
    pub async fn ensure_fresh_credential(
        &self,
        transport: &dyn Transport,
        session: &SessionController,
    ) -> RefreshOutcome {
        let role = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            let generation = inner.generation;
            match &mut inner.phase {
                Phase::Refreshing { waiters, .. } => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Role::Waiter(rx)
                }
                Phase::Idle => {
                    inner.phase = Phase::Refreshing { generation, waiters: Vec::new() };
                    Role::Leader(generation)
                }
            }
        };

        let generation = match role {
            Role::Waiter(rx) => {
                tracing::debug!("refresh in flight, waiting");
                return rx.await.unwrap_or(Err(RefreshError::Cancelled));
            }
            Role::Leader(generation) => generation,
        };

        let in_flight = InFlight { coordinator: self, generation, settled: false };
        let outcome = match self.refresh(transport, session, generation).await {
            Err(e) if e != RefreshError::Cancelled && self.generation() != generation => {
                tracing::debug!(err = %e, "refresh failed after the session ended");
                Err(RefreshError::Cancelled)
            }
            outcome => outcome,
        };
        match outcome {
            Ok(_) => {}
            Err(RefreshError::Cancelled) => {
                tracing::debug!("refresh result discarded, session ended while in flight");
            }
            Err(ref e) => session.forced_redirect(e).await,
        }
        in_flight.settle(&outcome);
        outcome
    }

    /// Reject everyone parked behind the current refresh, invalidate its
    /// result and return to `Idle`. The in-flight round-trip itself is not
    /// aborted, but the next caller starts a new attempt instead of joining it.
    pub fn cancel_pending(&self) {
        let waiters = {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            match std::mem::replace(&mut inner.phase, Phase::Idle) {
                Phase::Idle => Vec::new(),
                Phase::Refreshing { waiters, .. } => waiters,
            }
        };
        if !waiters.is_empty() {
            tracing::debug!(count = waiters.len(), "rejecting queued refresh waiters");
        }
        for tx in waiters {
            let _ = tx.send(Err(RefreshError::Cancelled));
        }
    }

    fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    /// Return to `Idle` and deliver `outcome` to every waiter, exactly once.
    /// A no-op unless the attempt started under `generation` is still the
    /// current one.
    fn drain(&self, generation: u64, outcome: &RefreshOutcome) {
        let waiters = {
            let mut inner = self.inner.lock();
            let current = matches!(
                inner.phase,
                Phase::Refreshing { generation: started, .. } if started == generation
            );
            if !current {
                return;
            }
            match std::mem::replace(&mut inner.phase, Phase::Idle) {
                Phase::Idle => Vec::new(),
                Phase::Refreshing { waiters, .. } => waiters,
            }
        };
        for tx in waiters {
            let _ = tx.send(outcome.clone());
        }
    }

    async fn refresh(
        &self,
        transport: &dyn Transport,
        session: &SessionController,
        generation: u64,
    ) -> RefreshOutcome {
        let refresh_token = match session.refresh_token().await {
            Ok(Some(token)) => token,
            Ok(None) => return Err(RefreshError::NoRefreshCredential),
            Err(e) => {
                return Err(RefreshError::RefreshFailed { status: None, message: e.to_string() })
            }
        };

        let request = ApiRequest::post(REFRESH_PATH)
            .with_json(serde_json::json!({ "refresh_token": refresh_token }))
            .without_retry();
        let prepared = PreparedRequest::new(&request, None);

        let response = tokio::time::timeout(self.refresh_timeout, transport.send(&prepared))
            .await
            .map_err(|_| RefreshError::TimedOut)?
            .map_err(|e| RefreshError::RefreshFailed { status: None, message: e.to_string() })?;

        if !response.is_success() {
            return Err(RefreshError::RefreshFailed {
                status: Some(response.status),
                message: response.text(),
            });
        }
        let pair: TokenPair = Envelope::decode(&response).map_err(|e| {
            RefreshError::RefreshFailed { status: Some(response.status), message: e.to_string() }
        })?;

        let _writes = session.lock_writes().await;
        if self.generation() != generation {
            return Err(RefreshError::Cancelled);
        }
        session
            .store_refreshed(&pair.token, pair.refresh_token.as_deref())
            .await
            .map_err(|e| RefreshError::RefreshFailed { status: None, message: e.to_string() })?;

        let rotated = pair.refresh_token.is_some();
        session.emit(SessionEvent::Refreshed { rotated });
        tracing::info!(rotated, "credentials refreshed");
        Ok(pair.token)
    }
}

/// Leader-side guard: if the leader's future is dropped before settling,
/// waiters are rejected instead of being left suspended.
struct InFlight<'a> {
    coordinator: &'a RefreshCoordinator,
    generation: u64,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, outcome: &RefreshOutcome) {
        self.settled = true;
        self.coordinator.drain(self.generation, outcome);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!("refresh leader dropped, rejecting waiters");
            self.coordinator.drain(self.generation, &Err(RefreshError::Cancelled));
        }
    }
}

#[cfg(test)]
#[path = "refresh_tests.rs"]
mod tests;
