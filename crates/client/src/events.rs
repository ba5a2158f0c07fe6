// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session lifecycle events, fanned out to subscribers over a broadcast channel.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events emitted by the session controller and refresh coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Credentials were stored by `login`.
    LoggedIn,
    /// A refresh round-trip produced a new access credential.
    Refreshed { rotated: bool },
    /// The refresh failed and the session is being torn down.
    #[serde(rename = "refresh:failed")]
    RefreshFailed { error: String },
    /// `logout` started; requests are fenced.
    LoggingOut,
    /// Navigation to the logged-out entry point was requested.
    RedirectToLogin,
    /// `logout` finished and the fence was lifted.
    LoggedOut,
}

/// Sender half shared by the session components.
pub type EventSender = broadcast::Sender<SessionEvent>;

pub fn channel() -> EventSender {
    let (tx, _) = broadcast::channel(64);
    tx
}
