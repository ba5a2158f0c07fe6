// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::tickets::TicketStatus;

/// Why a request was refused before it reached the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockReason {
    /// No access credential is stored and the endpoint is not public.
    NoCredentialAvailable,
    /// A logout is in progress; only the logout call itself may pass.
    CancelledDueToLogout,
}

impl BlockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoCredentialAvailable => "NO_CREDENTIAL_AVAILABLE",
            Self::CancelledDueToLogout => "CANCELLED_DUE_TO_LOGOUT",
        }
    }
}

/// Outcome of an unsuccessful credential refresh, shared by every waiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    /// No refresh credential was stored.
    NoRefreshCredential,
    /// The refresh endpoint failed, rejected the credential, or was unreachable.
    RefreshFailed { status: Option<u16>, message: String },
    /// The refresh was abandoned because the session ended while it was in flight.
    Cancelled,
    /// The refresh round-trip exceeded the configured refresh timeout.
    TimedOut,
}

impl RefreshError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoRefreshCredential => "NO_REFRESH_CREDENTIAL",
            Self::RefreshFailed { .. } => "REFRESH_FAILED",
            Self::Cancelled => "REFRESH_CANCELLED",
            Self::TimedOut => "REFRESH_TIMED_OUT",
        }
    }
}

impl fmt::Display for RefreshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RefreshFailed { status: Some(status), message } => {
                write!(f, "{} ({status}): {message}", self.as_str())
            }
            Self::RefreshFailed { status: None, message } => {
                write!(f, "{}: {message}", self.as_str())
            }
            _ => f.write_str(self.as_str()),
        }
    }
}

impl std::error::Error for RefreshError {}

/// Errors surfaced by [`crate::client::ApiClient`].
///
/// The three request outcomes stay distinguishable: refused before sending
/// (`Blocked`), never answered (`Transport`), and answered with a failure
/// (`Status`, `Rejected`, `Refresh`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    Blocked(BlockReason),
    Refresh(RefreshError),
    /// Non-2xx response, passed through unchanged.
    Status { status: u16, body: String },
    /// Connectivity failure; no HTTP status was received.
    Transport(String),
    /// 2xx response whose envelope carried `success: false`.
    Rejected(String),
    Decode(String),
    Store(String),
    InvalidTransition { from: TicketStatus, to: TicketStatus },
}

impl ClientError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blocked(reason) => reason.as_str(),
            Self::Refresh(err) => err.as_str(),
            Self::Status { .. } => "HTTP_STATUS",
            Self::Transport(_) => "TRANSPORT",
            Self::Rejected(_) => "REJECTED",
            Self::Decode(_) => "DECODE",
            Self::Store(_) => "CREDENTIAL_STORE",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
        }
    }

    /// HTTP status of the failure, if the server produced one.
    ///
    /// Refresh failures report 401: the caller's original request failed
    /// with an authorization error that could not be recovered.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Refresh(RefreshError::RefreshFailed { .. } | RefreshError::NoRefreshCredential) => {
                Some(401)
            }
            _ => None,
        }
    }

    /// True when the request never left the process.
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }

    /// True when the session is gone and the user must sign in again.
    pub fn is_session_expired(&self) -> bool {
        matches!(
            self,
            Self::Refresh(RefreshError::NoRefreshCredential | RefreshError::RefreshFailed { .. })
                | Self::Blocked(BlockReason::NoCredentialAvailable)
        )
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blocked(reason) => f.write_str(reason.as_str()),
            Self::Refresh(err) => fmt::Display::fmt(err, f),
            Self::Status { status, body } if body.is_empty() => write!(f, "HTTP {status}"),
            Self::Status { status, body } => write!(f, "HTTP {status}: {body}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Rejected(msg) => write!(f, "request rejected: {msg}"),
            Self::Decode(msg) => write!(f, "invalid response: {msg}"),
            Self::Store(msg) => write!(f, "credential store: {msg}"),
            Self::InvalidTransition { from, to } => {
                write!(f, "cannot move ticket from {} to {}", from.as_str(), to.as_str())
            }
        }
    }
}

impl std::error::Error for ClientError {}

impl From<BlockReason> for ClientError {
    fn from(reason: BlockReason) -> Self {
        Self::Blocked(reason)
    }
}

impl From<RefreshError> for ClientError {
    fn from(err: RefreshError) -> Self {
        Self::Refresh(err)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
