// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the ticketline API client.
#[derive(Debug, Clone, clap::Args)]
pub struct ClientConfig {
    /// Base URL of the ticketing API; endpoint paths are appended to it.
    #[arg(long, default_value = "http://127.0.0.1:8080/api", env = "TICKETLINE_BASE_URL")]
    pub base_url: String,

    /// Per-request transport timeout in milliseconds.
    #[arg(long, default_value_t = 15000, env = "TICKETLINE_TIMEOUT_MS")]
    pub timeout_ms: u64,

    /// Upper bound on the credential refresh round-trip in milliseconds.
    #[arg(long, default_value_t = 30000, env = "TICKETLINE_REFRESH_TIMEOUT_MS")]
    pub refresh_timeout_ms: u64,

    /// How long requests stay fenced after logout navigation begins.
    #[arg(long, default_value_t = 500, env = "TICKETLINE_LOGOUT_SETTLE_MS")]
    pub logout_settle_ms: u64,

    /// Directory holding persisted credentials.
    #[arg(long, env = "TICKETLINE_STATE_DIR")]
    pub state_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Defaults for the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: 15000,
            refresh_timeout_ms: 30000,
            logout_settle_ms: 500,
            state_dir: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_millis(self.refresh_timeout_ms)
    }

    pub fn logout_settle(&self) -> Duration {
        Duration::from_millis(self.logout_settle_ms)
    }

    /// Resolve the credential directory.
    ///
    /// Uses `--state-dir` when given, then `$XDG_STATE_HOME/ticketline`,
    /// then `$HOME/.local/state/ticketline`.
    pub fn state_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.state_dir {
            return dir.clone();
        }
        if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
            return PathBuf::from(xdg).join("ticketline");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".local/state/ticketline");
        }
        PathBuf::from(".ticketline")
    }
}
