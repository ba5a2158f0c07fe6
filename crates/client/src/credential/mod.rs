// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential storage: the access/refresh token pair behind an async
//! key-value capability.
//!
//! The store is the only mutable state shared between the request path and
//! the session components. Backends only need `get`/`set`/`delete`.

pub mod file;
pub mod memory;

use async_trait::async_trait;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Keys held by a [`CredentialStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    /// Short-lived bearer credential attached to outbound calls.
    Access,
    /// Longer-lived credential exchanged for a new pair on refresh.
    Refresh,
}

impl CredentialKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "token",
            Self::Refresh => "refresh_token",
        }
    }
}

/// Async persisted key-value store for credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, key: CredentialKey) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: CredentialKey, value: &str) -> anyhow::Result<()>;
    async fn delete(&self, key: CredentialKey) -> anyhow::Result<()>;
}
