// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::credential::{CredentialKey, CredentialStore};

/// Process-local credential store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<CredentialKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, key: CredentialKey) -> anyhow::Result<Option<String>> {
        Ok(self.values.read().await.get(&key).cloned())
    }

    async fn set(&self, key: CredentialKey, value: &str) -> anyhow::Result<()> {
        self.values.write().await.insert(key, value.to_owned());
        Ok(())
    }

    async fn delete(&self, key: CredentialKey) -> anyhow::Result<()> {
        self.values.write().await.remove(&key);
        Ok(())
    }
}
