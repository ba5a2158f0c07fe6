// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential persistence: a JSON file rewritten atomically on every change.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::credential::{CredentialKey, CredentialStore};

/// On-disk layout of `credentials.json`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct StoredCredentials {
    #[serde(default)]
    values: BTreeMap<String, String>,
}

/// Credential store backed by `<dir>/credentials.json`.
///
/// Read-modify-write cycles are serialized by an async mutex so concurrent
/// `set`/`delete` calls never lose each other's updates.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(dir: &Path) -> Self {
        Self { path: dir.join("credentials.json"), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> anyhow::Result<StoredCredentials> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoredCredentials::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write via a unique temp file + rename.
    ///
    /// The temp name carries PID and a counter so two processes sharing the
    /// directory never interleave writes into the same temp file.
    async fn save(&self, creds: &StoredCredentials) -> anyhow::Result<()> {
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let json = serde_json::to_string_pretty(creds)?;
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp_name = format!(
            "{}.{}.{}.tmp",
            self.path.file_name().unwrap_or_default().to_string_lossy(),
            std::process::id(),
            seq,
        );
        let tmp_path = self.path.with_file_name(tmp_name);
        tokio::fs::write(&tmp_path, json).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600)).await?;
        }
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn get(&self, key: CredentialKey) -> anyhow::Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.values.get(key.as_str()).cloned())
    }

    async fn set(&self, key: CredentialKey, value: &str) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        let mut creds = self.load().await?;
        creds.values.insert(key.as_str().to_owned(), value.to_owned());
        self.save(&creds).await
    }

    async fn delete(&self, key: CredentialKey) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        let mut creds = self.load().await?;
        if creds.values.remove(key.as_str()).is_none() {
            return Ok(());
        }
        self.save(&creds).await
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
