// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Navigation capability provided by the host application.
///
/// Implementations must be fire-and-forget and tolerate repeated calls.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}

/// Navigator for headless hosts: records the redirect in the log.
#[derive(Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect_to_login(&self) {
        tracing::info!("session ended, sign in again with `ticketline login`");
    }
}
