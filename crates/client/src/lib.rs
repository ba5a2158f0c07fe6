// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ticketline: authenticated client for the incident/ticket-management API.

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod credential;
pub mod envelope;
pub mod error;
pub mod events;
pub mod navigation;
pub mod refresh;
pub mod session;
pub mod transport;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{BlockReason, ClientError, RefreshError};
pub use refresh::RefreshState;
