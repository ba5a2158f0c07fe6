// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed endpoints of the ticketing API.

pub mod auth;
pub mod tickets;
