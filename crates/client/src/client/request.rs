// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request interception: gate an outbound call and attach its credential.

use crate::error::{BlockReason, ClientError};
use crate::session::SessionController;
use crate::transport::{ApiRequest, PreparedRequest};

/// Clear `request` for transmission.
///
/// `token` overrides the stored access credential (used when replaying a call
/// with the credential a refresh just produced). Only reads shared state.
pub(crate) async fn prepare(
    session: &SessionController,
    request: &ApiRequest,
    token: Option<String>,
) -> Result<PreparedRequest, ClientError> {
    fence(session, request)?;

    let bearer = match token {
        // Replays skip the store; a logout since the refresh is caught by the fence.
        Some(token) => Some(token),
        None => session.access_token().await?,
    };
    // The store read is a suspension point; a logout may have started since.
    fence(session, request)?;

    if bearer.is_none() && !request.is_public() {
        tracing::debug!(id = %request.id, path = %request.path, "no access credential, request blocked");
        return Err(BlockReason::NoCredentialAvailable.into());
    }
    Ok(PreparedRequest::new(request, bearer))
}

fn fence(session: &SessionController, request: &ApiRequest) -> Result<(), ClientError> {
    if session.is_logging_out() && !request.is_logout() {
        tracing::debug!(id = %request.id, path = %request.path, "logout in progress, request blocked");
        return Err(BlockReason::CancelledDueToLogout.into());
    }
    Ok(())
}
