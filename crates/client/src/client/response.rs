// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Response interception: turn a 401 into one shared refresh plus one replay.

use crate::client::{request, ApiClient};
use crate::error::ClientError;
use crate::transport::{ApiRequest, ApiResponse};

impl ApiClient {
    pub(super) async fn on_response(
        &self,
        mut request: ApiRequest,
        response: ApiResponse,
    ) -> Result<ApiResponse, ClientError> {
        if response.is_success() {
            return Ok(response);
        }
        if !response.is_unauthorized() {
            return Err(status_error(&request, response));
        }

        // The refresh and logout calls never refresh themselves, and a call
        // is replayed at most once.
        if !request.is_retryable()
            || request.retried()
            || request.is_logout()
            || request.is_refresh()
        {
            return Err(status_error(&request, response));
        }
        if self.shared.session.is_logging_out() {
            tracing::debug!(id = %request.id, "401 during logout, not refreshing");
            return Err(status_error(&request, response));
        }

        request.mark_retried();
        tracing::debug!(id = %request.id, path = %request.path, "access credential rejected, refreshing");
        let token = self
            .shared
            .coordinator
            .ensure_fresh_credential(self.shared.transport.as_ref(), &self.shared.session)
            .await?;

        let prepared = request::prepare(&self.shared.session, &request, Some(token)).await?;
        let replayed = self.transmit(&prepared).await?;
        if replayed.is_success() {
            Ok(replayed)
        } else {
            Err(status_error(&request, replayed))
        }
    }
}

fn status_error(request: &ApiRequest, response: ApiResponse) -> ClientError {
    if response.status >= 500 {
        tracing::warn!(id = %request.id, path = %request.path, status = response.status, "server error");
    } else {
        tracing::debug!(id = %request.id, path = %request.path, status = response.status, "request failed");
    }
    ClientError::Status { status: response.status, body: response.text() }
}
