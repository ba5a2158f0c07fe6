// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Incidents, requests, complaints and queries.
//!
//! All four kinds share one shape and one lifecycle; they differ only in
//! their collection path.

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TicketKind {
    Incident,
    Request,
    Complaint,
    Query,
}

impl TicketKind {
    pub fn collection_path(&self) -> &'static str {
        match self {
            Self::Incident => "/incidents",
            Self::Request => "/requests",
            Self::Complaint => "/complaints",
            Self::Query => "/queries",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    OnHold,
    Resolved,
    Closed,
    Cancelled,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::OnHold => "on_hold",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Cancelled)
    }

    /// Whether the workflow allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        use TicketStatus::*;
        matches!(
            (*self, next),
            (Open, InProgress | OnHold | Cancelled)
                | (InProgress, OnHold | Resolved | Cancelled)
                | (OnHold, InProgress | Cancelled)
                | (Resolved, Closed | InProgress)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TicketStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// List filter; unset fields are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub priority: Option<Priority>,
    pub assigned_to: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl TicketFilter {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(status) = self.status {
            query.push(("status".to_owned(), status.as_str().to_owned()));
        }
        if let Some(priority) = self.priority {
            query.push(("priority".to_owned(), priority.as_str().to_owned()));
        }
        if let Some(ref who) = self.assigned_to {
            query.push(("assigned_to".to_owned(), who.clone()));
        }
        if let Some(ref search) = self.search {
            query.push(("search".to_owned(), search.clone()));
        }
        if let Some(page) = self.page {
            query.push(("page".to_owned(), page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            query.push(("per_page".to_owned(), per_page.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

pub async fn list(
    client: &ApiClient,
    kind: TicketKind,
    filter: &TicketFilter,
) -> Result<Vec<Ticket>, ClientError> {
    client.get_data(kind.collection_path(), filter.to_query()).await
}

pub async fn get(client: &ApiClient, kind: TicketKind, id: &str) -> Result<Ticket, ClientError> {
    client.get_data(&format!("{}/{id}", kind.collection_path()), Vec::new()).await
}

pub async fn create(
    client: &ApiClient,
    kind: TicketKind,
    ticket: &NewTicket,
) -> Result<Ticket, ClientError> {
    let body = serde_json::to_value(ticket).map_err(|e| ClientError::Decode(e.to_string()))?;
    client.post_data(kind.collection_path(), body).await
}

/// Move `ticket` to `target`. Transitions the workflow forbids are refused
/// locally without a request.
pub async fn transition(
    client: &ApiClient,
    kind: TicketKind,
    ticket: &Ticket,
    target: TicketStatus,
    comment: Option<&str>,
) -> Result<Ticket, ClientError> {
    if !ticket.status.can_transition_to(target) {
        return Err(ClientError::InvalidTransition { from: ticket.status, to: target });
    }
    let mut body = serde_json::json!({ "status": target });
    if let Some(comment) = comment {
        body["comment"] = serde_json::Value::String(comment.to_owned());
    }
    client.patch_data(&format!("{}/{}/status", kind.collection_path(), ticket.id), body).await
}

#[cfg(test)]
#[path = "tickets_tests.rs"]
mod tests;
