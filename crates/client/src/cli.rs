// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line surface of the `ticketline` binary.

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use crate::api::auth;
use crate::api::tickets::{self, NewTicket, Priority, TicketFilter, TicketKind, TicketStatus};
use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::credential::{CredentialStore, FileStore};
use crate::navigation::{LogNavigator, Navigator};

#[derive(Debug, Parser)]
#[command(name = "ticketline", version, about = "Incident and ticket client")]
pub struct Cli {
    #[command(flatten)]
    pub config: ClientConfig,

    /// Log output format.
    #[arg(long, value_enum, default_value = "text", env = "TICKETLINE_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session credentials.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "TICKETLINE_PASSWORD")]
        password: String,
    },
    /// End the session and drop stored credentials.
    Logout,
    /// Report whether a session is stored.
    Whoami,
    /// Work with incidents, requests, complaints and queries.
    Tickets {
        #[command(subcommand)]
        action: TicketCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum TicketCommand {
    List {
        #[arg(value_enum)]
        kind: TicketKind,
        #[arg(long, value_enum)]
        status: Option<TicketStatus>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long)]
        assigned_to: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
    Show {
        #[arg(value_enum)]
        kind: TicketKind,
        id: String,
    },
    Create {
        #[arg(value_enum)]
        kind: TicketKind,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
    },
    Transition {
        #[arg(value_enum)]
        kind: TicketKind,
        id: String,
        #[arg(value_enum)]
        status: TicketStatus,
        #[arg(long)]
        comment: Option<String>,
    },
}

/// Build the client for the configured state dir and run one command.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let store: Arc<dyn CredentialStore> = Arc::new(FileStore::new(&cli.config.state_dir()));
    let navigator: Arc<dyn Navigator> = Arc::new(LogNavigator);
    let client = ApiClient::new(&cli.config, store, navigator);

    match cli.command {
        Command::Login { username, password } => {
            auth::authenticate(&client, &username, &password).await?;
            print_json(&serde_json::json!({ "logged_in": true }))
        }
        Command::Logout => {
            client.logout().await;
            print_json(&serde_json::json!({ "logged_in": false }))
        }
        Command::Whoami => {
            let logged_in = client.has_session().await?;
            print_json(&serde_json::json!({ "logged_in": logged_in }))
        }
        Command::Tickets { action } => run_tickets(&client, action).await,
    }
}

async fn run_tickets(client: &ApiClient, action: TicketCommand) -> anyhow::Result<()> {
    match action {
        TicketCommand::List { kind, status, priority, assigned_to, search, page } => {
            let filter =
                TicketFilter { status, priority, assigned_to, search, page, per_page: None };
            let list = tickets::list(client, kind, &filter).await?;
            print_json(&list)
        }
        TicketCommand::Show { kind, id } => {
            let ticket = tickets::get(client, kind, &id).await?;
            print_json(&ticket)
        }
        TicketCommand::Create { kind, title, description, priority } => {
            let ticket =
                tickets::create(client, kind, &NewTicket { title, description, priority }).await?;
            print_json(&ticket)
        }
        TicketCommand::Transition { kind, id, status, comment } => {
            let current = tickets::get(client, kind, &id).await?;
            let ticket =
                tickets::transition(client, kind, &current, status, comment.as_deref()).await?;
            print_json(&ticket)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
