// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end smoke tests that spawn the real `ticketline` binary against
//! the mock API.

use ticketline_specs::{run_cli, MockServer, USERNAME};

fn stdout_json(output: &std::process::Output) -> anyhow::Result<serde_json::Value> {
    anyhow::ensure!(
        output.status.success(),
        "ticketline failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(serde_json::from_slice(&output.stdout)?)
}

#[tokio::test]
async fn login_list_logout() -> anyhow::Result<()> {
    let server = MockServer::start().await?;
    let state = tempfile::tempdir()?;

    let out = run_cli(&server, state.path(), &["login", "--username", USERNAME]).await?;
    assert_eq!(stdout_json(&out)?["logged_in"], true);
    assert!(state.path().join("credentials.json").exists());

    let out = run_cli(&server, state.path(), &["whoami"]).await?;
    assert_eq!(stdout_json(&out)?["logged_in"], true);

    let out = run_cli(&server, state.path(), &["tickets", "list", "incident", "--status", "open"])
        .await?;
    let list = stdout_json(&out)?;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    assert_eq!(list[0]["id"], "INC-1");

    let out = run_cli(&server, state.path(), &["logout"]).await?;
    assert_eq!(stdout_json(&out)?["logged_in"], false);
    assert_eq!(server.logout_calls(), 1);

    let out = run_cli(&server, state.path(), &["whoami"]).await?;
    assert_eq!(stdout_json(&out)?["logged_in"], false);
    Ok(())
}

#[tokio::test]
async fn stored_session_survives_expiry_across_runs() -> anyhow::Result<()> {
    let server = MockServer::start().await?;
    let state = tempfile::tempdir()?;

    stdout_json(&run_cli(&server, state.path(), &["login", "--username", USERNAME]).await?)?;
    server.expire_access();

    let out = run_cli(&server, state.path(), &["tickets", "show", "incident", "INC-2"]).await?;
    assert_eq!(stdout_json(&out)?["status"], "resolved");
    assert_eq!(server.refresh_calls(), 1);

    let persisted: serde_json::Value =
        serde_json::from_slice(&std::fs::read(state.path().join("credentials.json"))?)?;
    assert_eq!(persisted["values"]["refresh_token"], server.current_refresh());
    Ok(())
}

#[tokio::test]
async fn transition_refused_locally_exits_nonzero() -> anyhow::Result<()> {
    let server = MockServer::start().await?;
    let state = tempfile::tempdir()?;
    stdout_json(&run_cli(&server, state.path(), &["login", "--username", USERNAME]).await?)?;

    let out =
        run_cli(&server, state.path(), &["tickets", "transition", "incident", "INC-1", "closed"])
            .await?;
    assert!(!out.status.success());
    Ok(())
}

#[tokio::test]
async fn listing_without_session_fails() -> anyhow::Result<()> {
    let server = MockServer::start().await?;
    let state = tempfile::tempdir()?;

    let out = run_cli(&server, state.path(), &["tickets", "list", "query"]).await?;
    assert!(!out.status.success());
    assert_eq!(server.refresh_calls(), 0);
    Ok(())
}
