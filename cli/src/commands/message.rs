// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Post messages to a running gateway and print the envelope.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde_json::{json, Value};

/// POST a launch message.
pub async fn launch(url: &str, domain: &str, tree: Option<&str>, name: Option<&str>) -> Result<()> {
    let mut msg = json!({ "point": "launch", "domain": domain });

    match (tree, name) {
        (Some(tree), _) => {
            msg["tree"] = serde_json::from_str(tree).context("--tree is not valid JSON")?;
        }
        (None, Some(name)) => {
            msg["name"] = json!(name);
        }
        (None, None) => bail!("one of --tree or --name is required"),
    }

    post_message(url, &msg).await
}

/// POST a cancel message.
pub async fn cancel(url: &str, exid: &str, nid: Option<&str>) -> Result<()> {
    let mut msg = json!({ "point": "cancel", "exid": exid });
    if let Some(nid) = nid {
        msg["nid"] = json!(nid);
    }

    post_message(url, &msg).await
}

/// Print the gateway's execution list.
pub async fn executions(url: &str) -> Result<()> {
    let response = reqwest::get(format!("{url}/executions"))
        .await
        .context("gateway unreachable")?;
    let body: Value = response.json().await.context("bad response body")?;

    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

async fn post_message(url: &str, msg: &Value) -> Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{url}/message"))
        .json(msg)
        .send()
        .await
        .context("gateway unreachable")?;

    let status = response.status();
    let body: Value = response.json().await.context("bad response body")?;

    let line = format!("{} {}", status.as_u16(), status.canonical_reason().unwrap_or(""));
    if status.is_success() {
        println!("{}", line.green());
    } else {
        println!("{}", line.red());
    }
    println!("{}", serde_json::to_string_pretty(&body)?);

    Ok(())
}
