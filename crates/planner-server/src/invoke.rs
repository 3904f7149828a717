//! One-shot invocation: read an event document, run it, print the response.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::Context;
use planner_core::{InboundEvent, OutboundResponse};

use crate::state::AppState;

pub async fn run(state: &AppState, source: &Path) -> anyhow::Result<OutboundResponse> {
    let raw = read_source(source)?;
    let event = parse_event(&raw)?;
    let response = state.handler.handle(event).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(response)
}

/// `-` reads from stdin.
fn read_source(source: &Path) -> anyhow::Result<String> {
    if source.as_os_str() == "-" {
        log::info!("Reading event from stdin");
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .context("can't read event from stdin")?;
        return Ok(raw);
    }

    fs::read_to_string(source)
        .with_context(|| format!("can't read event file {}", source.display()))
}

pub fn parse_event(raw: &str) -> anyhow::Result<InboundEvent> {
    serde_json::from_str(raw).context("event is not a valid request document")
}
