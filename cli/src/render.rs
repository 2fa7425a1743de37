use anyhow::{Context, Result};
use mesh_dashboard_client::format::{format_date_time, format_time};
use mesh_dashboard_client::{Node, ServerStatus};
use serde::Serialize;
use std::fmt::Write;

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

pub fn node_card(node: &Node) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", node.name);
    let _ = writeln!(out, "  mac: {}", node.mac);
    let _ = writeln!(out, "  Online?: {}", yes_no(node.online));
    let _ = writeln!(out, "  last Seen: {}", format_time(node.last_seen));
    out
}

pub fn node_list(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        out.push_str(&node_card(node));
        out.push('\n');
    }
    let online = nodes.iter().filter(|n| n.online).count();
    let _ = writeln!(out, "{} nodes ({} online)", nodes.len(), online);
    out
}

pub fn node_detail(node: &Node) -> String {
    let mut out = node_card(node);
    if let Some(adapter) = node.adapter_type {
        let _ = writeln!(out, "  adapter: {}", adapter);
    }
    out
}

pub fn status(status: &ServerStatus) -> String {
    let mut out = String::new();
    let state = if status.running { "running" } else { "stopped" };
    let _ = writeln!(out, "Status: {}", state);
    let _ = writeln!(
        out,
        "Nodes: {}/{} online",
        status.online_nodes, status.total_nodes
    );
    let _ = writeln!(out, "Updated: {}", format_date_time(status.timestamp));
    out
}

pub fn message(text: &str) -> String {
    format!("{}\n", text)
}

pub fn json<T: Serialize>(value: &T) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    text.push('\n');
    Ok(text)
}
