//! Recorded host events to replay through the engine

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    Scroll {
        offset: f64,
    },
    /// Layout change; any given height replaces the page's current one
    Resize {
        #[serde(default)]
        document_height: Option<f64>,
        #[serde(default)]
        viewport_height: Option<f64>,
    },
    Hide,
    Show,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Milliseconds since the start of the replay
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: TraceEvent,
}

impl TraceEntry {
    pub fn new(at_ms: u64, event: TraceEvent) -> Self {
        Self { at_ms, event }
    }
}

/// Parse a JSON trace, sorted by time. Entries with equal times keep their order.
pub fn parse(content: &str) -> Result<Vec<TraceEntry>> {
    let mut entries: Vec<TraceEntry> = serde_json::from_str(content).context("Failed to parse trace")?;
    entries.sort_by_key(|entry| entry.at_ms);
    Ok(entries)
}

pub fn load(path: &Path) -> Result<Vec<TraceEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read trace {}", path.display()))?;
    parse(&content)
}
