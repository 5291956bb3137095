use std::io::Write;
use std::path::Path;

use anyhow::Result;
use tracing::info;

use scrollfx_core::host::Debounce;
use scrollfx_core::{AppConfig, ScrollEffectEngine};

use crate::clock::{CommitLine, FrameClock, FrameRequests, ReplaySummary};
use crate::page::StaticPage;
use crate::trace::{self, TraceEntry};

pub async fn run(config: AppConfig, page: &Path, trace_path: &Path, reduced_motion: bool) -> Result<()> {
    let page = StaticPage::load(page)?;
    let entries = trace::load(trace_path)?;

    let (lines, summary) = replay(config, page, entries, reduced_motion).await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for line in &lines {
        writeln!(out, "{}", serde_json::to_string(line)?)?;
    }

    info!(
        events = summary.events,
        frames = summary.frames,
        resizes = summary.resizes,
        commits = summary.commits,
        "Simulation complete"
    );
    Ok(())
}

async fn replay(
    config: AppConfig,
    page: StaticPage,
    entries: Vec<TraceEntry>,
    reduced_motion: bool,
) -> Result<(Vec<CommitLine>, ReplaySummary)> {
    let debounce = Debounce::from_millis(config.engine.resize_debounce_ms);
    let requests = FrameRequests::new();
    let mut engine = ScrollEffectEngine::initialize(page, requests.clone(), &reduced_motion, config)?;

    let mut clock = FrameClock::new(requests, engine.frame_interval(), debounce);
    let mut lines = Vec::new();
    let summary = clock
        .replay(&mut engine, entries, |line| lines.push(line))
        .await;

    Ok((lines, summary))
}
