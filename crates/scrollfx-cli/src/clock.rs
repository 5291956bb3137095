//! Frame clock: the host side of the frame scheduler.
//!
//! The engine raises a shared flag through [`FrameRequests`]; the clock checks
//! it once per frame interval and runs a recompute only when it is set. Trace
//! events are delivered at their recorded times and resize notifications go
//! through a [`Debounce`] before the engine re-scans.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use scrollfx_core::host::Debounce;
use scrollfx_core::{FrameScheduler, RenderSurface, ScrollEffectEngine};

use crate::page::StaticPage;
use crate::trace::{TraceEntry, TraceEvent};

/// Frame request flag shared between the engine and the clock
#[derive(Debug, Clone, Default)]
pub struct FrameRequests(Rc<Cell<bool>>);

impl FrameRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a pending request
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }
}

impl FrameScheduler for FrameRequests {
    fn request_frame(&mut self) {
        self.0.set(true);
    }
}

pub type PageEngine = ScrollEffectEngine<StaticPage, FrameRequests>;

/// One committed style, as printed by `simulate`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitLine {
    pub frame: u64,
    pub at_ms: u64,
    pub node: usize,
    pub label: String,
    pub property: &'static str,
    pub value: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub events: usize,
    pub frames: u64,
    pub resizes: usize,
    pub commits: usize,
}

pub struct FrameClock {
    requests: FrameRequests,
    interval: Duration,
    debounce: Debounce,
}

impl FrameClock {
    pub fn new(requests: FrameRequests, interval: Duration, debounce: Debounce) -> Self {
        Self {
            requests,
            interval,
            debounce,
        }
    }

    /// Replay `trace` against `engine` until every event has been delivered
    /// and no frame or resize is pending.
    pub async fn replay<F>(&mut self, engine: &mut PageEngine, trace: Vec<TraceEntry>, mut emit: F) -> ReplaySummary
    where
        F: FnMut(CommitLine),
    {
        let start = Instant::now();
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut events = trace.into_iter().peekable();
        let mut summary = ReplaySummary::default();
        let frames_before = engine.state().frames;

        // Anything committed during initialization, e.g. the first step
        summary.commits += flush(engine, start, &mut emit);

        loop {
            let next_event = events
                .peek()
                .map(|entry| start + Duration::from_millis(entry.at_ms));
            let resize_due = self.debounce.deadline().map(Instant::from_std);

            tokio::select! {
                biased;

                _ = time::sleep_until(next_event.unwrap_or_else(Instant::now)), if next_event.is_some() => {
                    if let Some(entry) = events.next() {
                        self.apply(engine, entry.event);
                        summary.events += 1;
                    }
                }

                _ = time::sleep_until(resize_due.unwrap_or_else(Instant::now)), if resize_due.is_some() => {
                    if self.debounce.fire(Instant::now().into_std()) {
                        engine.resize();
                        summary.resizes += 1;
                    }
                }

                _ = ticker.tick() => {
                    if self.requests.take() {
                        engine.recompute();
                        log_step_events(engine);
                    } else if next_event.is_none() && !self.debounce.is_pending() {
                        break;
                    }
                }
            }

            summary.commits += flush(engine, start, &mut emit);
        }

        // Includes frames rendered directly on show
        summary.frames = engine.state().frames - frames_before;
        debug!(?summary, "Replay finished");
        summary
    }

    fn apply(&mut self, engine: &mut PageEngine, event: TraceEvent) {
        match event {
            TraceEvent::Scroll { offset } => engine.on_scroll(offset),
            TraceEvent::Resize {
                document_height,
                viewport_height,
            } => {
                let mut geometry = engine.surface().geometry();
                if let Some(height) = document_height {
                    geometry.document_height = height;
                }
                if let Some(height) = viewport_height {
                    geometry.viewport_height = height;
                }
                engine.surface_mut().set_geometry(geometry);
                self.debounce.poke(Instant::now().into_std());
            }
            TraceEvent::Hide => engine.visibility_changed(false),
            TraceEvent::Show => {
                engine.visibility_changed(true);
                log_step_events(engine);
            }
        }
    }
}

fn log_step_events(engine: &PageEngine) {
    for event in engine.step_events() {
        debug!(?event, "Step transition");
    }
}

fn flush<F>(engine: &mut PageEngine, start: Instant, emit: &mut F) -> usize
where
    F: FnMut(CommitLine),
{
    let records = engine.surface_mut().drain_commits();
    let frame = engine.state().frames;
    let at_ms = start.elapsed().as_millis() as u64;
    let count = records.len();

    for record in records {
        emit(CommitLine {
            frame,
            at_ms,
            node: record.node,
            label: engine.surface().describe(record.node),
            property: record.commit.css_property(),
            value: record.commit.to_string(),
        });
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollfx_core::config::StepsConfig;
    use scrollfx_core::{AppConfig, SelectorConfig};

    const PAGE: &str = r#"
        document_height = 3000
        viewport_height = 1000

        [[nodes]]
        class = ["layer"]
        top = 0
        height = 1000

        [[nodes]]
        class = ["step"]
        top = 0
        height = 1500

        [[nodes]]
        class = ["step"]
        top = 1500
        height = 1500
    "#;

    fn engine(config: AppConfig) -> (PageEngine, FrameClock) {
        let requests = FrameRequests::new();
        let page = StaticPage::from_toml(PAGE).unwrap();
        let engine = ScrollEffectEngine::initialize(page, requests.clone(), &false, config).unwrap();
        let clock = FrameClock::new(requests, Duration::from_millis(16), Debounce::default());
        (engine, clock)
    }

    fn layer_config() -> AppConfig {
        AppConfig {
            bindings: vec![SelectorConfig::new(".layer", 0.5)],
            ..Default::default()
        }
    }

    fn scroll(at_ms: u64, offset: f64) -> TraceEntry {
        TraceEntry::new(at_ms, TraceEvent::Scroll { offset })
    }

    #[tokio::test(start_paused = true)]
    async fn test_scrolls_within_a_frame_coalesce() {
        let (mut engine, mut clock) = engine(layer_config());
        let trace = vec![scroll(1, 10.0), scroll(3, 20.0), scroll(5, 30.0), scroll(7, 40.0)];

        let mut lines = Vec::new();
        let summary = clock.replay(&mut engine, trace, |line| lines.push(line)).await;

        assert_eq!(summary.events, 4);
        assert_eq!(summary.frames, 1);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].label, "div.layer");
        assert_eq!(lines[0].property, "transform");
        assert_eq!(lines[0].value, "translateY(20px)");
        assert_eq!(lines[0].at_ms, 16);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_frames_for_spaced_scrolls() {
        let (mut engine, mut clock) = engine(layer_config());
        let trace = vec![scroll(1, 100.0), scroll(40, 200.0)];

        let mut values = Vec::new();
        let summary = clock
            .replay(&mut engine, trace, |line| values.push(line.value))
            .await;

        assert_eq!(summary.frames, 2);
        assert_eq!(values, vec!["translateY(50px)", "translateY(100px)"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resize_burst_rescans_once() {
        let (mut engine, mut clock) = engine(layer_config());
        let resize = |at_ms| {
            TraceEntry::new(
                at_ms,
                TraceEvent::Resize {
                    document_height: Some(5000.0),
                    viewport_height: None,
                },
            )
        };
        let trace = vec![resize(1), resize(100), resize(200)];

        let summary = clock.replay(&mut engine, trace, |_| {}).await;

        assert_eq!(summary.resizes, 1);
        // The re-scan requests a frame for the current offset
        assert_eq!(summary.frames, 1);
        assert_eq!(engine.surface().geometry().document_height, 5000.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hidden_page_renders_on_show() {
        let (mut engine, mut clock) = engine(layer_config());
        let trace = vec![
            TraceEntry::new(1, TraceEvent::Hide),
            scroll(2, 300.0),
            scroll(50, 400.0),
            TraceEntry::new(100, TraceEvent::Show),
        ];

        let mut lines = Vec::new();
        let summary = clock.replay(&mut engine, trace, |line| lines.push(line)).await;

        // One render for the show, none left over for the next tick
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].at_ms, 100);
        assert_eq!(lines[0].value, "translateY(200px)");
        assert_eq!(summary.frames, 1);
        assert_eq!(summary.frames, engine.state().frames);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_step_activation_is_flushed() {
        let config = AppConfig {
            steps: Some(StepsConfig::default()),
            ..layer_config()
        };
        let (mut engine, mut clock) = engine(config);

        let mut lines = Vec::new();
        clock
            .replay(&mut engine, vec![scroll(1, 1200.0)], |line| lines.push(line))
            .await;

        let classes: Vec<(usize, String)> = lines
            .iter()
            .filter(|line| line.property == "class")
            .map(|line| (line.node, line.value.clone()))
            .collect();
        assert_eq!(
            classes,
            vec![
                (1, "+active".to_string()),
                (1, "-active".to_string()),
                (2, "+active".to_string()),
            ]
        );
    }
}
