//! Scroll effect engine
//!
//! Coalesces scroll notifications into at most one recompute per display
//! frame and commits every binding's style from a single offset snapshot.
//!
//! # Usage
//!
//! ```ignore
//! use scrollfx_core::{AppConfig, ScrollEffectEngine};
//!
//! let mut engine = ScrollEffectEngine::initialize(surface, scheduler, &reduced_motion, AppConfig::load()?)?;
//!
//! // From the host's scroll listener, as often as it fires
//! engine.on_scroll(offset);
//!
//! // From the host's frame callback, only after a frame was requested
//! engine.recompute();
//! ```

mod scan;
mod state;

use std::time::Duration;

use tracing::{info, trace};

use crate::config::AppConfig;
use crate::effect::{scroll_percent, Binding};
use crate::error::Result;
use crate::host::{FrameScheduler, MotionPreference, RenderSurface, StyleCommit};
use crate::story::{RevealTracker, StepEvent, StepTracker};

pub use scan::scan_bindings;
pub use state::EngineState;

pub struct ScrollEffectEngine<S: RenderSurface, F: FrameScheduler> {
    surface: S,
    scheduler: F,
    config: AppConfig,
    state: EngineState,
    bindings: Vec<Binding<S::Node>>,
    progress: Vec<S::Node>,
    steps: Option<StepTracker<S::Node>>,
    reveal: Option<RevealTracker<S::Node>>,
    /// Step transitions from the latest frame
    step_events: Vec<StepEvent>,
}

impl<S: RenderSurface, F: FrameScheduler> ScrollEffectEngine<S, F> {
    /// Validate `config`, scan the surface and sample the motion preference.
    ///
    /// Fails only on invalid configuration. Selectors that match nothing are
    /// not an error.
    pub fn initialize<M>(surface: S, scheduler: F, motion: &M, config: AppConfig) -> Result<Self>
    where
        M: MotionPreference + ?Sized,
    {
        config.validate()?;
        let reduced_motion = motion.prefers_reduced_motion();

        let mut engine = Self {
            surface,
            scheduler,
            config,
            state: EngineState::new(reduced_motion),
            bindings: Vec::new(),
            progress: Vec::new(),
            steps: None,
            reveal: None,
            step_events: Vec::new(),
        };
        engine.scan();

        if let Some(steps) = engine.steps.as_mut() {
            engine.step_events = steps.start(&mut engine.surface);
        }

        info!(
            bindings = engine.bindings.len(),
            configured = engine.config.bindings.len(),
            reduced_motion,
            "Scroll effect engine initialized"
        );
        Ok(engine)
    }

    /// Rebuild bindings and trackers from the surface's current layout
    fn scan(&mut self) {
        self.bindings = scan_bindings(&self.surface, &self.config, self.state.reduced_motion);

        self.progress = self
            .config
            .progress
            .as_ref()
            .map(|progress| self.surface.query_all(&progress.selector))
            .unwrap_or_default();

        let steps = self
            .config
            .steps
            .as_ref()
            .map(|steps| StepTracker::scan(&self.surface, steps));
        self.steps = match (steps, self.steps.take()) {
            (Some(mut fresh), Some(previous)) => {
                fresh.carry_over(&previous);
                Some(fresh)
            }
            (fresh, _) => fresh,
        };

        self.reveal = self
            .config
            .reveal
            .as_ref()
            .map(|reveal| RevealTracker::scan(&self.surface, reveal));
    }

    /// Record a scroll position and request a frame if none is pending.
    ///
    /// Offsets arriving before the next frame overwrite each other; only the
    /// latest is ever rendered.
    pub fn on_scroll(&mut self, offset: f64) {
        self.state.last_scroll_offset = offset;
        if !self.state.frame_scheduled && self.state.visible {
            self.state.frame_scheduled = true;
            self.scheduler.request_frame();
        }
    }

    /// Frame callback: commit every binding for the latest scroll offset
    pub fn recompute(&mut self) {
        self.state.frame_scheduled = false;

        let offset = self.state.last_scroll_offset;
        let geometry = self.surface.geometry();
        let percent = scroll_percent(offset, geometry);

        let mut updated = 0;
        for binding in &self.bindings {
            if !binding.is_active_at(offset) {
                continue;
            }
            for style in binding.styles(offset, percent) {
                self.surface.commit(&binding.target, style);
            }
            updated += 1;
        }

        for node in &self.progress {
            self.surface.commit(node, StyleCommit::width(percent * 100.0));
        }

        self.step_events = match self.steps.as_mut() {
            Some(steps) => steps.advance(&mut self.surface, offset, geometry.viewport_height),
            None => Vec::new(),
        };

        if let Some(reveal) = self.reveal.as_mut() {
            reveal.update(&mut self.surface, offset, geometry.viewport_height);
        }

        self.state.frames += 1;
        trace!(offset, percent, updated, frame = self.state.frames, "Recomputed scroll effects");
    }

    /// Re-scan after the page layout changed.
    ///
    /// Callers debounce resize notifications themselves; see
    /// [`crate::host::Debounce`]. The reduced-motion sample is kept.
    pub fn resize(&mut self) {
        self.scan();
        info!(bindings = self.bindings.len(), "Re-scanned bindings after resize");
        let offset = self.state.last_scroll_offset;
        self.on_scroll(offset);
    }

    /// Page visibility changed.
    ///
    /// Becoming visible renders the latest offset immediately, covering
    /// anything missed while hidden. While hidden no frames are requested.
    pub fn visibility_changed(&mut self, is_visible: bool) {
        self.state.visible = is_visible;
        if is_visible {
            // Rendered here and now; no frame request goes out
            self.recompute();
        }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn bindings(&self) -> &[Binding<S::Node>] {
        &self.bindings
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    /// Active scrollytelling step, if steps are configured
    pub fn active_step(&self) -> Option<usize> {
        self.steps.as_ref().and_then(StepTracker::active)
    }

    /// Step enters and exits caused by the last `recompute` (or by
    /// `initialize` before the first frame)
    pub fn step_events(&self) -> &[StepEvent] {
        &self.step_events
    }

    /// Scroll percent for the latest recorded offset
    pub fn scroll_percent(&self) -> f64 {
        scroll_percent(self.state.last_scroll_offset, self.surface.geometry())
    }

    /// Frame interval the host clock should tick at
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.config.engine.frame_interval_ms.max(1))
    }
}
