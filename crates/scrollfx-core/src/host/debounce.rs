//! Quiet-period debounce for resize notifications
//!
//! The engine never owns timers. Hosts feed every resize notification into a
//! [`Debounce`] and call `ScrollEffectEngine::resize` only once the page has
//! been quiet for the configured period.

use std::time::{Duration, Instant};

/// Default quiet period before a resize is acted on
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct Debounce {
    quiet: Duration,
    last_poke: Option<Instant>,
}

impl Default for Debounce {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

impl Debounce {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            last_poke: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Record a notification, restarting the quiet period
    pub fn poke(&mut self, now: Instant) {
        self.last_poke = Some(now);
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.last_poke.is_some()
    }

    /// When the pending notification becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.last_poke.map(|at| at + self.quiet)
    }

    /// Returns true exactly once per burst, when the quiet period has elapsed
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline() {
            Some(deadline) if now >= deadline => {
                self.last_poke = None;
                true
            }
            _ => false,
        }
    }
}
