use std::time::Duration;

use tracing::debug;

use crate::config::StepsConfig;
use crate::host::{RenderSurface, StyleCommit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Up,
    Down,
}

/// Step transitions reported by [`StepTracker::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    Enter { index: usize, direction: StepDirection },
    Exit { index: usize, direction: StepDirection },
}

#[derive(Debug, Clone)]
struct Step<N> {
    node: N,
    top: f64,
    fade_children: Vec<N>,
}

/// Tracks which scrollytelling step the trigger line is in.
///
/// Exactly one step is active once the tracker has been started. The active
/// step is the last one whose top edge is at or above the trigger line; a
/// trigger line above every step keeps the first step active.
#[derive(Debug, Clone)]
pub struct StepTracker<N> {
    steps: Vec<Step<N>>,
    active: Option<usize>,
    trigger_offset: f64,
    active_class: String,
    stagger: Duration,
}

impl<N: Clone> StepTracker<N> {
    /// Collect steps and their fade-in children from the surface
    pub fn scan<S>(surface: &S, config: &StepsConfig) -> Self
    where
        S: RenderSurface<Node = N>,
    {
        let steps = surface
            .query_all(&config.selector)
            .into_iter()
            .filter_map(|node| {
                let Some(layout) = surface.layout(&node) else {
                    debug!(selector = %config.selector, "Step has no layout, skipping");
                    return None;
                };
                let fade_children = surface.query_within(&node, &config.fade_selector);
                Some(Step {
                    node,
                    top: layout.top,
                    fade_children,
                })
            })
            .collect();

        Self {
            steps,
            active: None,
            trigger_offset: config.offset,
            active_class: config.active_class.clone(),
            stagger: Duration::from_millis(config.stagger_ms),
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the active step
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Keep the active step of a tracker this one replaces after a re-scan
    pub fn carry_over(&mut self, previous: &StepTracker<N>) {
        self.active = previous.active.filter(|&index| index < self.steps.len());
    }

    /// Activate the first step if nothing is active yet
    pub fn start<S>(&mut self, surface: &mut S) -> Vec<StepEvent>
    where
        S: RenderSurface<Node = N>,
    {
        if self.steps.is_empty() || self.active.is_some() {
            return Vec::new();
        }
        self.transition(surface, 0)
    }

    /// Move the active step to wherever the trigger line now is
    pub fn advance<S>(&mut self, surface: &mut S, scroll_offset: f64, viewport_height: f64) -> Vec<StepEvent>
    where
        S: RenderSurface<Node = N>,
    {
        if self.steps.is_empty() {
            return Vec::new();
        }
        let trigger = scroll_offset + self.trigger_offset * viewport_height;
        let target = self
            .steps
            .iter()
            .rposition(|step| step.top <= trigger)
            .unwrap_or(0);
        self.transition(surface, target)
    }

    fn transition<S>(&mut self, surface: &mut S, target: usize) -> Vec<StepEvent>
    where
        S: RenderSurface<Node = N>,
    {
        if self.active == Some(target) {
            return Vec::new();
        }

        let direction = match self.active {
            Some(previous) if target < previous => StepDirection::Up,
            _ => StepDirection::Down,
        };

        let mut events = Vec::with_capacity(2);
        if let Some(previous) = self.active {
            self.deactivate(surface, previous);
            events.push(StepEvent::Exit { index: previous, direction });
        }
        self.activate(surface, target);
        events.push(StepEvent::Enter { index: target, direction });
        self.active = Some(target);

        debug!(step = target, ?direction, "Scrollytelling step entered");
        events
    }

    fn activate<S>(&self, surface: &mut S, index: usize)
    where
        S: RenderSurface<Node = N>,
    {
        let step = &self.steps[index];
        surface.commit(&step.node, StyleCommit::class(&self.active_class, true, Duration::ZERO));
        for (i, child) in step.fade_children.iter().enumerate() {
            let delay = self.stagger * i as u32;
            surface.commit(child, StyleCommit::class(&self.active_class, true, delay));
        }
    }

    fn deactivate<S>(&self, surface: &mut S, index: usize)
    where
        S: RenderSurface<Node = N>,
    {
        let step = &self.steps[index];
        surface.commit(&step.node, StyleCommit::class(&self.active_class, false, Duration::ZERO));
        for child in &step.fade_children {
            surface.commit(child, StyleCommit::class(&self.active_class, false, Duration::ZERO));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSurface;

    fn story() -> RecordingSurface {
        let mut surface = RecordingSurface::new(4000.0, 1000.0);
        let s0 = surface.add(".step", 0.0, 1000.0);
        surface.add_child(s0, ".fade-in", 100.0, 50.0);
        surface.add_child(s0, ".fade-in", 200.0, 50.0);
        surface.add(".step", 1000.0, 1000.0);
        surface.add(".step", 2000.0, 1000.0);
        surface
    }

    #[test]
    fn test_start_activates_first_step_with_stagger() {
        let mut surface = story();
        let mut tracker = StepTracker::scan(&surface, &StepsConfig::default());
        assert_eq!(tracker.len(), 3);

        let events = tracker.start(&mut surface);
        assert_eq!(
            events,
            vec![StepEvent::Enter { index: 0, direction: StepDirection::Down }]
        );
        assert_eq!(tracker.active(), Some(0));

        let commits = surface.take_commits();
        assert_eq!(commits.len(), 3);
        assert_eq!(commits[1].1, StyleCommit::class("active", true, Duration::ZERO));
        assert_eq!(commits[2].1, StyleCommit::class("active", true, Duration::from_millis(200)));
    }

    #[test]
    fn test_trigger_line_uses_viewport_offset() {
        let mut surface = story();
        let mut tracker = StepTracker::scan(&surface, &StepsConfig::default());
        tracker.start(&mut surface);

        // trigger = 400 + 500 = 900, still inside step 0
        assert!(tracker.advance(&mut surface, 400.0, 1000.0).is_empty());

        // trigger = 600 + 500 = 1100, crosses into step 1
        let events = tracker.advance(&mut surface, 600.0, 1000.0);
        assert_eq!(
            events,
            vec![
                StepEvent::Exit { index: 0, direction: StepDirection::Down },
                StepEvent::Enter { index: 1, direction: StepDirection::Down },
            ]
        );
    }

    #[test]
    fn test_scrolling_up_deactivates_children() {
        let mut surface = story();
        let mut tracker = StepTracker::scan(&surface, &StepsConfig::default());
        tracker.start(&mut surface);
        tracker.advance(&mut surface, 2000.0, 1000.0);
        assert_eq!(tracker.active(), Some(2));
        surface.take_commits();

        let events = tracker.advance(&mut surface, 0.0, 1000.0);
        assert_eq!(events[0], StepEvent::Exit { index: 2, direction: StepDirection::Up });
        assert_eq!(events[1], StepEvent::Enter { index: 0, direction: StepDirection::Up });

        let disabled = surface
            .take_commits()
            .into_iter()
            .filter(|(_, commit)| matches!(commit, StyleCommit::Class { enabled: false, .. }))
            .count();
        assert_eq!(disabled, 1);
    }

    #[test]
    fn test_carry_over_keeps_active_step() {
        let mut surface = story();
        let mut tracker = StepTracker::scan(&surface, &StepsConfig::default());
        tracker.start(&mut surface);
        tracker.advance(&mut surface, 1600.0, 1000.0);

        let mut rescanned = StepTracker::scan(&surface, &StepsConfig::default());
        rescanned.carry_over(&tracker);
        assert_eq!(rescanned.active(), Some(2));
        assert!(rescanned.start(&mut surface).is_empty());
    }
}
