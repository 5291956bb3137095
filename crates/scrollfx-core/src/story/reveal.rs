use std::time::Duration;

use tracing::debug;

use crate::config::RevealConfig;
use crate::effect::visible_fraction;
use crate::host::{NodeLayout, RenderSurface, StyleCommit};

#[derive(Debug, Clone)]
struct RevealItem<N> {
    node: N,
    layout: NodeLayout,
    shown: Option<bool>,
}

/// Toggles a class on elements as they enter and leave the viewport.
///
/// An element is shown while at least `threshold` of its height is visible
/// and hidden again once it drops below, in either scroll direction. Only
/// state changes are committed.
#[derive(Debug, Clone)]
pub struct RevealTracker<N> {
    items: Vec<RevealItem<N>>,
    threshold: f64,
    class: String,
}

impl<N: Clone> RevealTracker<N> {
    pub fn scan<S>(surface: &S, config: &RevealConfig) -> Self
    where
        S: RenderSurface<Node = N>,
    {
        let items = surface
            .query_all(&config.selector)
            .into_iter()
            .filter_map(|node| match surface.layout(&node) {
                Some(layout) => Some(RevealItem {
                    node,
                    layout,
                    shown: None,
                }),
                None => {
                    debug!(selector = %config.selector, "Reveal target has no layout, skipping");
                    None
                }
            })
            .collect();

        Self {
            items,
            threshold: config.threshold,
            class: config.class.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of elements currently shown
    pub fn shown(&self) -> usize {
        self.items.iter().filter(|item| item.shown == Some(true)).count()
    }

    /// Re-evaluate every element; returns how many changed state
    pub fn update<S>(&mut self, surface: &mut S, scroll_offset: f64, viewport_height: f64) -> usize
    where
        S: RenderSurface<Node = N>,
    {
        let mut changed = 0;
        for item in &mut self.items {
            let visible = visible_fraction(item.layout, scroll_offset, viewport_height) >= self.threshold;
            if item.shown == Some(visible) {
                continue;
            }
            item.shown = Some(visible);
            surface.commit(&item.node, StyleCommit::class(&self.class, visible, Duration::ZERO));
            changed += 1;
        }
        changed
    }
}
