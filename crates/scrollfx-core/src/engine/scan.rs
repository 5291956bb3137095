//! Building bindings from the selector configuration

use tracing::debug;

use crate::config::{AppConfig, RangeSpec, SelectorConfig};
use crate::effect::{ActiveRange, Binding};
use crate::host::RenderSurface;

/// Resolve every selector against the surface.
///
/// Selectors matching nothing are dropped. When `reduced_motion` is set every
/// speed is scaled by the configured damping. With a layout range container,
/// speed steps restart in each container and alternation follows the
/// container's position among all containers on the page.
pub fn scan_bindings<S>(surface: &S, config: &AppConfig, reduced_motion: bool) -> Vec<Binding<S::Node>>
where
    S: RenderSurface,
{
    let damping = if reduced_motion {
        config.engine.reduced_motion_damping
    } else {
        1.0
    };

    let mut bindings = Vec::new();
    for entry in &config.bindings {
        let nodes = surface.query_all(&entry.selector);
        if nodes.is_empty() {
            debug!(selector = %entry.selector, "Selector matched no elements, dropping binding");
            continue;
        }

        let containers = match &entry.range {
            Some(RangeSpec::Layout {
                container: Some(container),
            }) => surface.query_all(container),
            _ => Vec::new(),
        };
        let mut per_container = vec![0usize; containers.len()];

        for (index, node) in nodes.into_iter().enumerate() {
            let (step_index, direction_index) = match container_index(surface, entry, &containers, &node) {
                Some(group) => {
                    let step = per_container[group];
                    per_container[group] += 1;
                    (step, group)
                }
                None => (index, index),
            };

            let active_range = resolve_range(surface, entry, &node);
            let speed = entry.speed_for(step_index, direction_index) * damping;
            let mut binding = Binding::new(node, speed, entry.effect_kind());
            binding.fade = entry.fade_params();
            binding.blur = entry.blur_params();
            binding.active_range = active_range;
            bindings.push(binding);
        }
    }
    bindings
}

/// Position of the node's nearest container among all `containers`
fn container_index<S>(surface: &S, entry: &SelectorConfig, containers: &[S::Node], node: &S::Node) -> Option<usize>
where
    S: RenderSurface,
{
    let Some(RangeSpec::Layout {
        container: Some(selector),
    }) = &entry.range
    else {
        return None;
    };
    let anchor = surface.closest(node, selector)?;
    containers.iter().position(|candidate| *candidate == anchor)
}

/// Active range for one matched node.
///
/// Layout ranges run from one viewport above the container's top edge to its
/// bottom edge, so the element starts moving as the container scrolls in.
fn resolve_range<S>(surface: &S, entry: &SelectorConfig, node: &S::Node) -> Option<ActiveRange>
where
    S: RenderSurface,
{
    match &entry.range {
        None => None,
        Some(RangeSpec::Fixed { lower, upper }) => Some(ActiveRange::new(*lower, *upper)),
        Some(RangeSpec::Layout { container }) => {
            let anchor = container
                .as_deref()
                .and_then(|selector| surface.closest(node, selector))
                .unwrap_or_else(|| node.clone());
            let Some(layout) = surface.layout(&anchor) else {
                debug!(selector = %entry.selector, "No layout for range anchor, binding stays always active");
                return None;
            };
            let viewport = surface.geometry().viewport_height;
            Some(ActiveRange::new(layout.top - viewport, layout.bottom()))
        }
    }
}
