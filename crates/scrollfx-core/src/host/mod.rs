//! Host ports: everything the engine needs from the page it runs in.
//!
//! The engine never touches a real document. It talks to a [`RenderSurface`]
//! for element lookup, layout and style writes, to a [`FrameScheduler`] for
//! once-per-refresh callbacks, and to a [`MotionPreference`] sampled once at
//! startup.

mod debounce;

use std::fmt;
use std::time::Duration;

use crate::effect::Transform;

pub use debounce::Debounce;

/// Document and viewport heights in scroll-offset units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DocumentGeometry {
    pub document_height: f64,
    pub viewport_height: f64,
}

impl DocumentGeometry {
    pub fn new(document_height: f64, viewport_height: f64) -> Self {
        Self {
            document_height,
            viewport_height,
        }
    }

    /// Distance the page can actually scroll. Zero or negative on short pages.
    #[inline]
    pub fn scrollable_range(&self) -> f64 {
        self.document_height - self.viewport_height
    }
}

/// Vertical placement of a node within the document
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeLayout {
    pub top: f64,
    pub height: f64,
}

impl NodeLayout {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// A single style write produced by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum StyleCommit {
    Transform(Transform),
    /// Background offset in px
    BackgroundPositionY { px: f64 },
    /// Opacity in [0, 1]
    Opacity { value: f64 },
    /// Blur radius in px
    Blur { px: f64 },
    /// Width as a percentage of the container
    Width { percent: f64 },
    /// Add or remove a class, optionally after a delay
    Class {
        name: String,
        enabled: bool,
        delay: Duration,
    },
}

impl StyleCommit {
    /// CSS property this commit writes
    pub fn css_property(&self) -> &'static str {
        match self {
            Self::Transform(_) => "transform",
            Self::BackgroundPositionY { .. } => "background-position-y",
            Self::Opacity { .. } => "opacity",
            Self::Blur { .. } => "filter",
            Self::Width { .. } => "width",
            Self::Class { .. } => "class",
        }
    }

    pub fn opacity(value: f64) -> Self {
        Self::Opacity { value }
    }

    pub fn blur(px: f64) -> Self {
        Self::Blur { px }
    }

    pub fn width(percent: f64) -> Self {
        Self::Width { percent }
    }

    pub fn class(name: impl Into<String>, enabled: bool, delay: Duration) -> Self {
        Self::Class {
            name: name.into(),
            enabled,
            delay,
        }
    }
}

/// CSS value. Classes render as `+name` / `-name`.
impl fmt::Display for StyleCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transform(transform) => write!(f, "{}", transform),
            Self::BackgroundPositionY { px } => write!(f, "{}px", px),
            Self::Opacity { value } => write!(f, "{}", value),
            Self::Blur { px } => write!(f, "blur({}px)", px),
            Self::Width { percent } => write!(f, "{}%", percent),
            Self::Class { name, enabled, delay } => {
                let sign = if *enabled { '+' } else { '-' };
                if delay.is_zero() {
                    write!(f, "{}{}", sign, name)
                } else {
                    write!(f, "{}{} after {}ms", sign, name, delay.as_millis())
                }
            }
        }
    }
}

/// The page the engine reads layout from and writes styles to.
///
/// `Node` is an opaque handle owned by the host; the engine only keeps copies
/// of it and never assumes the node is still attached.
pub trait RenderSurface {
    type Node: Clone + PartialEq + fmt::Debug;

    /// All nodes matching `selector`, in document order
    fn query_all(&self, selector: &str) -> Vec<Self::Node>;

    /// Descendants of `node` matching `selector`, in document order
    fn query_within(&self, node: &Self::Node, selector: &str) -> Vec<Self::Node>;

    /// Nearest node matching `selector`, starting with `node` itself
    fn closest(&self, node: &Self::Node, selector: &str) -> Option<Self::Node>;

    /// Current layout of `node`, if it is laid out at all
    fn layout(&self, node: &Self::Node) -> Option<NodeLayout>;

    fn geometry(&self) -> DocumentGeometry;

    fn commit(&mut self, node: &Self::Node, style: StyleCommit);
}

/// Once-per-refresh callback request.
///
/// The engine calls `request_frame` at most once between two recomputes; the
/// host answers by calling `ScrollEffectEngine::recompute` on its next frame.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Host accessibility preference, read once when the engine starts
pub trait MotionPreference {
    fn prefers_reduced_motion(&self) -> bool;
}

impl MotionPreference for bool {
    fn prefers_reduced_motion(&self) -> bool {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrollable_range() {
        assert_eq!(DocumentGeometry::new(3000.0, 800.0).scrollable_range(), 2200.0);
        assert!(DocumentGeometry::new(600.0, 800.0).scrollable_range() < 0.0);
    }

    #[test]
    fn test_commit_css_values() {
        assert_eq!(StyleCommit::opacity(0.25).to_string(), "0.25");
        assert_eq!(StyleCommit::blur(1.5).to_string(), "blur(1.5px)");
        assert_eq!(StyleCommit::blur(1.5).css_property(), "filter");
        assert_eq!(StyleCommit::width(40.0).to_string(), "40%");
        assert_eq!(
            StyleCommit::class("active", true, Duration::from_millis(400)).to_string(),
            "+active after 400ms"
        );
        assert_eq!(StyleCommit::class("show", false, Duration::ZERO).to_string(), "-show");
    }
}
