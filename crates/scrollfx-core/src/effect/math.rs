//! Pure scroll math shared by bindings and trackers

use crate::host::{DocumentGeometry, NodeLayout};

/// Normalize a scroll offset to [0, 1] over the scrollable range.
///
/// Pages no taller than the viewport have nothing to scroll and always map to
/// exactly 0. Never returns NaN or infinity, even for non-finite offsets.
#[inline]
pub fn scroll_percent(offset: f64, geometry: DocumentGeometry) -> f64 {
    let range = geometry.scrollable_range();
    if !(range > 0.0) || offset.is_nan() {
        return 0.0;
    }
    (offset / range).clamp(0.0, 1.0)
}

/// Fraction of `layout` inside the viewport `[offset, offset + viewport_height]`.
///
/// Zero-height nodes count as invisible.
#[inline]
pub fn visible_fraction(layout: NodeLayout, offset: f64, viewport_height: f64) -> f64 {
    if !(layout.height > 0.0) {
        return 0.0;
    }
    let start = layout.top.max(offset);
    let end = layout.bottom().min(offset + viewport_height);
    ((end - start) / layout.height).clamp(0.0, 1.0)
}
