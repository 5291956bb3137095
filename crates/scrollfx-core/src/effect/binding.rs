//! Bindings: one render target plus the effect parameters applied to it

use crate::host::StyleCommit;

use super::transform::Transform;

/// Degrees of rotation per px of offset
pub const ROTATION_PER_OFFSET: f64 = 0.1;

/// How a binding's scroll offset is turned into motion
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectKind {
    TranslateVertical,
    TranslateHorizontal,
    Rotate,
    /// Vertical shift plus a scale of `min(1 + percent * growth, cap)`
    ScaleAndTranslate { growth: f64, cap: f64 },
    /// Shift the background image instead of the element
    BackgroundVertical,
}

impl EffectKind {
    /// Style commit for a binding shifted by `offset` at `percent` through the page
    pub fn style(&self, offset: f64, percent: f64) -> StyleCommit {
        match *self {
            Self::TranslateVertical => StyleCommit::Transform(Transform::TranslateY(offset)),
            Self::TranslateHorizontal => StyleCommit::Transform(Transform::TranslateX(offset)),
            Self::Rotate => StyleCommit::Transform(Transform::Rotate(offset * ROTATION_PER_OFFSET)),
            Self::ScaleAndTranslate { growth, cap } => {
                let scale = (1.0 + percent * growth).min(cap);
                StyleCommit::Transform(Transform::TranslateYScale { offset, scale })
            }
            Self::BackgroundVertical => StyleCommit::BackgroundPositionY { px: offset },
        }
    }
}

/// Fade-out as the page scrolls: `max(floor, 1 - percent * steepness)`, kept in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    pub steepness: f64,
    pub floor: f64,
}

impl Fade {
    #[inline]
    pub fn opacity(&self, percent: f64) -> f64 {
        (1.0 - percent * self.steepness).max(self.floor).clamp(0.0, 1.0)
    }
}

/// Depth-of-field blur: `min(max_blur * percent * distance_factor, max_blur)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blur {
    pub max_blur: f64,
    pub distance_factor: f64,
}

impl Blur {
    #[inline]
    pub fn radius(&self, percent: f64) -> f64 {
        (self.max_blur * percent * self.distance_factor).min(self.max_blur)
    }
}

/// Inclusive scroll-offset window in which a binding is updated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveRange {
    pub lower: f64,
    pub upper: f64,
}

impl ActiveRange {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    #[inline]
    pub fn contains(&self, offset: f64) -> bool {
        offset >= self.lower && offset <= self.upper
    }
}

/// One element and its effect configuration.
///
/// `target` is a copy of the host's handle; the host keeps ownership of the
/// node itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding<N> {
    pub target: N,
    pub speed_factor: f64,
    pub effect: EffectKind,
    pub fade: Option<Fade>,
    pub blur: Option<Blur>,
    pub active_range: Option<ActiveRange>,
}

impl<N> Binding<N> {
    pub fn new(target: N, speed_factor: f64, effect: EffectKind) -> Self {
        Self {
            target,
            speed_factor,
            effect,
            fade: None,
            blur: None,
            active_range: None,
        }
    }

    pub fn with_fade(mut self, fade: Fade) -> Self {
        self.fade = Some(fade);
        self
    }

    pub fn with_blur(mut self, blur: Blur) -> Self {
        self.blur = Some(blur);
        self
    }

    pub fn with_active_range(mut self, range: ActiveRange) -> Self {
        self.active_range = Some(range);
        self
    }

    /// Whether this binding is updated at `scroll_offset`.
    /// Bindings outside their range keep whatever was last committed.
    #[inline]
    pub fn is_active_at(&self, scroll_offset: f64) -> bool {
        self.active_range
            .map_or(true, |range| range.contains(scroll_offset))
    }

    /// Style commits for one scroll snapshot, in commit order
    pub fn styles(&self, scroll_offset: f64, percent: f64) -> Vec<StyleCommit> {
        let offset = scroll_offset * self.speed_factor;
        let mut styles = Vec::with_capacity(3);
        styles.push(self.effect.style(offset, percent));

        if let Some(fade) = self.fade {
            styles.push(StyleCommit::opacity(fade.opacity(percent)));
        }
        if let Some(blur) = self.blur {
            styles.push(StyleCommit::blur(blur.radius(percent)));
        }
        styles
    }
}
