//! Transform values committed to render targets

use std::fmt;

/// A composed transform, rendered with CSS transform-function syntax
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Vertical shift in px
    TranslateY(f64),
    /// Horizontal shift in px
    TranslateX(f64),
    /// Rotation in degrees
    Rotate(f64),
    /// Vertical shift in px followed by a uniform scale
    TranslateYScale { offset: f64, scale: f64 },
}

impl Transform {
    /// Vertical shift component, zero for transforms without one
    pub fn vertical_offset(&self) -> f64 {
        match self {
            Self::TranslateY(offset) | Self::TranslateYScale { offset, .. } => *offset,
            Self::TranslateX(_) | Self::Rotate(_) => 0.0,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TranslateY(offset) => write!(f, "translateY({}px)", offset),
            Self::TranslateX(offset) => write!(f, "translateX({}px)", offset),
            Self::Rotate(degrees) => write!(f, "rotate({}deg)", degrees),
            Self::TranslateYScale { offset, scale } => {
                write!(f, "translateY({}px) scale({})", offset, scale)
            }
        }
    }
}
