//! Scroll-to-style mapping
//!
//! ## Atoms
//! - `math` - Pure scroll math (scroll percent, viewport overlap)
//! - `transform` - Transform values and their CSS rendering
//!
//! ## Molecules
//! - `binding` - One element plus its effect parameters, producing the
//!   style commits for a given scroll snapshot

pub mod math;
pub mod transform;

pub mod binding;

pub use binding::{ActiveRange, Binding, Blur, EffectKind, Fade};
pub use math::{scroll_percent, visible_fraction};
pub use transform::Transform;
