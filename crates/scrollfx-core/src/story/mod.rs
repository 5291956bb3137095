//! Scroll-position storytelling: steps that activate as they cross a trigger
//! line, and elements revealed once enough of them is in view.

mod reveal;
mod steps;

pub use reveal::RevealTracker;
pub use steps::{StepDirection, StepEvent, StepTracker};
