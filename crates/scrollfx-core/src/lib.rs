pub mod config;
pub mod effect;
pub mod engine;
pub mod error;
pub mod host;
pub mod story;

pub use config::{AppConfig, EngineConfig, RangeSpec, SelectorConfig};
pub use effect::{Binding, EffectKind, Transform};
pub use engine::{EngineState, ScrollEffectEngine};
pub use error::{Error, Result};
pub use host::{DocumentGeometry, FrameScheduler, MotionPreference, NodeLayout, RenderSurface, StyleCommit};

#[cfg(test)]
pub(crate) mod testing;
