/// Mutable engine state for the lifetime of one page
#[derive(Debug, Clone, PartialEq)]
pub struct EngineState {
    /// Most recent scroll offset; intermediate values are overwritten
    pub last_scroll_offset: f64,
    /// Set between a frame request and the recompute that answers it
    pub frame_scheduled: bool,
    /// Reduced-motion preference sampled at initialization
    pub reduced_motion: bool,
    /// Whether the page is visible; hidden pages never request frames
    pub visible: bool,
    /// Completed recomputes
    pub frames: u64,
}

impl EngineState {
    pub fn new(reduced_motion: bool) -> Self {
        Self {
            last_scroll_offset: 0.0,
            frame_scheduled: false,
            reduced_motion,
            visible: true,
            frames: 0,
        }
    }
}
