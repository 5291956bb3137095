use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::effect::{ActiveRange, Blur, EffectKind, Fade};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    /// Optional progress bar driven by scroll percent
    #[serde(default)]
    pub progress: Option<ProgressConfig>,
    /// Optional scrollytelling steps
    #[serde(default)]
    pub steps: Option<StepsConfig>,
    /// Optional reveal-on-scroll classes
    #[serde(default)]
    pub reveal: Option<RevealConfig>,
    /// Selector configuration, one entry per effect
    #[serde(default = "default_bindings")]
    pub bindings: Vec<SelectorConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            engine: EngineConfig::default(),
            progress: None,
            steps: None,
            reveal: None,
            bindings: default_bindings(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Speed multiplier applied to every binding when reduced motion is requested
    #[serde(default = "default_reduced_motion_damping")]
    pub reduced_motion_damping: f64,
    /// Frame interval of the host clock in milliseconds
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,
    /// Quiet period before a resize triggers a re-scan
    #[serde(default = "default_resize_debounce")]
    pub resize_debounce_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reduced_motion_damping: default_reduced_motion_damping(),
            frame_interval_ms: default_frame_interval(),
            resize_debounce_ms: default_resize_debounce(),
        }
    }
}

/// Effect applied to the elements a selector matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectType {
    #[default]
    TranslateVertical,
    TranslateHorizontal,
    Rotate,
    ScaleAndTranslate,
    BackgroundVertical,
}

/// Where a binding's active range comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeSpec {
    /// Explicit bounds in scroll-offset units
    Fixed { lower: f64, upper: f64 },
    /// Derived from the layout of the nearest `container` (or the element
    /// itself): from one viewport above its top to its bottom edge
    Layout {
        #[serde(default)]
        container: Option<String>,
    },
}

/// One selector configuration entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorConfig {
    pub selector: String,
    pub speed_factor: f64,
    #[serde(default)]
    pub effect: EffectType,
    #[serde(default)]
    pub fade: bool,
    #[serde(default)]
    pub blur: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeSpec>,
    /// Added to the speed of each successive match
    #[serde(default, skip_serializing_if = "is_zero")]
    pub speed_step: f64,
    /// Negate the speed of odd-indexed matches
    #[serde(default, skip_serializing_if = "is_false")]
    pub alternate_direction: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_growth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_cap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fade_steepness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fade_floor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_blur: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_factor: Option<f64>,
}

pub const DEFAULT_SCALE_GROWTH: f64 = 0.1;
pub const DEFAULT_SCALE_CAP: f64 = 1.2;
pub const DEFAULT_FADE_STEEPNESS: f64 = 1.5;
pub const DEFAULT_MAX_BLUR: f64 = 2.0;
pub const DEFAULT_DISTANCE_FACTOR: f64 = 1.0;

impl SelectorConfig {
    pub fn new(selector: impl Into<String>, speed_factor: f64) -> Self {
        Self {
            selector: selector.into(),
            speed_factor,
            effect: EffectType::default(),
            fade: false,
            blur: false,
            range: None,
            speed_step: 0.0,
            alternate_direction: false,
            scale_growth: None,
            scale_cap: None,
            fade_steepness: None,
            fade_floor: None,
            max_blur: None,
            distance_factor: None,
        }
    }

    pub fn with_effect(mut self, effect: EffectType) -> Self {
        self.effect = effect;
        self
    }

    pub fn with_fade(mut self) -> Self {
        self.fade = true;
        self
    }

    pub fn with_blur(mut self, max_blur: f64, distance_factor: f64) -> Self {
        self.blur = true;
        self.max_blur = Some(max_blur);
        self.distance_factor = Some(distance_factor);
        self
    }

    pub fn with_range(mut self, range: RangeSpec) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_speed_step(mut self, step: f64, alternate_direction: bool) -> Self {
        self.speed_step = step;
        self.alternate_direction = alternate_direction;
        self
    }

    /// Resolved effect with its scale parameters
    pub fn effect_kind(&self) -> EffectKind {
        match self.effect {
            EffectType::TranslateVertical => EffectKind::TranslateVertical,
            EffectType::TranslateHorizontal => EffectKind::TranslateHorizontal,
            EffectType::Rotate => EffectKind::Rotate,
            EffectType::ScaleAndTranslate => EffectKind::ScaleAndTranslate {
                growth: self.scale_growth.unwrap_or(DEFAULT_SCALE_GROWTH),
                cap: self.scale_cap.unwrap_or(DEFAULT_SCALE_CAP),
            },
            EffectType::BackgroundVertical => EffectKind::BackgroundVertical,
        }
    }

    pub fn fade_params(&self) -> Option<Fade> {
        self.fade.then(|| Fade {
            steepness: self.fade_steepness.unwrap_or(DEFAULT_FADE_STEEPNESS),
            floor: self.fade_floor.unwrap_or(0.0),
        })
    }

    pub fn blur_params(&self) -> Option<Blur> {
        self.blur.then(|| Blur {
            max_blur: self.max_blur.unwrap_or(DEFAULT_MAX_BLUR),
            distance_factor: self.distance_factor.unwrap_or(DEFAULT_DISTANCE_FACTOR),
        })
    }

    /// Fixed range, if one is configured
    pub fn fixed_range(&self) -> Option<ActiveRange> {
        match self.range {
            Some(RangeSpec::Fixed { lower, upper }) => Some(ActiveRange::new(lower, upper)),
            _ => None,
        }
    }

    /// Speed for one matched element.
    ///
    /// `step_index` picks the speed step and `direction_index` the sign when
    /// alternating. Both are the match index unless matches are grouped by a
    /// layout range container, in which case they are the position inside
    /// the container and the container's position on the page.
    pub fn speed_for(&self, step_index: usize, direction_index: usize) -> f64 {
        let speed = self.speed_factor + step_index as f64 * self.speed_step;
        if self.alternate_direction && direction_index % 2 == 1 {
            -speed
        } else {
            speed
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.selector.trim().is_empty() {
            return Err(Error::Configuration("binding has an empty selector".into()));
        }

        let numbers = [
            ("speed_factor", Some(self.speed_factor)),
            ("speed_step", Some(self.speed_step)),
            ("scale_growth", self.scale_growth),
            ("scale_cap", self.scale_cap),
            ("fade_steepness", self.fade_steepness),
            ("fade_floor", self.fade_floor),
            ("max_blur", self.max_blur),
            ("distance_factor", self.distance_factor),
        ];
        for (name, value) in numbers {
            if let Some(value) = value {
                if !value.is_finite() {
                    return Err(Error::Configuration(format!(
                        "{}: {} must be finite, got {}",
                        self.selector, name, value
                    )));
                }
            }
        }

        let non_negative = [
            ("fade_steepness", self.fade_steepness),
            ("max_blur", self.max_blur),
            ("distance_factor", self.distance_factor),
        ];
        for (name, value) in non_negative {
            if matches!(value, Some(v) if v < 0.0) {
                return Err(Error::Configuration(format!(
                    "{}: {} must not be negative",
                    self.selector, name
                )));
            }
        }

        if matches!(self.fade_floor, Some(floor) if !(0.0..=1.0).contains(&floor)) {
            return Err(Error::Configuration(format!(
                "{}: fade_floor must be within [0, 1]",
                self.selector
            )));
        }

        match &self.range {
            Some(RangeSpec::Fixed { lower, upper }) => {
                if !lower.is_finite() || !upper.is_finite() {
                    return Err(Error::Configuration(format!(
                        "{}: range bounds must be finite",
                        self.selector
                    )));
                }
                if lower > upper {
                    return Err(Error::Configuration(format!(
                        "{}: range lower bound {} exceeds upper bound {}",
                        self.selector, lower, upper
                    )));
                }
            }
            Some(RangeSpec::Layout { container: Some(container) }) if container.trim().is_empty() => {
                return Err(Error::Configuration(format!(
                    "{}: range container selector is empty",
                    self.selector
                )));
            }
            _ => {}
        }

        Ok(())
    }
}

/// Progress bar whose width tracks the scroll percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "default_progress_selector")]
    pub selector: String,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            selector: default_progress_selector(),
        }
    }
}

/// Scrollytelling steps activated as they cross a trigger line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepsConfig {
    #[serde(default = "default_step_selector")]
    pub selector: String,
    /// Trigger line as a fraction of the viewport height from its top
    #[serde(default = "default_step_offset")]
    pub offset: f64,
    #[serde(default = "default_active_class")]
    pub active_class: String,
    /// Children of a step revealed one after another when it activates
    #[serde(default = "default_fade_selector")]
    pub fade_selector: String,
    #[serde(default = "default_stagger")]
    pub stagger_ms: u64,
}

impl Default for StepsConfig {
    fn default() -> Self {
        Self {
            selector: default_step_selector(),
            offset: default_step_offset(),
            active_class: default_active_class(),
            fade_selector: default_fade_selector(),
            stagger_ms: default_stagger(),
        }
    }
}

/// Class toggled on elements once enough of them is in view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealConfig {
    #[serde(default = "default_reveal_selector")]
    pub selector: String,
    /// Visible fraction at which an element is shown
    #[serde(default = "default_reveal_threshold")]
    pub threshold: f64,
    #[serde(default = "default_reveal_class")]
    pub class: String,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            selector: default_reveal_selector(),
            threshold: default_reveal_threshold(),
            class: default_reveal_class(),
        }
    }
}

// The star-field scene: layered backgrounds, a fading header, section
// content drifting at increasing speeds and images that grow as they pass.
fn default_bindings() -> Vec<SelectorConfig> {
    let section = || RangeSpec::Layout {
        container: Some("section".to_string()),
    };
    vec![
        SelectorConfig::new(".stars1", 0.1).with_blur(2.0, 1.0),
        SelectorConfig::new(".stars2", -0.2).with_blur(1.0, 0.8),
        SelectorConfig::new(".stars3", 0.15).with_blur(3.0, 1.2),
        SelectorConfig::new(".twinkling", 0.3),
        SelectorConfig::new(".nebula", -0.25).with_blur(4.0, 1.5),
        SelectorConfig::new(".header-content", 0.5).with_fade(),
        SelectorConfig::new("section div", 0.1)
            .with_speed_step(0.1, true)
            .with_range(section()),
        SelectorConfig::new("section img", 0.3)
            .with_effect(EffectType::ScaleAndTranslate)
            .with_range(section()),
    ]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_reduced_motion_damping() -> f64 {
    0.1
}

fn default_frame_interval() -> u64 {
    16 // ~60fps
}

fn default_resize_debounce() -> u64 {
    250
}

fn default_progress_selector() -> String {
    ".progress-fill".to_string()
}

fn default_step_selector() -> String {
    ".step".to_string()
}

fn default_step_offset() -> f64 {
    0.5
}

fn default_active_class() -> String {
    "active".to_string()
}

fn default_fade_selector() -> String {
    ".fade-in".to_string()
}

fn default_stagger() -> u64 {
    200
}

fn default_reveal_selector() -> String {
    ".hidden".to_string()
}

fn default_reveal_threshold() -> f64 {
    0.4
}

fn default_reveal_class() -> String {
    "show".to_string()
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl AppConfig {
    /// Load configuration from the default path or return defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    /// Always ~/.config/scrollfx/config.toml
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("scrollfx")
            .join("config.toml")
    }

    /// Check everything the engine relies on before it scans the page
    pub fn validate(&self) -> Result<()> {
        if self.bindings.is_empty() {
            return Err(Error::Configuration("no bindings configured".into()));
        }
        for binding in &self.bindings {
            binding.validate()?;
        }

        let damping = self.engine.reduced_motion_damping;
        if !damping.is_finite() || !(0.0..=1.0).contains(&damping) {
            return Err(Error::Configuration(format!(
                "reduced_motion_damping must be within [0, 1], got {}",
                damping
            )));
        }

        if let Some(progress) = &self.progress {
            if progress.selector.trim().is_empty() {
                return Err(Error::Configuration("progress selector is empty".into()));
            }
        }

        if let Some(steps) = &self.steps {
            if steps.selector.trim().is_empty() {
                return Err(Error::Configuration("step selector is empty".into()));
            }
            if !(0.0..=1.0).contains(&steps.offset) {
                return Err(Error::Configuration(format!(
                    "step offset must be within [0, 1], got {}",
                    steps.offset
                )));
            }
        }

        if let Some(reveal) = &self.reveal {
            if reveal.selector.trim().is_empty() {
                return Err(Error::Configuration("reveal selector is empty".into()));
            }
            if !(reveal.threshold > 0.0 && reveal.threshold <= 1.0) {
                return Err(Error::Configuration(format!(
                    "reveal threshold must be within (0, 1], got {}",
                    reveal.threshold
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.reduced_motion_damping, 0.1);
        assert_eq!(config.engine.resize_debounce_ms, 250);
        assert_eq!(config.bindings.len(), 8);
    }

    #[test]
    fn test_minimal_toml() {
        let config = AppConfig::from_toml(
            r#"
            [[bindings]]
            selector = ".hero"
            speed_factor = 0.5
            effect = "rotate"
            "#,
        )
        .unwrap();

        assert_eq!(config.bindings.len(), 1);
        assert_eq!(config.bindings[0].effect, EffectType::Rotate);
        assert!(!config.bindings[0].fade);
        assert!(config.steps.is_none());
    }

    #[test]
    fn test_range_spec_toml() {
        let config = AppConfig::from_toml(
            r#"
            [[bindings]]
            selector = ".a"
            speed_factor = 1.0
            range = { kind = "fixed", lower = 100.0, upper = 200.0 }

            [[bindings]]
            selector = ".b"
            speed_factor = 1.0
            range = { kind = "layout", container = "section" }
            "#,
        )
        .unwrap();

        assert_eq!(config.bindings[0].fixed_range(), Some(ActiveRange::new(100.0, 200.0)));
        assert_eq!(
            config.bindings[1].range,
            Some(RangeSpec::Layout { container: Some("section".into()) })
        );
    }

    #[test]
    fn test_toml_roundtrip_keeps_sections() {
        let mut config = AppConfig::default();
        config.steps = Some(StepsConfig::default());
        config.reveal = Some(RevealConfig::default());

        let parsed = AppConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_empty_bindings_rejected() {
        let mut config = AppConfig::default();
        config.bindings.clear();
        config.progress = Some(ProgressConfig::default());
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_non_finite_speed_rejected() {
        let mut config = AppConfig::default();
        config.bindings.push(SelectorConfig::new(".x", f64::NAN));
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));

        config.bindings.pop();
        config.bindings.push(SelectorConfig::new(".x", 1.0).with_blur(f64::INFINITY, 1.0));
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_negative_fade_steepness_rejected() {
        let mut binding = SelectorConfig::new(".header", 0.5).with_fade();
        binding.fade_steepness = Some(-2.0);
        assert!(matches!(binding.validate(), Err(Error::Configuration(_))));

        binding.fade_steepness = Some(0.0);
        assert!(binding.validate().is_ok());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let binding = SelectorConfig::new(".x", 1.0)
            .with_range(RangeSpec::Fixed { lower: 300.0, upper: 100.0 });
        assert!(matches!(binding.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_empty_selector_rejected() {
        assert!(SelectorConfig::new("  ", 1.0).validate().is_err());
    }

    #[test]
    fn test_step_offset_rejected() {
        let mut config = AppConfig::default();
        config.steps = Some(StepsConfig {
            offset: 1.5,
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_speed_for_steps_and_alternates() {
        let binding = SelectorConfig::new("section > div", 0.1).with_speed_step(0.1, true);
        assert_eq!(binding.speed_for(0, 0), 0.1);
        assert!((binding.speed_for(1, 1) + 0.2).abs() < 1e-12);
        assert!((binding.speed_for(2, 2) - 0.3).abs() < 1e-12);
        // Step and sign can come from different indices
        assert!((binding.speed_for(1, 0) - 0.2).abs() < 1e-12);
        assert!((binding.speed_for(0, 3) + 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_parameter_defaults() {
        let binding = SelectorConfig::new(".img", 0.3)
            .with_effect(EffectType::ScaleAndTranslate)
            .with_fade();
        assert_eq!(
            binding.effect_kind(),
            EffectKind::ScaleAndTranslate { growth: 0.1, cap: 1.2 }
        );
        assert_eq!(binding.fade_params(), Some(Fade { steepness: 1.5, floor: 0.0 }));
        assert_eq!(binding.blur_params(), None);
    }
}
