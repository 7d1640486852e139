//! Configuration types for the Trellis engine and its SVG export.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML file; every section and field falls back to its default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining engine and style settings.
//! - [`EngineConfig`] - Controls how the update coordinator steps passes.
//! - [`StyleConfig`] - Controls colors and strokes used when exporting a scene.
//!
//! # Example
//!
//! ```
//! # use trellis::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.engine().max_depth(), 64);
//! assert!(config.style().background_color().is_ok());
//! ```

use serde::Deserialize;

use trellis_core::color::Color;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Engine configuration section.
    #[serde(default)]
    engine: EngineConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified engine and style configurations.
    pub fn new(engine: EngineConfig, style: StyleConfig) -> Self {
        Self { engine, style }
    }

    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Stepping limits of the update coordinator.
///
/// # Default Values
///
/// | Property | Default |
/// |----------|---------|
/// | `steps_per_tick` | `0` (unbounded) |
/// | `max_depth` | `64` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    steps_per_tick: usize,
    max_depth: usize,
}

impl EngineConfig {
    pub fn new(steps_per_tick: usize, max_depth: usize) -> Self {
        Self {
            steps_per_tick,
            max_depth,
        }
    }

    /// Maximum child boundaries crossed per `tick`; `0` runs every active
    /// pass to completion.
    pub fn steps_per_tick(&self) -> usize {
        self.steps_per_tick
    }

    /// Deepest chain of nested layout nodes a single pass descends into.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            steps_per_tick: 0,
            max_depth: 64,
        }
    }
}

/// Visual styling used by the SVG exporter.
///
/// Colors are kept as strings and parsed on access, so an invalid color is
/// reported when it is used rather than when the file is loaded.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    background_color: Option<String>,
    fill_color: String,
    stroke_color: String,
    stroke_width: f32,
    corner_radius: f32,
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }

    /// Fill of elements that do not set their own.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn fill_color(&self) -> Result<Color, String> {
        Color::new(&self.fill_color).map_err(|err| format!("Invalid fill color in config: {err}"))
    }

    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn stroke_color(&self) -> Result<Color, String> {
        Color::new(&self.stroke_color)
            .map_err(|err| format!("Invalid stroke color in config: {err}"))
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    /// Corner radius of elements that do not set their own.
    pub fn corner_radius(&self) -> f32 {
        self.corner_radius
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background_color: None,
            fill_color: "white".to_string(),
            stroke_color: "black".to_string(),
            stroke_width: 1.0,
            corner_radius: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.engine().steps_per_tick(), 0);
        assert_eq!(config.engine().max_depth(), 64);
        assert!(matches!(config.style().background_color(), Ok(None)));
        assert!(config.style().fill_color().is_ok());
        assert_approx_eq!(f32, config.style().stroke_width(), 1.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r##"
            [engine]
            steps_per_tick = 8

            [style]
            background_color = "#202020"
            corner_radius = 6.0
            "##,
        )
        .unwrap();

        assert_eq!(config.engine().steps_per_tick(), 8);
        assert_eq!(config.engine().max_depth(), 64);
        assert!(matches!(config.style().background_color(), Ok(Some(_))));
        assert_approx_eq!(f32, config.style().corner_radius(), 6.0);
        assert_approx_eq!(f32, config.style().stroke_width(), 1.0);
    }

    #[test]
    fn test_invalid_color_is_reported_on_access() {
        let config: AppConfig = toml::from_str(
            r#"
            [style]
            stroke_color = "not-a-color"
            "#,
        )
        .unwrap();

        let err = config.style().stroke_color().unwrap_err();
        assert!(err.contains("Invalid stroke color"));
    }
}
