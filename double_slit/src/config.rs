//! Engine tunables
//!
//! Defaults reproduce the reference animation: a 500 x 300 scene ticking
//! every 50 ms with three particle streams.

use crate::error::ConfigError;
use crate::layout::PARTICLE_TRAVEL;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Scene and animation parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Logical surface width
    pub width: f32,
    /// Logical surface height
    pub height: f32,
    /// Delay between ticks in milliseconds
    pub tick_interval_ms: u64,
    /// Upper bound on ticks produced by a single `advance` call
    pub max_catch_up_ticks: u32,
    /// Number of particle streams in detector mode
    pub particle_count: u32,
    /// Horizontal particle speed in surface units per frame
    pub particle_speed: f32,
    /// Completed passes per stream that keep their impact dot
    pub impact_history: u32,
    /// Fringe spatial frequency
    pub fringe_k: f32,
    /// Fringe drift per frame
    pub fringe_omega: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 300.0,
            tick_interval_ms: 50,
            max_catch_up_ticks: 5,
            particle_count: 3,
            particle_speed: 6.0,
            impact_history: 8,
            fringe_k: 0.1,
            fringe_omega: 0.2,
        }
    }
}

impl SceneConfig {
    /// Read and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        log::info!("Loaded scene config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite_size = self.width.is_finite() && self.height.is_finite();
        if !(finite_size && self.width > 0.0 && self.height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "surface size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be at least 1".into()));
        }
        if self.max_catch_up_ticks == 0 {
            return Err(ConfigError::Invalid("max_catch_up_ticks must be at least 1".into()));
        }
        // A particle must advance, and may not skip a whole pass in one frame
        if !(self.particle_speed > 0.0 && self.particle_speed <= PARTICLE_TRAVEL) {
            return Err(ConfigError::Invalid(format!(
                "particle_speed must be in (0, {}], got {}",
                PARTICLE_TRAVEL, self.particle_speed
            )));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SceneConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_interval(), Duration::from_millis(50));
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config = SceneConfig::from_toml("particle_count = 5\nfringe_k = 0.25\n").unwrap();
        assert_eq!(config.particle_count, 5);
        assert_eq!(config.fringe_k, 0.25);
        assert_eq!(config.tick_interval_ms, 50);
        assert_eq!(config.width, 500.0);
    }

    #[test]
    fn zero_interval_rejected() {
        let err = SceneConfig::from_toml("tick_interval_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn negative_speed_rejected() {
        let err = SceneConfig::from_toml("particle_speed = -1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn speed_outside_travel_span_rejected() {
        for speed in ["inf", "nan", "401.0", "0.0"] {
            let err = SceneConfig::from_toml(&format!("particle_speed = {speed}")).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "accepted {speed}");
        }
        assert!(SceneConfig::from_toml("particle_speed = 1e-38").is_ok());
        assert!(SceneConfig::from_toml("particle_speed = 400.0").is_ok());
    }

    #[test]
    fn infinite_size_rejected() {
        let err = SceneConfig::from_toml("width = inf").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = SceneConfig::from_toml("width = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = SceneConfig::load("/nonexistent/double_slit.toml").unwrap_err();
        match err {
            ConfigError::Io { path, .. } => assert!(path.ends_with("double_slit.toml")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
