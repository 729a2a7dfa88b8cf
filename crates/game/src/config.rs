//! Simulation configuration and TOML loading.

use std::path::{Path, PathBuf};

use parkour_physics::{ConfigError, MovementConfig};
use parkour_world::{CheckpointConfig, GeneratorConfig, StreamingConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What happens to the world when the traveler dies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetMode {
    /// Teleport to the respawn point and keep the streamed world.
    #[default]
    Soft,
    /// Dispose every chunk, regenerate from the start and respawn at the
    /// default spawn.
    Hard,
}

/// Everything needed to build a [`crate::Simulation`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub movement: MovementConfig,
    pub generator: GeneratorConfig,
    pub streaming: StreamingConfig,
    pub checkpoint: CheckpointConfig,
    pub reset_mode: ResetMode,
}

/// Errors that can occur when loading a configuration file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

impl SimulationConfig {
    /// Defaults for a movement tuning, with generator limits derived from it.
    pub fn for_movement(movement: MovementConfig) -> Self {
        Self {
            generator: GeneratorConfig::for_movement(&movement),
            movement,
            ..Default::default()
        }
    }

    /// Low gravity preset.
    pub fn floaty() -> Self {
        Self::for_movement(MovementConfig::floaty())
    }

    /// Heavy, snappy preset.
    pub fn tight() -> Self {
        Self::for_movement(MovementConfig::tight())
    }

    /// Same configuration with a different world seed.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.generator.seed = seed;
        self
    }

    /// Load and validate a TOML file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content, path)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, LoadError> {
        Self::parse(content, Path::new("<inline>"))
    }

    fn parse(content: &str, path: &Path) -> Result<Self, LoadError> {
        let config: Self = toml::from_str(content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Validate every section and their consistency with each other.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.movement.validate()?;
        self.generator.validate()?;
        self.generator.validate_reach(&self.movement)?;
        self.streaming.validate()?;
        self.checkpoint.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
        assert!(SimulationConfig::floaty().validate().is_ok());
        assert!(SimulationConfig::tight().validate().is_ok());
        assert_eq!(SimulationConfig::default().reset_mode, ResetMode::Soft);
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml = r#"
            reset_mode = "hard"

            [movement]
            jump_force = 11.0

            [generator]
            seed = 99
            chunk_length = 60.0

            [checkpoint]
            default_spawn = [0.0, 1.0, 0.0]
        "#;
        let config = SimulationConfig::from_toml_str(toml).unwrap();

        assert_eq!(config.reset_mode, ResetMode::Hard);
        assert_eq!(config.movement.jump_force, 11.0);
        assert_eq!(config.movement.gravity, MovementConfig::default().gravity);
        assert_eq!(config.generator.seed, 99);
        assert_eq!(config.generator.chunk_length, 60.0);
        assert_eq!(config.checkpoint.default_spawn.y, 1.0);
    }

    #[test]
    fn test_parse_error() {
        let err = SimulationConfig::from_toml_str("movement = 3").unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let toml = r#"
            [movement]
            gravity = -5.0
        "#;
        let err = SimulationConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, LoadError::Invalid(_)));
        assert!(err.to_string().contains("gravity"));
    }

    #[test]
    fn test_unreachable_gaps_rejected() {
        let toml = r#"
            [generator]
            max_edge_gap = 40.0
        "#;
        assert!(SimulationConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = SimulationConfig::load("/nonexistent/parkour.toml").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
