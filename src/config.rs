// Configuration module for the bracket pool
// Supports YAML configuration files for scoring and entry validation settings

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::scoring::ScoringConfig;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub tie_breaker: TieBreakerSettings,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            bail!("config file not found: {}", path);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path))?;

        serde_yaml::from_str(&content).with_context(|| format!("failed to parse config file {}", path))
    }

    /// Load configuration from file if it exists, otherwise use defaults
    pub fn load_or_default(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::from_file(p).unwrap_or_else(|e| {
                log::warn!("{:#}", e);
                log::warn!("using default configuration");
                Self::default()
            }),
            None => {
                // Try default locations
                for default_path in &["config.yaml", "config.yml", ".bracket-pool.yaml"] {
                    if Path::new(default_path).exists() {
                        match Self::from_file(default_path) {
                            Ok(config) => {
                                log::info!("loaded configuration from {}", default_path);
                                return config;
                            }
                            Err(e) => log::warn!("{:#}", e),
                        }
                    }
                }
                Self::default()
            }
        }
    }

    /// Save configuration to a YAML file
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("failed to serialize config")?;

        fs::write(path, yaml).with_context(|| format!("failed to write config file {}", path))?;

        Ok(())
    }

    pub fn to_scoring_config(&self) -> ScoringConfig {
        ScoringConfig {
            round_points: self.scoring.round_points,
            underdog_bonus: self.scoring.underdog_bonus,
        }
    }
}

/// Scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringSettings {
    /// Points awarded for a correct pick in each round [R64, R32, S16, E8, F4, Championship]
    #[serde(default = "default_round_points")]
    pub round_points: [u32; 6],

    /// Extra points when a correctly picked winner was seeded worse than the team it beat
    #[serde(default = "default_underdog_bonus")]
    pub underdog_bonus: u32,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        ScoringSettings {
            round_points: default_round_points(),
            underdog_bonus: default_underdog_bonus(),
        }
    }
}

fn default_round_points() -> [u32; 6] {
    [1, 2, 4, 8, 12, 16]
}

fn default_underdog_bonus() -> u32 {
    2
}

/// Accepted range for the championship combined-score guess
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TieBreakerSettings {
    #[serde(default = "default_tie_breaker_min")]
    pub min: u32,
    #[serde(default = "default_tie_breaker_max")]
    pub max: u32,
}

impl Default for TieBreakerSettings {
    fn default() -> Self {
        TieBreakerSettings {
            min: default_tie_breaker_min(),
            max: default_tie_breaker_max(),
        }
    }
}

impl TieBreakerSettings {
    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

fn default_tie_breaker_min() -> u32 {
    50
}

fn default_tie_breaker_max() -> u32 {
    500
}

/// Generate a sample configuration file
pub fn generate_sample_config() -> String {
    r#"# Bracket Pool Configuration
# All values shown are defaults - uncomment and modify as needed

# Scoring configuration
scoring:
  # Points per correct pick [R64, R32, Sweet16, Elite8, Final4, Championship]
  round_points: [1, 2, 4, 8, 12, 16]
  # Bonus for a correct pick whose seed is numerically higher than the team it beat
  underdog_bonus: 2

# Tie breaker (guess at the combined championship score)
tie_breaker:
  min: 50
  max: 500
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scoring.round_points, [1, 2, 4, 8, 12, 16]);
        assert_eq!(config.scoring.underdog_bonus, 2);
        assert_eq!(config.tie_breaker.min, 50);
        assert_eq!(config.tie_breaker.max, 500);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
scoring:
  underdog_bonus: 0
tie_breaker:
  max: 300
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.scoring.underdog_bonus, 0);
        assert_eq!(config.tie_breaker.max, 300);
        // Defaults should still work
        assert_eq!(config.scoring.round_points, [1, 2, 4, 8, 12, 16]);
        assert_eq!(config.tie_breaker.min, 50);
    }

    #[test]
    fn test_sample_config_parses_to_defaults() {
        let config: Config = serde_yaml::from_str(&generate_sample_config()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.yaml");
        let path = path.to_str().unwrap();
        let mut config = Config::default();
        config.scoring.round_points = [1, 2, 3, 5, 8, 13];
        config.save_to_file(path).unwrap();
        assert_eq!(Config::from_file(path).unwrap(), config);
        assert_eq!(Config::load_or_default(Some(path)), config);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        assert!(Config::from_file("/definitely/not/here.yaml").is_err());
        assert_eq!(Config::load_or_default(Some("/definitely/not/here.yaml")), Config::default());
    }

    #[test]
    fn test_scoring_config_conversion() {
        let scoring = Config::default().to_scoring_config();
        assert_eq!(scoring, ScoringConfig::default());
        assert!(TieBreakerSettings::default().contains(50));
        assert!(TieBreakerSettings::default().contains(500));
        assert!(!TieBreakerSettings::default().contains(49));
    }
}
