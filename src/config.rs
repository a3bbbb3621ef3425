use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::llm::{AnthropicConfig, SamplingConfig};
use crate::runner::LoopConfig;
use crate::sanitize::InjectionPolicy;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub llm: LlmConfig,
    pub generation: GenerationConfig,
    pub sanitizer: SanitizerConfig,
    pub tokens: TokensConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 4096,
            temperature: 0.2,
            timeout_ms: 120000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub max_iterations: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { max_iterations: 3 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SanitizerConfig {
    pub policy: InjectionPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TokensConfig {
    /// Path to the design-token JSON document; the embedded default set is
    /// used when unset
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Sampling parameters for the generator
    pub fn sampling(&self) -> SamplingConfig {
        SamplingConfig {
            temperature: self.llm.temperature,
            max_tokens: self.llm.max_tokens,
        }
    }

    /// Provider client configuration
    pub fn anthropic(&self) -> AnthropicConfig {
        AnthropicConfig {
            model: self.llm.model.clone(),
            timeout: Duration::from_millis(self.llm.timeout_ms),
        }
    }

    /// Loop ceiling configuration
    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            max_iterations: self.generation.max_iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.llm.model, "claude-sonnet-4-20250514");
        assert_eq!(config.generation.max_iterations, 3);
        assert_eq!(config.sanitizer.policy, InjectionPolicy::Flag);
        assert!(config.tokens.path.is_none());
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_low_randomness_sampling() {
        let config = Config::default();
        let sampling = config.sampling();
        assert!(sampling.temperature <= 0.3);
        assert_eq!(sampling.max_tokens, 4096);
    }

    #[test]
    fn test_partial_yaml_overrides() {
        let yaml = r#"
generation:
  max_iterations: 5
sanitizer:
  policy: reject
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.generation.max_iterations, 5);
        assert_eq!(config.sanitizer.policy, InjectionPolicy::Reject);
        // Untouched sections keep their defaults
        assert_eq!(config.llm.max_tokens, 4096);
    }

    #[test]
    fn test_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("architect.yml");
        fs::write(&path, "llm:\n  model: claude-3-haiku-20240307\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.llm.model, "claude-3-haiku-20240307");
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let path = PathBuf::from("/nonexistent/architect.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_anthropic_config_mapping() {
        let config = Config::default();
        let anthropic = config.anthropic();
        assert_eq!(anthropic.model, config.llm.model);
        assert_eq!(anthropic.timeout, Duration::from_millis(120000));
    }
}
