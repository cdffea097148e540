//! Configuration loading and validation for Weaver.
//!
//! Loads a `weaver.toml` with environment variable overrides. Every field has
//! a default, so a missing file or an empty table is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaverConfig {
    /// Namescope handling
    #[serde(default)]
    pub namescope: NamescopeConfig,

    /// Assignment extraction
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Structural limits
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Diagnostics output
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// What namescope a supplied root instance gets when its type is a
/// namescope boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootScopePolicy {
    /// Open a new namescope owned by the supplied instance.
    #[default]
    Fresh,
    /// Reuse the scope the instance already belongs to in the build context.
    Inherit,
}

impl std::str::FromStr for RootScopePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fresh" => Ok(Self::Fresh),
            "inherit" => Ok(Self::Inherit),
            other => Err(ConfigError::ValidationError(format!(
                "unknown root namescope policy '{other}' (expected 'fresh' or 'inherit')"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamescopeConfig {
    #[serde(default)]
    pub root_instance_policy: RootScopePolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Attribute that names a node instead of assigning a member.
    #[serde(default = "default_name_directive")]
    pub name_directive: String,

    /// Trim literal text. Whitespace-only text is always dropped.
    #[serde(default = "default_true")]
    pub ignore_whitespace_text: bool,
}

fn default_name_directive() -> String {
    "Name".into()
}
fn default_true() -> bool {
    true
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            name_directive: default_name_directive(),
            ignore_whitespace_text: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum frame nesting depth of one build.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    256
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Emit a `trace!` event for every executed instruction.
    #[serde(default)]
    pub trace_instructions: bool,
}

impl WeaverConfig {
    /// Load configuration from `./weaver.toml`, then apply environment
    /// overrides:
    /// - `WEAVER_MAX_DEPTH`
    /// - `WEAVER_ROOT_NAMESCOPE` (`fresh` or `inherit`)
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::default_path())?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `WEAVER_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(depth) = lookup("WEAVER_MAX_DEPTH") {
            self.limits.max_depth = depth.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("WEAVER_MAX_DEPTH is not a number: '{depth}'"))
            })?;
        }

        if let Some(policy) = lookup("WEAVER_ROOT_NAMESCOPE") {
            self.namescope.root_instance_policy = policy.parse()?;
        }

        self.validate()
    }

    /// Default configuration file location.
    pub fn default_path() -> PathBuf {
        PathBuf::from("weaver.toml")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_depth < 2 {
            return Err(ConfigError::ValidationError(
                "limits.max_depth must be at least 2".into(),
            ));
        }

        let directive = self.extraction.name_directive.trim();
        if directive.is_empty() || directive.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(
                "extraction.name_directive must be a non-empty identifier".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = WeaverConfig::default();
        assert_eq!(config.namescope.root_instance_policy, RootScopePolicy::Fresh);
        assert_eq!(config.extraction.name_directive, "Name");
        assert!(config.extraction.ignore_whitespace_text);
        assert_eq!(config.limits.max_depth, 256);
        assert!(!config.diagnostics.trace_instructions);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = WeaverConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: WeaverConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_tables_fill_defaults() {
        let config = WeaverConfig::from_toml_str(
            r#"
            [namescope]
            root_instance_policy = "inherit"

            [limits]
            max_depth = 16
            "#,
        )
        .unwrap();
        assert_eq!(config.namescope.root_instance_policy, RootScopePolicy::Inherit);
        assert_eq!(config.limits.max_depth, 16);
        assert_eq!(config.extraction.name_directive, "Name");
    }

    #[test]
    fn invalid_depth_rejected() {
        let config = WeaverConfig {
            limits: LimitsConfig { max_depth: 1 },
            ..WeaverConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        let err = WeaverConfig::from_toml_str("[namescope]\nroot_instance_policy = \"global\"")
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = WeaverConfig::load_from(Path::new("/nonexistent/weaver.toml"));
        assert_eq!(result.unwrap(), WeaverConfig::default());
    }

    #[test]
    fn load_from_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[diagnostics]\ntrace_instructions = true").unwrap();
        let config = WeaverConfig::load_from(file.path()).unwrap();
        assert!(config.diagnostics.trace_instructions);
    }

    #[test]
    fn malformed_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[limits\nmax_depth = ").unwrap();
        let err = WeaverConfig::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn overrides_apply_and_validate() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("WEAVER_MAX_DEPTH", "12"), ("WEAVER_ROOT_NAMESCOPE", "Inherit")]);
        let mut config = WeaverConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.limits.max_depth, 12);
        assert_eq!(config.namescope.root_instance_policy, RootScopePolicy::Inherit);

        let mut config = WeaverConfig::default();
        let err = config
            .apply_overrides(|key| (key == "WEAVER_MAX_DEPTH").then(|| "deep".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = WeaverConfig::default_toml();
        assert!(toml_str.contains("root_instance_policy = \"fresh\""));
        assert!(toml_str.contains("max_depth = 256"));
    }
}
