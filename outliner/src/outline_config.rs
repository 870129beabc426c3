//! Outliner configuration from outliner.toml

use crate::outline_model::TitlePolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "outliner.toml";

/// Notice appended to the outline text when the stream breaks off
pub const DEFAULT_ERROR_NOTICE: &str = "\n\n[错误：连接中断，请重试]";

/// Main configuration from outliner.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlinerConfig {
    /// Scanner settings
    pub scanner: ScannerConfig,

    /// Outline tree settings
    pub outline: OutlineConfig,

    /// Stream session settings
    pub stream: StreamConfig,

    /// Paper request settings
    pub paper: PaperConfig,
}

/// Scanner settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Bytes skipped at the start of the stream before matching begins
    pub initial_offset: usize,
}

/// Outline tree settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Resolution of repeated `# ` title lines
    pub title_policy: TitlePolicy,
}

/// Stream session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Text appended to the outline when the connection fails
    pub error_notice: String,

    /// Characters per chunk when replaying transcripts
    pub replay_chunk_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            error_notice: DEFAULT_ERROR_NOTICE.to_string(),
            replay_chunk_size: 16,
        }
    }
}

/// Paper request settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperConfig {
    /// Prefix of the serialized outline sent with the paper request
    pub request_prefix: String,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            request_prefix: "大纲为".to_string(),
        }
    }
}

impl OutlinerConfig {
    /// Load configuration from an outliner.toml file
    ///
    /// # Parameters
    /// * `path` - Path to the outliner.toml configuration file
    ///
    /// # Returns
    /// * `Ok(OutlinerConfig)` - Successfully loaded configuration
    /// * `Err(ConfigError)` - Error reading or parsing the configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path).map_err(ConfigError::IoError)?;

        let config: OutlinerConfig = toml::from_str(&content).map_err(ConfigError::ParseError)?;

        Ok(config)
    }

    /// Load `path` when given, else `outliner.toml` if present, else defaults
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(CONFIG_FILE_NAME).is_file() => {
                log::info!("Using {}", CONFIG_FILE_NAME);
                Self::load(CONFIG_FILE_NAME)
            }
            None => Ok(Self::default()),
        }
    }

    /// Save configuration to an outliner.toml file
    ///
    /// # Parameters
    /// * `path` - Path where the outliner.toml file will be written
    ///
    /// # Returns
    /// * `Ok(())` - Successfully saved configuration
    /// * `Err(ConfigError)` - Error serializing or writing the configuration file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::SerializeError)?;

        fs::write(&path, content).map_err(ConfigError::IoError)?;

        Ok(())
    }
}

/// Errors that can occur when loading or saving configuration
#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum ConfigError {
    /// IO error when reading or writing file
    IoError(std::io::Error),

    /// Error parsing TOML
    ParseError(toml::de::Error),

    /// Error serializing to TOML
    SerializeError(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "TOML parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "TOML serialize error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
