use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunables for the bill pipeline. Every field has a default, so an empty
/// file (or no file at all) is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub recognition: RecognitionConfig,
    pub redaction: RedactionConfig,
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Tesseract language code.
    pub language: String,
    /// Directory containing `tessdata`; `None` uses the system default.
    pub data_path: Option<String>,
    /// Contrast multiplier applied around the mean luminance.
    pub contrast_factor: f32,
    /// Longest edge fed to the text pass; larger images are downscaled.
    pub max_dimension: u32,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            data_path: None,
            contrast_factor: 2.0,
            max_dimension: 2800,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionConfig {
    /// Pixels added on every side of a word box before occluding it.
    pub padding: u32,
    pub blur_sigma: f32,
    /// Shortest all-digit word that is occluded even without a PII match.
    pub min_digit_run: usize,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self { padding: 5, blur_sigma: 10.0, min_digit_run: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl PipelineConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg = PipelineConfig::from_toml("").unwrap();
        assert_eq!(cfg, PipelineConfig::default());
        assert_eq!(cfg.redaction.padding, 5);
        assert_eq!(cfg.recognition.contrast_factor, 2.0);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg = PipelineConfig::from_toml("[redaction]\npadding = 8\n").unwrap();
        assert_eq!(cfg.redaction.padding, 8);
        assert_eq!(cfg.redaction.min_digit_run, 4);
        assert_eq!(cfg.fetch.timeout_secs, 30);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = PipelineConfig::from_toml("[redaction\npadding = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("billshield.toml");
        std::fs::write(&path, "[recognition]\nlanguage = \"spa\"\n").unwrap();
        let cfg = PipelineConfig::load(&path).unwrap();
        assert_eq!(cfg.recognition.language, "spa");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = PipelineConfig::load(Path::new("/nonexistent/billshield.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
