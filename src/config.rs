use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::classify::EfMode;

/// Names of the source-table columns the loader reads.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ColumnConfig {
    #[serde(default = "ColumnConfig::default_id")]
    pub id: String,
    #[serde(default = "ColumnConfig::default_text")]
    pub text: String,
    /// Column holding previously extracted mentions. Only read by
    /// `reclassify`; `None` means mentions are produced by pattern matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentions: Option<String>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            id: Self::default_id(),
            text: Self::default_text(),
            mentions: None,
        }
    }
}

impl ColumnConfig {
    fn default_id() -> String {
        "ID".to_string()
    }

    fn default_text() -> String {
        "NOTE_TEXT".to_string()
    }

    /// Column layout of a dataset written by this tool.
    pub fn saved_dataset() -> Self {
        Self {
            id: Self::default_id(),
            text: "NOTE_CLEAN".to_string(),
            mentions: Some("MENTIONS".to_string()),
        }
    }
}

/// Pipeline settings, read from an optional JSON file and then overridden by
/// command-line flags.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default = "PipelineConfig::default_patterns")]
    pub patterns: PathBuf,
    #[serde(default)]
    pub columns: ColumnConfig,
    #[serde(default = "PipelineConfig::default_output")]
    pub output: PathBuf,
    /// Drop records without any mention before classification.
    #[serde(default)]
    pub drop_unmatched: bool,
    /// Keep only records whose clean text mentions this ejection fraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_ef: Option<EfMode>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            patterns: Self::default_patterns(),
            columns: ColumnConfig::default(),
            output: Self::default_output(),
            drop_unmatched: false,
            require_ef: None,
        }
    }
}

impl PipelineConfig {
    fn default_patterns() -> PathBuf {
        PathBuf::from("patterns.json")
    }

    fn default_output() -> PathBuf {
        PathBuf::from("dataset.csv")
    }

    /// Read a config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        log::debug!("loaded config from {}: {config:?}", path.display());
        Ok(config)
    }

    /// Config file contents if a path is given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.columns.id, "ID");
        assert_eq!(config.columns.text, "NOTE_TEXT");
        assert_eq!(config.output, PathBuf::from("dataset.csv"));
    }

    #[test]
    fn partial_override() {
        let config: PipelineConfig = serde_json::from_str(
            r#"{"columns": {"text": "REPORT"}, "require_ef": "left", "drop_unmatched": true}"#,
        )
        .unwrap();
        assert_eq!(config.columns.id, "ID");
        assert_eq!(config.columns.text, "REPORT");
        assert_eq!(config.require_ef, Some(EfMode::Left));
        assert!(config.drop_unmatched);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_json::from_str::<PipelineConfig>(r#"{"patern": "x.json"}"#).is_err());
    }

    #[test]
    fn load_reports_path() {
        let err = PipelineConfig::load(Path::new("/nonexistent/ef.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/ef.json"));
    }
}
