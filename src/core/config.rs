/// Engine configuration file, loaded from RON.
///
/// ```ron
/// (
///     templates_path: Some("story_data/story_templates.json"),
///     catalog_path: None,
///     mappings_path: Some("story_data/mappings.ron"),
///     seed: 42,
///     randomization: true,
///     object_count: 2,
/// )
/// ```
///
/// Every field is optional; missing paths fall back to the built-in data.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::selector::{MappingEntry, SemanticMappings};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Objects drawn per story when a request names none.
pub const DEFAULT_OBJECT_COUNT: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Template document, `.json` or `.ron`.
    pub templates_path: Option<String>,
    /// Asset catalog in RON.
    pub catalog_path: Option<String>,
    /// Semantic mapping table in RON; replaces the built-in table.
    pub mappings_path: Option<String>,
    pub seed: u64,
    pub randomization: bool,
    pub object_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            templates_path: None,
            catalog_path: None,
            mappings_path: None,
            seed: 0,
            randomization: true,
            object_count: DEFAULT_OBJECT_COUNT,
        }
    }
}

impl EngineConfig {
    pub fn parse_ron(input: &str) -> Result<EngineConfig, ConfigError> {
        Ok(ron::from_str(input)?)
    }

    pub fn load_from_ron(path: &Path) -> Result<EngineConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }
}

/// Parse a mapping table: a RON list of `(from: (mood, theme), to: (mood, theme))`.
pub fn parse_mappings(input: &str) -> Result<SemanticMappings, ConfigError> {
    let entries: Vec<MappingEntry> = ron::from_str(input)?;
    Ok(SemanticMappings::from_entries(entries))
}

pub fn load_mappings(path: &Path) -> Result<SemanticMappings, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let mappings = parse_mappings(&contents)?;
    tracing::info!("Loaded {} semantic mappings", mappings.len());
    Ok(mappings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::template::{Mood, Theme};

    #[test]
    fn empty_document_uses_defaults() {
        let config = EngineConfig::parse_ron("()").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(config.randomization);
        assert_eq!(config.object_count, 2);
    }

    #[test]
    fn partial_document() {
        let config = EngineConfig::parse_ron(
            r#"(seed: 7, randomization: false, catalog_path: Some("cast.ron"))"#,
        )
        .unwrap();
        assert_eq!(config.seed, 7);
        assert!(!config.randomization);
        assert_eq!(config.catalog_path.as_deref(), Some("cast.ron"));
        assert_eq!(config.templates_path, None);
        assert_eq!(config.object_count, DEFAULT_OBJECT_COUNT);
    }

    #[test]
    fn malformed_document() {
        assert!(matches!(
            EngineConfig::parse_ron("(seed: \"seven\")"),
            Err(ConfigError::Ron(_))
        ));
    }

    #[test]
    fn missing_file() {
        let result = EngineConfig::load_from_ron(Path::new("does/not/exist.ron"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn mapping_document() {
        let mappings = parse_mappings(
            "[(from: (mood: Courage, theme: Birthday), to: (mood: Silly, theme: Birthday))]",
        )
        .unwrap();
        assert_eq!(mappings.len(), 1);
        assert!(mappings.get(Mood::Courage, Theme::Birthday).is_some());
        assert!(mappings.get(Mood::Courage, Theme::Friendship).is_none());
    }
}
