/// The story pipeline: request → template selection → rendering.
///
/// Wires together the template bank, the asset catalog, the semantic
/// mapping table, the selector and the renderer behind one builder-made
/// engine.
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::catalog::{AssetCatalog, CatalogError};
use crate::core::config::{load_mappings, ConfigError, EngineConfig, DEFAULT_OBJECT_COUNT};
use crate::core::renderer::TemplateRenderer;
use crate::core::selector::{SemanticMappings, TemplateSelector};
use crate::schema::asset::{AssetId, StoryObject};
use crate::schema::story::RenderedStory;
use crate::schema::template::{Mood, StoryTemplate, TemplateBank, TemplateError, Theme};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("unknown character: {0}")]
    UnknownCharacter(AssetId),
    #[error("unknown object: {0}")]
    UnknownObject(AssetId),
}

/// What the caller wants a story about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRequest {
    pub mood: Mood,
    pub theme: Theme,
    pub main_character: AssetId,
    #[serde(default)]
    pub side_character: Option<AssetId>,
    /// Objects by position; empty means "draw from the catalog".
    #[serde(default)]
    pub objects: Vec<AssetId>,
    #[serde(default)]
    pub page_count: Option<u32>,
}

impl StoryRequest {
    pub fn new(mood: Mood, theme: Theme, main_character: impl Into<AssetId>) -> Self {
        Self {
            mood,
            theme,
            main_character: main_character.into(),
            side_character: None,
            objects: Vec::new(),
            page_count: None,
        }
    }

    pub fn with_side_character(mut self, id: impl Into<AssetId>) -> Self {
        self.side_character = Some(id.into());
        self
    }

    pub fn with_objects(mut self, ids: &[&str]) -> Self {
        self.objects = ids.iter().map(|&id| AssetId::from(id)).collect();
        self
    }

    pub fn with_page_count(mut self, page_count: u32) -> Self {
        self.page_count = Some(page_count);
        self
    }
}

/// The top-level story engine. Built via `StoryEngine::builder()`.
pub struct StoryEngine {
    templates: TemplateBank,
    catalog: AssetCatalog,
    mappings: SemanticMappings,
    randomization: bool,
    object_count: usize,
    seed: u64,
    generation_count: u64,
}

/// Builder for constructing a `StoryEngine`.
pub struct StoryEngineBuilder {
    templates_path: Option<String>,
    catalog_path: Option<String>,
    mappings_path: Option<String>,
    seed: u64,
    randomization: bool,
    object_count: usize,
    /// Directly provided templates (for testing without files).
    templates: Option<TemplateBank>,
    /// Directly provided catalog (for testing without files).
    catalog: Option<AssetCatalog>,
    /// Directly provided mapping table.
    mappings: Option<SemanticMappings>,
}

impl StoryEngine {
    pub fn builder() -> StoryEngineBuilder {
        StoryEngineBuilder {
            templates_path: None,
            catalog_path: None,
            mappings_path: None,
            seed: 0,
            randomization: true,
            object_count: DEFAULT_OBJECT_COUNT,
            templates: None,
            catalog: None,
            mappings: None,
        }
    }

    /// Render one story for `request`.
    ///
    /// Each call advances the generation counter, so repeated calls with
    /// the same request produce different stories while a fixed seed
    /// reproduces the whole sequence.
    pub fn generate(&mut self, request: &StoryRequest) -> Result<RenderedStory, EngineError> {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(self.generation_count));

        let main = self
            .catalog
            .character(&request.main_character)
            .ok_or_else(|| EngineError::UnknownCharacter(request.main_character.clone()))?;
        let side = match &request.side_character {
            Some(id) => Some(
                self.catalog
                    .character(id)
                    .ok_or_else(|| EngineError::UnknownCharacter(id.clone()))?,
            ),
            None => None,
        };
        let objects = self.resolve_objects(&request.objects, &mut rng)?;

        let selector = TemplateSelector::new(&self.templates, &self.mappings);
        let template = selector.select(request.mood, request.theme, request.page_count, &mut rng);
        tracing::debug!(
            "Generation {}: template '{}', objects [{}]",
            self.generation_count,
            template.id,
            objects
                .iter()
                .map(|o| o.id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let story = TemplateRenderer::new(&self.catalog).render(
            template,
            main,
            side,
            &objects,
            self.randomization,
            &mut rng,
        );
        self.generation_count += 1;
        Ok(story)
    }

    /// Render `count` alternative stories for the same request.
    pub fn generate_variants(
        &mut self,
        request: &StoryRequest,
        count: usize,
    ) -> Result<Vec<RenderedStory>, EngineError> {
        let base = self.generation_count;
        let results: Result<Vec<_>, _> = (0..count)
            .map(|i| {
                // Spread variants far apart in seed space
                self.generation_count = base.wrapping_add(i as u64 * 1000);
                self.generate(request)
            })
            .collect();
        self.generation_count = base.wrapping_add(1);
        results
    }

    /// The template the next `generate` call would start from, without
    /// advancing the engine.
    pub fn select_template(
        &self,
        mood: Mood,
        theme: Theme,
        page_count: Option<u32>,
    ) -> &StoryTemplate {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(self.generation_count));
        TemplateSelector::new(&self.templates, &self.mappings).select(mood, theme, page_count, &mut rng)
    }

    fn resolve_objects(
        &self,
        ids: &[AssetId],
        rng: &mut StdRng,
    ) -> Result<Vec<StoryObject>, EngineError> {
        if ids.is_empty() {
            return Ok(self
                .catalog
                .random_objects(self.object_count, rng)
                .into_iter()
                .cloned()
                .collect());
        }
        ids.iter()
            .map(|id| {
                self.catalog
                    .object(id)
                    .cloned()
                    .ok_or_else(|| EngineError::UnknownObject(id.clone()))
            })
            .collect()
    }

    pub fn templates(&self) -> &TemplateBank {
        &self.templates
    }

    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    pub fn mappings(&self) -> &SemanticMappings {
        &self.mappings
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn generation_count(&self) -> u64 {
        self.generation_count
    }

    pub fn randomization(&self) -> bool {
        self.randomization
    }

    pub fn set_randomization(&mut self, enabled: bool) {
        self.randomization = enabled;
    }
}

impl StoryEngineBuilder {
    /// Start from a config file's settings. Later builder calls override.
    pub fn from_config(mut self, config: &EngineConfig) -> Self {
        self.templates_path = config.templates_path.clone();
        self.catalog_path = config.catalog_path.clone();
        self.mappings_path = config.mappings_path.clone();
        self.seed = config.seed;
        self.randomization = config.randomization;
        self.object_count = config.object_count;
        self
    }

    pub fn templates_path(mut self, path: &str) -> Self {
        self.templates_path = Some(path.to_string());
        self
    }

    pub fn catalog_path(mut self, path: &str) -> Self {
        self.catalog_path = Some(path.to_string());
        self
    }

    pub fn mappings_path(mut self, path: &str) -> Self {
        self.mappings_path = Some(path.to_string());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn randomization(mut self, enabled: bool) -> Self {
        self.randomization = enabled;
        self
    }

    pub fn object_count(mut self, count: usize) -> Self {
        self.object_count = count;
        self
    }

    /// Provide templates directly (for testing without files).
    pub fn with_templates(mut self, templates: TemplateBank) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Provide a catalog directly (for testing without files).
    pub fn with_catalog(mut self, catalog: AssetCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Provide a mapping table directly.
    pub fn with_mappings(mut self, mappings: SemanticMappings) -> Self {
        self.mappings = Some(mappings);
        self
    }

    pub fn build(self) -> Result<StoryEngine, EngineError> {
        let templates = match (self.templates, &self.templates_path) {
            (Some(templates), _) => templates,
            (None, Some(path)) => TemplateBank::load(Path::new(path))?,
            (None, None) => TemplateBank::builtin()?,
        };

        let catalog = match (self.catalog, &self.catalog_path) {
            (Some(catalog), _) => catalog,
            (None, Some(path)) => AssetCatalog::load_from_ron(Path::new(path))?,
            (None, None) => AssetCatalog::builtin(),
        };

        let mappings = match (self.mappings, &self.mappings_path) {
            (Some(mappings), _) => mappings,
            (None, Some(path)) => load_mappings(Path::new(path))?,
            (None, None) => SemanticMappings::default(),
        };

        for template in templates.templates() {
            if let Some(count) = template.page_count {
                if count as usize != template.pages.len() {
                    tracing::warn!(
                        "Template '{}' declares {} pages but has {}",
                        template.id,
                        count,
                        template.pages.len()
                    );
                }
            }
        }

        Ok(StoryEngine {
            templates,
            catalog,
            mappings,
            randomization: self.randomization,
            object_count: self.object_count,
            seed: self.seed,
            generation_count: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::template::TemplatePage;

    fn small_bank() -> TemplateBank {
        TemplateBank::new(
            "test",
            vec![StoryTemplate::new(
                "silly_birthday_1",
                Mood::Silly,
                Theme::Birthday,
                "{{MAIN_CHARACTER}}'s Party",
            )
            .with_page(TemplatePage::new(
                1,
                "{{MAIN_CHARACTER}} brought {{A_OBJECT_1}} and {{A_OBJECT_2}}.",
                &["{{MAIN_CHARACTER}}", "{{OBJECT_1}}", "{{OBJECT_2}}"],
            ))],
        )
        .unwrap()
    }

    fn engine(seed: u64) -> StoryEngine {
        StoryEngine::builder()
            .seed(seed)
            .with_templates(small_bank())
            .build()
            .unwrap()
    }

    #[test]
    fn builds_with_builtin_data() {
        let engine = StoryEngine::builder().build().unwrap();
        assert!(!engine.templates().is_empty());
        assert_eq!(engine.catalog().characters().len(), 4);
        assert!(!engine.mappings().is_empty());
        assert!(engine.randomization());
    }

    #[test]
    fn named_objects_in_order() {
        let mut engine = engine(1);
        let request = StoryRequest::new(Mood::Silly, Theme::Birthday, "MR_DOG")
            .with_side_character("MS_COW")
            .with_objects(&["CAKE", "BALLOON"]);
        let story = engine.generate(&request).unwrap();
        assert_eq!(story.title, "Mr. Dog's Party");
        assert_eq!(story.pages[0].text, "Mr. Dog brought a cake and a balloon.");
        assert_eq!(
            story.pages[0].images,
            vec![
                AssetId::from("MR_DOG"),
                AssetId::from("CAKE"),
                AssetId::from("BALLOON")
            ]
        );
        assert_eq!(engine.generation_count(), 1);
    }

    #[test]
    fn default_object_pool() {
        let mut engine = engine(5);
        let request = StoryRequest::new(Mood::Silly, Theme::Birthday, "SIR_WHISKERS");
        let story = engine.generate(&request).unwrap();
        // Character plus two drawn objects
        assert_eq!(story.pages[0].images.len(), 3);
        assert!(!story.pages[0].text.contains("{{"));
    }

    #[test]
    fn unknown_ids_are_errors() {
        let mut engine = engine(0);
        let request = StoryRequest::new(Mood::Silly, Theme::Birthday, "MR_FOX");
        assert!(matches!(
            engine.generate(&request),
            Err(EngineError::UnknownCharacter(id)) if id.as_str() == "MR_FOX"
        ));

        let request =
            StoryRequest::new(Mood::Silly, Theme::Birthday, "MR_DOG").with_objects(&["KITE"]);
        assert!(matches!(
            engine.generate(&request),
            Err(EngineError::UnknownObject(_))
        ));
        assert_eq!(engine.generation_count(), 0);
    }

    #[test]
    fn same_seed_same_sequence() {
        let request = StoryRequest::new(Mood::Adventure, Theme::Adventure, "PROFESSOR_SEAL");
        let mut a = StoryEngine::builder().seed(42).build().unwrap();
        let mut b = StoryEngine::builder().seed(42).build().unwrap();
        for _ in 0..5 {
            assert_eq!(a.generate(&request).unwrap(), b.generate(&request).unwrap());
        }
    }

    #[test]
    fn variants_count_and_counter() {
        let mut engine = engine(9);
        let request = StoryRequest::new(Mood::Silly, Theme::Birthday, "MR_DOG");
        let variants = engine.generate_variants(&request, 4).unwrap();
        assert_eq!(variants.len(), 4);
        assert_eq!(engine.generation_count(), 1);
    }

    #[test]
    fn from_config_applies_settings() {
        let config = EngineConfig {
            seed: 11,
            randomization: false,
            object_count: 1,
            ..EngineConfig::default()
        };
        let engine = StoryEngine::builder()
            .from_config(&config)
            .with_templates(small_bank())
            .build()
            .unwrap();
        assert_eq!(engine.seed(), 11);
        assert!(!engine.randomization());
    }

    #[test]
    fn missing_template_file() {
        let result = StoryEngine::builder()
            .templates_path("does/not/exist.json")
            .build();
        assert!(matches!(
            result,
            Err(EngineError::Template(TemplateError::Io(_)))
        ));
    }

    #[test]
    fn failed_variants_still_advance_by_one() {
        let mut engine = engine(0);
        let request = StoryRequest::new(Mood::Silly, Theme::Birthday, "MR_FOX");
        assert!(engine.generate_variants(&request, 3).is_err());
        assert_eq!(engine.generation_count(), 1);

        let request = StoryRequest::new(Mood::Silly, Theme::Birthday, "MR_DOG");
        engine.generate_variants(&request, 3).unwrap();
        assert_eq!(engine.generation_count(), 2);
    }

    #[test]
    fn select_template_does_not_advance() {
        let engine = engine(0);
        let template = engine.select_template(Mood::Courage, Theme::Learning, None);
        assert_eq!(template.id, "silly_birthday_1");
        assert_eq!(engine.generation_count(), 0);
    }
}
