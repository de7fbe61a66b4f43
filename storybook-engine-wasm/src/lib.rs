//! WASM bindings for storybook-engine: powers the web story-book shell.

use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

use storybook_engine::core::pipeline::{StoryEngine, StoryRequest};
use storybook_engine::schema::asset::AssetId;
use storybook_engine::schema::spark::StorySpark;
use storybook_engine::schema::template::{Mood, Theme};

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Deserialize)]
struct StoryInput {
    mood: String,
    theme: Option<String>,
    spark: Option<String>,
    main_character: String,
    side_character: Option<String>,
    #[serde(default)]
    objects: Vec<String>,
    page_count: Option<u32>,
}

#[derive(serde::Serialize)]
struct CharacterInfo {
    id: String,
    name: String,
    pronouns: String,
    description: String,
    signature_phrases: String,
}

#[derive(serde::Serialize)]
struct ObjectInfo {
    id: String,
    name: String,
    with_article: String,
    description: String,
}

#[derive(serde::Serialize)]
struct LabelInfo {
    id: String,
    label: String,
    description: String,
}

#[wasm_bindgen]
pub struct StorybookDemo {
    engine: StoryEngine,
    seed: u64,
}

#[wasm_bindgen]
impl StorybookDemo {
    /// Create a demo instance over the built-in templates and catalog.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Result<StorybookDemo, JsError> {
        let engine = StoryEngine::builder()
            .seed(seed)
            .build()
            .map_err(|e| JsError::new(&format!("Engine build error: {e}")))?;
        Ok(StorybookDemo { engine, seed })
    }

    /// Render a story described by a JSON string. Returns the story as JSON.
    ///
    /// Expected JSON shape:
    /// ```json
    /// {
    ///   "mood": "kindness",
    ///   "theme": "friendship",
    ///   "main_character": "MR_DOG",
    ///   "side_character": "MS_COW",
    ///   "objects": ["APPLE", "BOOK"],
    ///   "page_count": 5
    /// }
    /// ```
    /// `"spark": "treasure_hunt"` may stand in for `theme`.
    pub fn generate(&mut self, request_json: &str) -> Result<String, JsError> {
        let request = self.parse_request(request_json)?;
        let story = self
            .engine
            .generate(&request)
            .map_err(|e| JsError::new(&format!("Generation error: {e}")))?;
        serde_json::to_string(&story)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Render several alternative stories. Returns a JSON array of stories.
    pub fn generate_variants(&mut self, request_json: &str, count: usize) -> Result<String, JsError> {
        let request = self.parse_request(request_json)?;
        let stories = self
            .engine
            .generate_variants(&request, count)
            .map_err(|e| JsError::new(&format!("Generation error: {e}")))?;
        serde_json::to_string(&stories)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    pub fn set_randomization(&mut self, enabled: bool) {
        self.engine.set_randomization(enabled);
    }

    /// Return JSON array of moods with descriptions.
    pub fn moods() -> String {
        let moods: Vec<LabelInfo> = Mood::ALL
            .iter()
            .map(|m| LabelInfo {
                id: m.name().to_lowercase(),
                label: m.name().to_string(),
                description: m.description().to_string(),
            })
            .collect();
        serde_json::to_string(&moods).unwrap_or_else(|_| "[]".to_string())
    }

    /// Return JSON array of themes with descriptions.
    pub fn themes() -> String {
        let themes: Vec<LabelInfo> = Theme::ALL
            .iter()
            .map(|t| LabelInfo {
                id: t.name().to_lowercase(),
                label: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect();
        serde_json::to_string(&themes).unwrap_or_else(|_| "[]".to_string())
    }

    /// Return JSON array of story sparks.
    pub fn sparks() -> String {
        let sparks: Vec<LabelInfo> = StorySpark::ALL
            .iter()
            .map(|s| LabelInfo {
                id: format!("{s:?}"),
                label: s.label().to_string(),
                description: String::new(),
            })
            .collect();
        serde_json::to_string(&sparks).unwrap_or_else(|_| "[]".to_string())
    }

    /// Return JSON array of the catalog's characters.
    pub fn characters(&self) -> String {
        let characters: Vec<CharacterInfo> = self
            .engine
            .catalog()
            .characters()
            .iter()
            .map(|c| CharacterInfo {
                id: c.id.to_string(),
                name: c.display_name.clone(),
                pronouns: c.pronouns.label(),
                description: c.description.clone(),
                signature_phrases: c.voice.signature_phrases(),
            })
            .collect();
        serde_json::to_string(&characters).unwrap_or_else(|_| "[]".to_string())
    }

    /// Return JSON array of the catalog's objects.
    pub fn objects(&self) -> String {
        let objects: Vec<ObjectInfo> = self
            .engine
            .catalog()
            .objects()
            .iter()
            .map(|o| ObjectInfo {
                id: o.id.to_string(),
                name: o.display_name.clone(),
                with_article: o.display_name_with_article.clone(),
                description: o.description.clone(),
            })
            .collect();
        serde_json::to_string(&objects).unwrap_or_else(|_| "[]".to_string())
    }

    /// Reset the engine with a new seed.
    pub fn reset(&mut self, seed: u64) -> Result<(), JsError> {
        let randomization = self.engine.randomization();
        self.engine = StoryEngine::builder()
            .seed(seed)
            .randomization(randomization)
            .build()
            .map_err(|e| JsError::new(&format!("Engine build error: {e}")))?;
        self.seed = seed;
        Ok(())
    }
}

impl StorybookDemo {
    fn parse_request(&self, request_json: &str) -> Result<StoryRequest, JsError> {
        let input: StoryInput = serde_json::from_str(request_json)
            .map_err(|e| JsError::new(&format!("Invalid request JSON: {e}")))?;

        let mood: Mood = input
            .mood
            .parse()
            .map_err(|e: String| JsError::new(&e))?;
        let theme = match (&input.theme, &input.spark) {
            (Some(theme), _) => theme.parse().map_err(|e: String| JsError::new(&e))?,
            (None, Some(spark)) => {
                let spark = StorySpark::parse(spark)
                    .ok_or_else(|| JsError::new(&format!("Unknown spark: {spark}")))?;
                let mut rng =
                    StdRng::seed_from_u64(self.seed.wrapping_add(self.engine.generation_count()));
                spark.theme(&mut rng)
            }
            (None, None) => return Err(JsError::new("Request needs a theme or a spark")),
        };

        Ok(StoryRequest {
            mood,
            theme,
            main_character: AssetId::from(input.main_character),
            side_character: input.side_character.map(AssetId::from),
            objects: input.objects.into_iter().map(AssetId::from).collect(),
            page_count: input.page_count,
        })
    }
}
