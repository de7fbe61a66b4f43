use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("template bank contains no templates")]
    EmptyBank,
    #[error("duplicate template id: {0}")]
    DuplicateTemplateId(String),
    #[error("unsupported template document format: {0}")]
    UnsupportedFormat(String),
}

/// Emotional register of a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Mood {
    #[serde(alias = "fantasy")]
    Fantasy,
    #[serde(alias = "silly")]
    Silly,
    #[serde(alias = "learning")]
    Learning,
    #[serde(alias = "courage")]
    Courage,
    #[serde(alias = "friendship")]
    Friendship,
    #[serde(alias = "adventure")]
    Adventure,
    #[serde(alias = "mystery")]
    Mystery,
    #[serde(alias = "kindness")]
    Kindness,
}

impl Mood {
    pub const ALL: [Mood; 8] = [
        Self::Fantasy,
        Self::Silly,
        Self::Learning,
        Self::Courage,
        Self::Friendship,
        Self::Adventure,
        Self::Mystery,
        Self::Kindness,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fantasy => "Fantasy",
            Self::Silly => "Silly",
            Self::Learning => "Learning",
            Self::Courage => "Courage",
            Self::Friendship => "Friendship",
            Self::Adventure => "Adventure",
            Self::Mystery => "Mystery",
            Self::Kindness => "Kindness",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Fantasy => "Magical and imaginative with wonder and enchantment",
            Self::Silly => "Fun and playful with lots of laughs and surprises",
            Self::Learning => "Educational and curious about discovering new things",
            Self::Courage => "Brave and bold about facing challenges",
            Self::Friendship => "Warm and heartfelt about friendship and togetherness",
            Self::Adventure => "Exciting and action-packed with exploration",
            Self::Mystery => "Curious and engaging with puzzles to solve",
            Self::Kindness => "Gentle and caring about helping others",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown mood '{s}'"))
    }
}

/// Occasion or subject focus of a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Theme {
    #[serde(alias = "birthday")]
    Birthday,
    #[serde(alias = "adventure")]
    Adventure,
    #[serde(alias = "friendship")]
    Friendship,
    #[serde(alias = "mystery")]
    Mystery,
    #[serde(alias = "learning")]
    Learning,
    #[serde(alias = "celebration")]
    Celebration,
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Self::Birthday,
        Self::Adventure,
        Self::Friendship,
        Self::Mystery,
        Self::Learning,
        Self::Celebration,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Birthday => "Birthday",
            Self::Adventure => "Adventure",
            Self::Friendship => "Friendship",
            Self::Mystery => "Mystery",
            Self::Learning => "Learning",
            Self::Celebration => "Celebration",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Birthday => "Birthday parties and celebrations",
            Self::Adventure => "Exciting journeys and exploration",
            Self::Friendship => "Stories about friends helping each other",
            Self::Mystery => "Solving puzzles and uncovering secrets",
            Self::Learning => "Discovering new things and learning",
            Self::Celebration => "Special occasions and festivities",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown theme '{s}'"))
    }
}

/// One page of a story template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePage {
    /// 1-based.
    pub page_number: u32,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text_variants: Vec<String>,
    #[serde(default)]
    pub suggested_images: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_variants: Vec<Vec<String>>,
}

impl TemplatePage {
    pub fn new(page_number: u32, text: impl Into<String>, suggested_images: &[&str]) -> Self {
        Self {
            page_number,
            text: text.into(),
            text_variants: Vec::new(),
            suggested_images: suggested_images.iter().map(|s| s.to_string()).collect(),
            image_variants: Vec::new(),
        }
    }
}

/// A parameterized story skeleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryTemplate {
    pub id: String,
    pub mood: Mood,
    pub theme: Theme,
    /// Fixed page count, when the template declares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub title_variants: Vec<String>,
    pub pages: Vec<TemplatePage>,
}

impl StoryTemplate {
    pub fn new(id: impl Into<String>, mood: Mood, theme: Theme, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            mood,
            theme,
            page_count: None,
            title: title.into(),
            title_variants: Vec::new(),
            pages: Vec::new(),
        }
    }

    pub fn with_page_count(mut self, page_count: u32) -> Self {
        self.page_count = Some(page_count);
        self
    }

    pub fn with_title_variants(mut self, variants: &[&str]) -> Self {
        self.title_variants = variants.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_page(mut self, page: TemplatePage) -> Self {
        self.pages.push(page);
        self
    }
}

/// The immutable, non-empty collection of templates the selector draws from.
///
/// Construction validates the bank, so an empty bank is a load-time error
/// and never reaches template selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawTemplateBank")]
pub struct TemplateBank {
    version: String,
    templates: Vec<StoryTemplate>,
}

#[derive(Debug, Deserialize)]
struct RawTemplateBank {
    version: String,
    templates: Vec<StoryTemplate>,
}

impl TryFrom<RawTemplateBank> for TemplateBank {
    type Error = TemplateError;

    fn try_from(raw: RawTemplateBank) -> Result<Self, Self::Error> {
        TemplateBank::new(raw.version, raw.templates)
    }
}

const BUILTIN_TEMPLATES: &str = include_str!("../../story_data/story_templates.json");

impl TemplateBank {
    pub fn new(
        version: impl Into<String>,
        templates: Vec<StoryTemplate>,
    ) -> Result<TemplateBank, TemplateError> {
        if templates.is_empty() {
            return Err(TemplateError::EmptyBank);
        }
        let mut seen = FxHashSet::default();
        for template in &templates {
            if !seen.insert(template.id.as_str()) {
                return Err(TemplateError::DuplicateTemplateId(template.id.clone()));
            }
        }
        Ok(TemplateBank {
            version: version.into(),
            templates,
        })
    }

    /// The template bank shipped with the crate.
    pub fn builtin() -> Result<TemplateBank, TemplateError> {
        Self::parse_json(BUILTIN_TEMPLATES)
    }

    /// Parse a template document in JSON form.
    pub fn parse_json(input: &str) -> Result<TemplateBank, TemplateError> {
        let raw: RawTemplateBank = serde_json::from_str(input)?;
        Self::from_raw(raw)
    }

    /// Parse a template document in RON form.
    pub fn parse_ron(input: &str) -> Result<TemplateBank, TemplateError> {
        let raw: RawTemplateBank = ron::from_str(input)?;
        Self::from_raw(raw)
    }

    // Validation runs outside serde so bank errors keep their own variant.
    fn from_raw(raw: RawTemplateBank) -> Result<TemplateBank, TemplateError> {
        let bank = TemplateBank::new(raw.version, raw.templates)?;
        tracing::info!(
            "Loaded {} templates (v{})",
            bank.templates.len(),
            bank.version
        );
        Ok(bank)
    }

    /// Load a template document, choosing the parser from the file extension.
    pub fn load(path: &Path) -> Result<TemplateBank, TemplateError> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "json" => Self::parse_json(&std::fs::read_to_string(path)?),
            "ron" => Self::parse_ron(&std::fs::read_to_string(path)?),
            _ => Err(TemplateError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn templates(&self) -> &[StoryTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Always false; kept alongside `len` for the usual collection API.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// First template in document order.
    pub fn primary(&self) -> &StoryTemplate {
        // Non-empty by construction.
        &self.templates[0]
    }

    pub fn get(&self, id: &str) -> Option<&StoryTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// (mood, theme) of every template, in document order.
    pub fn available_combinations(&self) -> Vec<(Mood, Theme)> {
        self.templates.iter().map(|t| (t.mood, t.theme)).collect()
    }
}
