use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::voice::VoiceLexicon;

/// Stable string key identifying a character or object in the catalog.
///
/// Rendered pages carry these identifiers so the book assembly layer can
/// look up the matching artwork.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub String);

impl AssetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for AssetId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Size class of an asset. Opaque to rendering; the page layout code
/// uses it to scale artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AssetSize {
    #[default]
    Small,
    Large,
}

/// Pronoun set for a character, used to resolve the pronoun placeholders
/// (`{{PRONOUN_SUBJECTIVE}}`, `{{SIDE_PRONOUN_OBJECTIVE}}`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Pronouns {
    /// she/her/her
    SheHer,
    /// he/his/him
    HeHim,
    /// they/their/them
    #[default]
    TheyThem,
    /// it/its/it
    ItIts,
    /// Any other set, spelled out.
    Custom {
        subjective: String,
        possessive: String,
        objective: String,
    },
}

impl Pronouns {
    /// Subject form: "she", "he", "they", "it".
    pub fn subjective(&self) -> &str {
        match self {
            Self::SheHer => "she",
            Self::HeHim => "he",
            Self::TheyThem => "they",
            Self::ItIts => "it",
            Self::Custom { subjective, .. } => subjective,
        }
    }

    /// Possessive determiner: "her", "his", "their", "its".
    pub fn possessive(&self) -> &str {
        match self {
            Self::SheHer => "her",
            Self::HeHim => "his",
            Self::TheyThem => "their",
            Self::ItIts => "its",
            Self::Custom { possessive, .. } => possessive,
        }
    }

    /// Object form: "her", "him", "them", "it".
    pub fn objective(&self) -> &str {
        match self {
            Self::SheHer => "her",
            Self::HeHim => "him",
            Self::TheyThem => "them",
            Self::ItIts => "it",
            Self::Custom { objective, .. } => objective,
        }
    }

    /// Short label such as "he/him", for listings.
    pub fn label(&self) -> String {
        format!("{}/{}", self.subjective(), self.objective())
    }
}

/// A story character. Characters are catalog data: defined once when the
/// catalog is built and never created or destroyed while rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: AssetId,
    pub image_name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "large")]
    pub size: AssetSize,
    pub pronouns: Pronouns,
    #[serde(default)]
    pub voice: VoiceLexicon,
}

fn large() -> AssetSize {
    AssetSize::Large
}

impl Character {
    /// One-line rule stating which phrases belong to this character alone,
    /// e.g. `- Mr. Dog: says "Oh boy, oh boy!", "Woof! Hello there!" - ONLY Mr. Dog uses these`.
    pub fn voice_ownership_rule(&self) -> String {
        format!(
            "- {}: says {} - ONLY {} uses these",
            self.display_name,
            self.voice.signature_phrases(),
            self.display_name
        )
    }
}

/// A story object ("an apple", "a teddy bear").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawStoryObject")]
pub struct StoryObject {
    pub id: AssetId,
    pub image_name: String,
    pub display_name: String,
    /// First-mention form including the indefinite article.
    pub display_name_with_article: String,
    pub description: String,
    pub size: AssetSize,
}

// Catalog files may omit the articled form; it is derived on load.
#[derive(Debug, Deserialize)]
struct RawStoryObject {
    id: AssetId,
    image_name: String,
    display_name: String,
    #[serde(default)]
    display_name_with_article: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    size: AssetSize,
}

impl From<RawStoryObject> for StoryObject {
    fn from(raw: RawStoryObject) -> Self {
        let mut object = StoryObject::new(raw.id, raw.image_name, raw.display_name)
            .with_description(raw.description)
            .with_size(raw.size);
        if let Some(articled) = raw.display_name_with_article {
            object = object.with_article(articled);
        }
        object
    }
}

impl StoryObject {
    /// Build an object whose articled form is derived from `display_name`.
    pub fn new(
        id: impl Into<AssetId>,
        image_name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        let display_name = display_name.into();
        Self {
            id: id.into(),
            image_name: image_name.into(),
            display_name_with_article: with_indefinite_article(&display_name),
            display_name,
            description: String::new(),
            size: AssetSize::Small,
        }
    }

    /// Override the articled form. Blank input keeps the derived form.
    pub fn with_article(mut self, articled: impl Into<String>) -> Self {
        let articled = articled.into();
        if !articled.trim().is_empty() {
            self.display_name_with_article = articled;
        }
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_size(mut self, size: AssetSize) -> Self {
        self.size = size;
        self
    }
}

/// Prefix `name` with "an" when it starts with a vowel, "a" otherwise.
pub fn with_indefinite_article(name: &str) -> String {
    let starts_with_vowel = name
        .chars()
        .next()
        .map(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'))
        .unwrap_or(false);
    if starts_with_vowel {
        format!("an {name}")
    } else {
        format!("a {name}")
    }
}
