/// Voice lexicons: per-character phrase banks used for flavor dialogue.
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Emotional category of a voice phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoiceCategory {
    Greeting,
    Farewell,
    Excited,
    Thinking,
    Agreement,
    Surprise,
}

impl VoiceCategory {
    pub const ALL: [VoiceCategory; 6] = [
        Self::Greeting,
        Self::Farewell,
        Self::Excited,
        Self::Thinking,
        Self::Agreement,
        Self::Surprise,
    ];

    /// Phrase used when a lexicon has nothing in this category.
    pub fn fallback(&self) -> &'static str {
        match self {
            Self::Greeting => "Hello!",
            Self::Farewell => "Goodbye!",
            Self::Excited => "Wow!",
            Self::Thinking => "Hmm...",
            Self::Agreement => "Yes!",
            Self::Surprise => "Oh!",
        }
    }

    /// Upper-case key used in placeholder tokens (`VOICE_GREETING`).
    pub fn token_key(&self) -> &'static str {
        match self {
            Self::Greeting => "GREETING",
            Self::Farewell => "FAREWELL",
            Self::Excited => "EXCITED",
            Self::Thinking => "THINKING",
            Self::Agreement => "AGREEMENT",
            Self::Surprise => "SURPRISE",
        }
    }

    pub fn from_token_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.token_key() == key)
    }
}

impl fmt::Display for VoiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Greeting => "greeting",
            Self::Farewell => "farewell",
            Self::Excited => "excited",
            Self::Thinking => "thinking",
            Self::Agreement => "agreement",
            Self::Surprise => "surprise",
        };
        f.write_str(label)
    }
}

/// A character's bank of short signature phrases, keyed by category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VoiceLexicon {
    #[serde(default)]
    pub greeting: Vec<String>,
    #[serde(default)]
    pub farewell: Vec<String>,
    #[serde(default)]
    pub excited: Vec<String>,
    #[serde(default)]
    pub thinking: Vec<String>,
    #[serde(default)]
    pub agreement: Vec<String>,
    #[serde(default)]
    pub surprise: Vec<String>,
}

impl VoiceLexicon {
    pub fn phrases(&self, category: VoiceCategory) -> &[String] {
        match category {
            VoiceCategory::Greeting => &self.greeting,
            VoiceCategory::Farewell => &self.farewell,
            VoiceCategory::Excited => &self.excited,
            VoiceCategory::Thinking => &self.thinking,
            VoiceCategory::Agreement => &self.agreement,
            VoiceCategory::Surprise => &self.surprise,
        }
    }

    /// Draw one phrase from `category`, or the category fallback when empty.
    pub fn random<R: Rng + ?Sized>(&self, category: VoiceCategory, rng: &mut R) -> &str {
        self.phrases(category)
            .choose(rng)
            .map(String::as_str)
            .unwrap_or_else(|| category.fallback())
    }

    /// First phrase of `category`, or the category fallback when empty.
    pub fn first(&self, category: VoiceCategory) -> &str {
        self.phrases(category)
            .first()
            .map(String::as_str)
            .unwrap_or_else(|| category.fallback())
    }

    /// Compact summary of the most distinctive phrases: the first excited,
    /// greeting and surprise entries, quoted, deduplicated, comma-joined.
    pub fn signature_phrases(&self) -> String {
        let mut picked: Vec<&str> = Vec::with_capacity(3);
        for phrase in [
            self.excited.first(),
            self.greeting.first(),
            self.surprise.first(),
        ]
        .into_iter()
        .flatten()
        {
            if !picked.contains(&phrase.as_str()) {
                picked.push(phrase);
            }
        }
        picked
            .iter()
            .map(|p| format!("\"{p}\""))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Multi-line listing of every category, for prompt or debug output.
    pub fn prompt_description(&self) -> String {
        format!(
            "Greetings: {}\nFarewells: {}\nWhen excited: {}\nWhen thinking: {}\nAgreement: {}\nSurprise: {}",
            self.greeting.join(", "),
            self.farewell.join(", "),
            self.excited.join(", "),
            self.thinking.join(", "),
            self.agreement.join(", "),
            self.surprise.join(", "),
        )
    }
}
