/// Template selection: resolves a (mood, theme) request to one template
/// through a fixed fallback ladder.
///
/// 1. explicit semantic mapping to a different (mood, theme) pair
/// 2. exact (mood, theme) match
/// 3. mood-only match
/// 4. theme-only match
/// 5. any template
///
/// Each tier first narrows its own candidates to the preferred page count
/// when that leaves something, then picks uniformly at random.
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::schema::template::{Mood, StoryTemplate, TemplateBank, Theme};

/// Lookup key for the semantic mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoryKey {
    pub mood: Mood,
    pub theme: Theme,
}

impl StoryKey {
    pub const fn new(mood: Mood, theme: Theme) -> Self {
        Self { mood, theme }
    }
}

/// Editorial redirects from a requested (mood, theme) to the pair whose
/// stories best carry that intent. Further rows come from a mappings file.
const DEFAULT_MAPPINGS: &[(StoryKey, StoryKey)] = &[
    // Courage to help a friend reads best as a kindness story.
    (
        StoryKey::new(Mood::Courage, Theme::Friendship),
        StoryKey::new(Mood::Kindness, Theme::Friendship),
    ),
    // A friendship mystery is about looking out for one another.
    (
        StoryKey::new(Mood::Mystery, Theme::Friendship),
        StoryKey::new(Mood::Kindness, Theme::Friendship),
    ),
];

/// The explicit (mood, theme) → (mood, theme) table. Data, not heuristics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticMappings {
    table: FxHashMap<StoryKey, StoryKey>,
}

/// One entry of a mapping file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingEntry {
    pub from: StoryKey,
    pub to: StoryKey,
}

impl Default for SemanticMappings {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_MAPPINGS.iter().copied())
    }
}

impl SemanticMappings {
    /// A table with no redirects.
    pub fn empty() -> Self {
        Self {
            table: FxHashMap::default(),
        }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (StoryKey, StoryKey)>) -> Self {
        Self {
            table: pairs.into_iter().collect(),
        }
    }

    pub fn from_entries(entries: impl IntoIterator<Item = MappingEntry>) -> Self {
        Self::from_pairs(entries.into_iter().map(|e| (e.from, e.to)))
    }

    pub fn insert(&mut self, from: StoryKey, to: StoryKey) {
        self.table.insert(from, to);
    }

    pub fn get(&self, mood: Mood, theme: Theme) -> Option<StoryKey> {
        self.table.get(&StoryKey::new(mood, theme)).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StoryKey, &StoryKey)> {
        self.table.iter()
    }
}

/// Which rung of the ladder produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTier {
    Mapped,
    Exact,
    MoodOnly,
    ThemeOnly,
    Any,
}

/// Picks templates from a bank. Stateless apart from the borrowed data.
#[derive(Debug, Clone, Copy)]
pub struct TemplateSelector<'a> {
    bank: &'a TemplateBank,
    mappings: &'a SemanticMappings,
}

impl<'a> TemplateSelector<'a> {
    pub fn new(bank: &'a TemplateBank, mappings: &'a SemanticMappings) -> Self {
        Self { bank, mappings }
    }

    /// Select a template for the request. Always returns a template.
    pub fn select<R: Rng + ?Sized>(
        &self,
        mood: Mood,
        theme: Theme,
        preferred_page_count: Option<u32>,
        rng: &mut R,
    ) -> &'a StoryTemplate {
        self.select_with_tier(mood, theme, preferred_page_count, rng)
            .0
    }

    /// Like `select`, also reporting which tier matched.
    pub fn select_with_tier<R: Rng + ?Sized>(
        &self,
        mood: Mood,
        theme: Theme,
        preferred_page_count: Option<u32>,
        rng: &mut R,
    ) -> (&'a StoryTemplate, SelectionTier) {
        let templates = self.bank.templates();

        if let Some(target) = self.mappings.get(mood, theme) {
            let candidates = filter(templates, |t| t.mood == target.mood && t.theme == target.theme);
            if let Some(template) = choose(&candidates, preferred_page_count, rng) {
                tracing::debug!(
                    "{} + {} mapped to {} + {}: {}",
                    mood,
                    theme,
                    target.mood,
                    target.theme,
                    template.id
                );
                return (template, SelectionTier::Mapped);
            }
        }

        let ladder: [(SelectionTier, fn(&StoryTemplate, Mood, Theme) -> bool); 3] = [
            (SelectionTier::Exact, |t, m, th| t.mood == m && t.theme == th),
            (SelectionTier::MoodOnly, |t, m, _| t.mood == m),
            (SelectionTier::ThemeOnly, |t, _, th| t.theme == th),
        ];
        for (tier, matches) in ladder {
            let candidates = filter(templates, |t| matches(t, mood, theme));
            if let Some(template) = choose(&candidates, preferred_page_count, rng) {
                tracing::debug!("{} + {} resolved by {:?}: {}", mood, theme, tier, template.id);
                return (template, tier);
            }
        }

        let everything: Vec<&'a StoryTemplate> = templates.iter().collect();
        let template = choose(&everything, preferred_page_count, rng)
            .unwrap_or_else(|| self.bank.primary());
        tracing::debug!("{} + {} fell back to any template: {}", mood, theme, template.id);
        (template, SelectionTier::Any)
    }
}

fn filter<'a>(
    templates: &'a [StoryTemplate],
    predicate: impl Fn(&StoryTemplate) -> bool,
) -> Vec<&'a StoryTemplate> {
    templates.iter().filter(|t| predicate(t)).collect()
}

/// Uniform pick, preferring candidates with the requested page count.
fn choose<'a, R: Rng + ?Sized>(
    candidates: &[&'a StoryTemplate],
    preferred_page_count: Option<u32>,
    rng: &mut R,
) -> Option<&'a StoryTemplate> {
    if let Some(count) = preferred_page_count {
        let sized: Vec<&'a StoryTemplate> = candidates
            .iter()
            .copied()
            .filter(|t| t.page_count == Some(count))
            .collect();
        if let Some(template) = sized.choose(rng) {
            return Some(template);
        }
    }
    candidates.choose(rng).copied()
}
