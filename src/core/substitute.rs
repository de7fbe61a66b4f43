/// Placeholder substitution: turns template strings into story text and
/// image tokens into asset ids.
///
/// Substitution never fails. A token that cannot be resolved degrades to
/// omission, and a token outside the vocabulary is left untouched in text.
use rand::Rng;

use crate::core::placeholder::{
    contains_placeholder_syntax, scan, Placeholder, PronounCase, Role, Segment,
};
use crate::schema::asset::{AssetId, Character, StoryObject};

/// Binds the cast and object pool of one render.
#[derive(Debug, Clone, Copy)]
pub struct PlaceholderSubstitutor<'a> {
    main: &'a Character,
    side: &'a Character,
    objects: &'a [StoryObject],
    randomize_voice: bool,
}

impl<'a> PlaceholderSubstitutor<'a> {
    pub fn new(main: &'a Character, side: &'a Character, objects: &'a [StoryObject]) -> Self {
        Self {
            main,
            side,
            objects,
            randomize_voice: true,
        }
    }

    /// When disabled, voice tokens always resolve to the first phrase of
    /// their category, which makes text output fully deterministic.
    pub fn randomize_voice(mut self, enabled: bool) -> Self {
        self.randomize_voice = enabled;
        self
    }

    fn character(&self, role: Role) -> &'a Character {
        match role {
            Role::Main => self.main,
            Role::Side => self.side,
        }
    }

    fn object(&self, slot: usize) -> Option<&'a StoryObject> {
        slot.checked_sub(1).and_then(|i| self.objects.get(i))
    }

    /// Value for one recognized placeholder. Absent objects yield `None`.
    pub fn resolve<R: Rng + ?Sized>(&self, placeholder: Placeholder, rng: &mut R) -> Option<&'a str> {
        match placeholder {
            Placeholder::Name(role) => Some(self.character(role).display_name.as_str()),
            Placeholder::Pronoun(role, case) => {
                let pronouns = &self.character(role).pronouns;
                Some(match case {
                    PronounCase::Subjective => pronouns.subjective(),
                    PronounCase::Possessive => pronouns.possessive(),
                    PronounCase::Objective => pronouns.objective(),
                })
            }
            Placeholder::Voice(role, category) => {
                let voice = &self.character(role).voice;
                Some(if self.randomize_voice {
                    voice.random(category, rng)
                } else {
                    voice.first(category)
                })
            }
            Placeholder::Object { slot, articled } => self.object(slot).map(|object| {
                if articled {
                    object.display_name_with_article.as_str()
                } else {
                    object.display_name.as_str()
                }
            }),
        }
    }

    /// Replace every recognized token in `template`.
    ///
    /// Tokens for object positions beyond the supplied pool become empty
    /// text. Unknown tokens are copied through as written.
    pub fn substitute_text<R: Rng + ?Sized>(&self, template: &str, rng: &mut R) -> String {
        let mut out = String::with_capacity(template.len());
        for segment in scan(template) {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Token {
                    placeholder: Some(placeholder),
                    ..
                } => {
                    if let Some(value) = self.resolve(placeholder, rng) {
                        out.push_str(value);
                    }
                }
                Segment::Token {
                    raw,
                    placeholder: None,
                } => out.push_str(raw),
            }
        }
        out
    }

    /// Map one image token to an asset id.
    ///
    /// Character tokens resolve to the character's id and object tokens to
    /// the id of the object at that position. Anything else passes through
    /// as a literal asset id, unless it still carries placeholder syntax.
    pub fn substitute_image_token(&self, token: &str) -> Option<AssetId> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return None;
        }
        match Placeholder::from_token(trimmed) {
            Some(Placeholder::Name(role)) => Some(self.character(role).id.clone()),
            Some(Placeholder::Object { slot, .. }) => self.object(slot).map(|o| o.id.clone()),
            Some(_) => None,
            None if contains_placeholder_syntax(trimmed) => None,
            None => Some(AssetId::from(trimmed)),
        }
    }

    /// Resolve an image token list, dropping entries that resolve to nothing.
    pub fn substitute_images(&self, tokens: &[String]) -> Vec<AssetId> {
        tokens
            .iter()
            .filter_map(|token| self.substitute_image_token(token))
            .collect()
    }
}
