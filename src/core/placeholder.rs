/// Placeholder vocabulary and scanner for template text.
///
/// Tokens are written `{{NAME}}`. The vocabulary is closed:
///
/// - `{{MAIN_CHARACTER}}` / `{{SIDE_CHARACTER}}` → display name
/// - `{{PRONOUN_SUBJECTIVE}}`, `{{PRONOUN_POSSESSIVE}}`, `{{PRONOUN_OBJECTIVE}}`
///   and the `SIDE_` forms → pronouns
/// - `{{VOICE_GREETING}}` ... `{{VOICE_SURPRISE}}` and the `SIDE_` forms
///   → a phrase from the character's voice lexicon
/// - `{{OBJECT_1}}`..`{{OBJECT_3}}` → bare object name
/// - `{{A_OBJECT_1}}`..`{{A_OBJECT_3}}` → object name with article
///
/// Anything else between braces is an unknown token. Unknown tokens are
/// never an error.
use std::fmt;

use super::voice::VoiceCategory;

pub const OPEN: &str = "{{";
pub const CLOSE: &str = "}}";

/// Highest object position a template can reference.
pub const MAX_OBJECT_SLOTS: usize = 3;

/// Which character a token refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Main,
    Side,
}

impl Role {
    fn prefix(&self) -> &'static str {
        match self {
            Self::Main => "",
            Self::Side => "SIDE_",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PronounCase {
    Subjective,
    Possessive,
    Objective,
}

impl PronounCase {
    pub const ALL: [PronounCase; 3] = [Self::Subjective, Self::Possessive, Self::Objective];

    fn key(&self) -> &'static str {
        match self {
            Self::Subjective => "SUBJECTIVE",
            Self::Possessive => "POSSESSIVE",
            Self::Objective => "OBJECTIVE",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

/// A recognized placeholder token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    Name(Role),
    Pronoun(Role, PronounCase),
    Voice(Role, VoiceCategory),
    /// `slot` is 1-based.
    Object { slot: usize, articled: bool },
}

impl Placeholder {
    /// Parse the text between the braces, e.g. `SIDE_VOICE_EXCITED`.
    pub fn parse(name: &str) -> Option<Placeholder> {
        match name {
            "MAIN_CHARACTER" => return Some(Self::Name(Role::Main)),
            "SIDE_CHARACTER" => return Some(Self::Name(Role::Side)),
            _ => {}
        }

        if let Some(slot) = name.strip_prefix("A_OBJECT_") {
            return parse_slot(slot).map(|slot| Self::Object {
                slot,
                articled: true,
            });
        }
        if let Some(slot) = name.strip_prefix("OBJECT_") {
            return parse_slot(slot).map(|slot| Self::Object {
                slot,
                articled: false,
            });
        }

        let (role, rest) = match name.strip_prefix("SIDE_") {
            Some(rest) => (Role::Side, rest),
            None => (Role::Main, name),
        };
        if let Some(key) = rest.strip_prefix("PRONOUN_") {
            return PronounCase::from_key(key).map(|case| Self::Pronoun(role, case));
        }
        if let Some(key) = rest.strip_prefix("VOICE_") {
            return VoiceCategory::from_token_key(key).map(|category| Self::Voice(role, category));
        }
        None
    }

    /// Parse a full token including braces, e.g. `{{OBJECT_2}}`.
    pub fn from_token(token: &str) -> Option<Placeholder> {
        token
            .strip_prefix(OPEN)
            .and_then(|t| t.strip_suffix(CLOSE))
            .and_then(Self::parse)
    }

    /// Token name without braces.
    pub fn name(&self) -> String {
        match self {
            Self::Name(Role::Main) => "MAIN_CHARACTER".to_string(),
            Self::Name(Role::Side) => "SIDE_CHARACTER".to_string(),
            Self::Pronoun(role, case) => format!("{}PRONOUN_{}", role.prefix(), case.key()),
            Self::Voice(role, category) => {
                format!("{}VOICE_{}", role.prefix(), category.token_key())
            }
            Self::Object { slot, articled } => {
                format!("{}OBJECT_{}", if *articled { "A_" } else { "" }, slot)
            }
        }
    }

    /// Full token as written in templates.
    pub fn token(&self) -> String {
        format!("{OPEN}{}{CLOSE}", self.name())
    }

    /// The whole vocabulary.
    pub fn all() -> Vec<Placeholder> {
        let mut all = Vec::new();
        for role in [Role::Main, Role::Side] {
            all.push(Self::Name(role));
            for case in PronounCase::ALL {
                all.push(Self::Pronoun(role, case));
            }
            for category in VoiceCategory::ALL {
                all.push(Self::Voice(role, category));
            }
        }
        for slot in 1..=MAX_OBJECT_SLOTS {
            all.push(Self::Object {
                slot,
                articled: false,
            });
            all.push(Self::Object {
                slot,
                articled: true,
            });
        }
        all
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

fn parse_slot(s: &str) -> Option<usize> {
    match s {
        "1" => Some(1),
        "2" => Some(2),
        "3" => Some(3),
        _ => None,
    }
}

/// A piece of scanned template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    /// Brace-delimited token. `placeholder` is `None` for unknown names.
    Token {
        raw: &'a str,
        placeholder: Option<Placeholder>,
    },
}

/// Split `text` into literals and `{{...}}` tokens.
///
/// A token runs from the last `{{` before the first following `}}`, so
/// stray braces around a token stay literal. Unterminated `{{` is literal.
pub fn scan(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = text;

    while let Some(close) = rest.find(CLOSE) {
        let token_end = close + CLOSE.len();
        match rest[..close].rfind(OPEN) {
            Some(open) => {
                if open > 0 {
                    segments.push(Segment::Literal(&rest[..open]));
                }
                let name = &rest[open + OPEN.len()..close];
                segments.push(Segment::Token {
                    raw: &rest[open..token_end],
                    placeholder: Placeholder::parse(name),
                });
            }
            None => segments.push(Segment::Literal(&rest[..token_end])),
        }
        rest = &rest[token_end..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }
    segments
}

/// True when `s` still carries placeholder syntax.
pub fn contains_placeholder_syntax(s: &str) -> bool {
    s.contains(OPEN)
}

/// Raw text of every unknown token in `text`, in order.
pub fn unknown_tokens(text: &str) -> Vec<&str> {
    scan(text)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Token {
                raw,
                placeholder: None,
            } => Some(raw),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_round_trips() {
        let all = Placeholder::all();
        assert_eq!(all.len(), 26);
        for placeholder in all {
            assert_eq!(Placeholder::from_token(&placeholder.token()), Some(placeholder));
        }
    }

    #[test]
    fn exact_token_names() {
        let names: Vec<String> = Placeholder::all().iter().map(|p| p.token()).collect();
        for expected in [
            "{{MAIN_CHARACTER}}",
            "{{PRONOUN_SUBJECTIVE}}",
            "{{PRONOUN_POSSESSIVE}}",
            "{{PRONOUN_OBJECTIVE}}",
            "{{VOICE_GREETING}}",
            "{{VOICE_FAREWELL}}",
            "{{VOICE_EXCITED}}",
            "{{VOICE_THINKING}}",
            "{{VOICE_AGREEMENT}}",
            "{{VOICE_SURPRISE}}",
            "{{SIDE_CHARACTER}}",
            "{{SIDE_PRONOUN_SUBJECTIVE}}",
            "{{SIDE_PRONOUN_POSSESSIVE}}",
            "{{SIDE_PRONOUN_OBJECTIVE}}",
            "{{SIDE_VOICE_GREETING}}",
            "{{SIDE_VOICE_FAREWELL}}",
            "{{SIDE_VOICE_EXCITED}}",
            "{{SIDE_VOICE_THINKING}}",
            "{{SIDE_VOICE_AGREEMENT}}",
            "{{SIDE_VOICE_SURPRISE}}",
            "{{OBJECT_1}}",
            "{{OBJECT_2}}",
            "{{OBJECT_3}}",
            "{{A_OBJECT_1}}",
            "{{A_OBJECT_2}}",
            "{{A_OBJECT_3}}",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
    }

    #[test]
    fn rejects_near_misses() {
        assert_eq!(Placeholder::parse("OBJECT_4"), None);
        assert_eq!(Placeholder::parse("SIDE_OBJECT_1"), None);
        assert_eq!(Placeholder::parse("SIDE_SIDE_CHARACTER"), None);
        assert_eq!(Placeholder::parse("VOICE_SHOUT"), None);
        assert_eq!(Placeholder::parse("main_character"), None);
        assert_eq!(Placeholder::parse(" MAIN_CHARACTER"), None);
        assert_eq!(Placeholder::parse(""), None);
    }

    #[test]
    fn scan_mixed_text() {
        let segments = scan("{{MAIN_CHARACTER}} found {{A_OBJECT_1}}.");
        assert_eq!(
            segments,
            vec![
                Segment::Token {
                    raw: "{{MAIN_CHARACTER}}",
                    placeholder: Some(Placeholder::Name(Role::Main)),
                },
                Segment::Literal(" found "),
                Segment::Token {
                    raw: "{{A_OBJECT_1}}",
                    placeholder: Some(Placeholder::Object {
                        slot: 1,
                        articled: true
                    }),
                },
                Segment::Literal("."),
            ]
        );
    }

    #[test]
    fn scan_unknown_and_unterminated() {
        let segments = scan("Hi {{NOPE}} and {{OPEN");
        assert_eq!(
            segments,
            vec![
                Segment::Literal("Hi "),
                Segment::Token {
                    raw: "{{NOPE}}",
                    placeholder: None,
                },
                Segment::Literal(" and {{OPEN"),
            ]
        );
    }

    #[test]
    fn scan_stray_braces() {
        let segments = scan("{{{SIDE_CHARACTER}}} }} end");
        assert_eq!(segments[0], Segment::Literal("{"));
        assert_eq!(
            segments[1],
            Segment::Token {
                raw: "{{SIDE_CHARACTER}}",
                placeholder: Some(Placeholder::Name(Role::Side)),
            }
        );
        let rebuilt: String = segments
            .iter()
            .map(|s| match s {
                Segment::Literal(text) => *text,
                Segment::Token { raw, .. } => *raw,
            })
            .collect();
        assert_eq!(rebuilt, "{{{SIDE_CHARACTER}}} }} end");
    }

    #[test]
    fn scan_plain_text() {
        assert_eq!(scan("Once upon a time."), vec![Segment::Literal("Once upon a time.")]);
        assert!(scan("").is_empty());
    }

    #[test]
    fn unknown_tokens_listed() {
        assert_eq!(
            unknown_tokens("{{MAIN_CHARACTER}} met {{VILLAIN}} and {{OBJECT_9}}"),
            vec!["{{VILLAIN}}", "{{OBJECT_9}}"]
        );
        assert!(unknown_tokens("{{SIDE_VOICE_FAREWELL}}").is_empty());
    }
}
