use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::template::Theme;

/// A story premise picked by the reader. Template selection works on
/// themes, so each spark maps onto the theme closest to its premise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorySpark {
    TreasureHunt,
    FindingFood,
    HelpingFriend,
    LostAndFound,
    MagicalDiscovery,
    Birthday,
    BuildingSomething,
    SolvingProblem,
    Random,
}

impl StorySpark {
    pub const ALL: [StorySpark; 9] = [
        Self::TreasureHunt,
        Self::FindingFood,
        Self::HelpingFriend,
        Self::LostAndFound,
        Self::MagicalDiscovery,
        Self::Birthday,
        Self::BuildingSomething,
        Self::SolvingProblem,
        Self::Random,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::TreasureHunt => "Treasure Hunt",
            Self::FindingFood => "Finding Something to Eat",
            Self::HelpingFriend => "Helping a Friend",
            Self::LostAndFound => "Lost and Found",
            Self::MagicalDiscovery => "Magical Discovery",
            Self::Birthday => "Birthday Celebration",
            Self::BuildingSomething => "Building Something Together",
            Self::SolvingProblem => "Solving a Problem",
            Self::Random => "Surprise Me!",
        }
    }

    /// Theme for this premise. `Random` draws uniformly from all themes.
    pub fn theme<R: Rng + ?Sized>(&self, rng: &mut R) -> Theme {
        match self {
            Self::Birthday => Theme::Birthday,
            Self::TreasureHunt | Self::MagicalDiscovery | Self::LostAndFound => Theme::Adventure,
            Self::HelpingFriend | Self::BuildingSomething => Theme::Friendship,
            Self::SolvingProblem => Theme::Mystery,
            Self::FindingFood => Theme::Celebration,
            Self::Random => Theme::ALL.choose(rng).copied().unwrap_or(Theme::Adventure),
        }
    }

    /// Parse a snake_case or label form ("treasure_hunt", "Treasure Hunt").
    pub fn parse(s: &str) -> Option<StorySpark> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|spark| normalize(spark.label()) == wanted || normalize(&format!("{spark:?}")) == wanted)
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl fmt::Display for StorySpark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
