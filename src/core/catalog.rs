/// Asset catalog: the fixed registry of characters and objects.
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::voice::VoiceLexicon;
use crate::schema::asset::{AssetId, AssetSize, Character, Pronouns, StoryObject};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("catalog has no characters")]
    NoCharacters,
    #[error("duplicate asset id: {0}")]
    DuplicateAsset(AssetId),
}

/// Immutable registry of story characters and objects.
///
/// A catalog always holds at least one character; `new` refuses anything
/// else. Catalogs are passed to the renderer explicitly so tests can use
/// small fixture catalogs.
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    characters: Vec<Character>,
    objects: Vec<StoryObject>,
    character_index: FxHashMap<AssetId, usize>,
    object_index: FxHashMap<AssetId, usize>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RonCatalog {
    characters: Vec<Character>,
    #[serde(default)]
    objects: Vec<StoryObject>,
}

impl AssetCatalog {
    pub fn new(
        characters: Vec<Character>,
        objects: Vec<StoryObject>,
    ) -> Result<AssetCatalog, CatalogError> {
        if characters.is_empty() {
            return Err(CatalogError::NoCharacters);
        }

        let mut character_index = FxHashMap::default();
        for (i, character) in characters.iter().enumerate() {
            if character_index.insert(character.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateAsset(character.id.clone()));
            }
        }
        let mut object_index = FxHashMap::default();
        for (i, object) in objects.iter().enumerate() {
            if character_index.contains_key(&object.id)
                || object_index.insert(object.id.clone(), i).is_some()
            {
                return Err(CatalogError::DuplicateAsset(object.id.clone()));
            }
        }

        Ok(AssetCatalog {
            characters,
            objects,
            character_index,
            object_index,
        })
    }

    /// Parse a catalog from a RON string of the form
    /// `(characters: [...], objects: [...])`.
    pub fn parse_ron(input: &str) -> Result<AssetCatalog, CatalogError> {
        let raw: RonCatalog = ron::from_str(input)?;
        let catalog = Self::new(raw.characters, raw.objects)?;
        tracing::info!(
            "Loaded catalog with {} characters and {} objects",
            catalog.characters.len(),
            catalog.objects.len()
        );
        Ok(catalog)
    }

    pub fn load_from_ron(path: &Path) -> Result<AssetCatalog, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn objects(&self) -> &[StoryObject] {
        &self.objects
    }

    pub fn character(&self, id: &AssetId) -> Option<&Character> {
        self.character_index.get(id).map(|&i| &self.characters[i])
    }

    pub fn object(&self, id: &AssetId) -> Option<&StoryObject> {
        self.object_index.get(id).map(|&i| &self.objects[i])
    }

    /// True when `id` names a character or an object.
    pub fn contains(&self, id: &AssetId) -> bool {
        self.character_index.contains_key(id) || self.object_index.contains_key(id)
    }

    /// Pick a side character for `main`, uniformly from every other
    /// character. A single-character catalog pairs `main` with itself.
    pub fn side_character_for<'a, R: Rng + ?Sized>(
        &'a self,
        main: &'a Character,
        rng: &mut R,
    ) -> &'a Character {
        let others: Vec<&Character> = self
            .characters
            .iter()
            .filter(|c| c.id != main.id)
            .collect();
        others
            .choose(rng)
            .copied()
            .or_else(|| self.characters.first())
            .unwrap_or(main)
    }

    /// Up to `count` distinct characters in random order.
    pub fn random_characters<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<&Character> {
        self.characters.choose_multiple(rng, count).collect()
    }

    /// Up to `count` distinct objects in random order.
    pub fn random_objects<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<&StoryObject> {
        self.objects.choose_multiple(rng, count).collect()
    }

    /// Image names of every character then every object.
    pub fn all_image_names(&self) -> Vec<&str> {
        self.characters
            .iter()
            .map(|c| c.image_name.as_str())
            .chain(self.objects.iter().map(|o| o.image_name.as_str()))
            .collect()
    }

    /// Size class for an image name; unknown names are `Small`.
    pub fn size_for_image(&self, image_name: &str) -> AssetSize {
        if let Some(character) = self.characters.iter().find(|c| c.image_name == image_name) {
            return character.size;
        }
        if let Some(object) = self.objects.iter().find(|o| o.image_name == image_name) {
            return object.size;
        }
        AssetSize::Small
    }

    /// The catalog shipped with the app: four characters, eight objects.
    pub fn builtin() -> AssetCatalog {
        let characters = vec![mr_dog(), sir_whiskers(), professor_seal(), ms_cow()];
        let objects = builtin_objects();
        let character_index = index_by_id(characters.iter().map(|c| &c.id));
        let object_index = index_by_id(objects.iter().map(|o| &o.id));
        AssetCatalog {
            characters,
            objects,
            character_index,
            object_index,
        }
    }
}

fn index_by_id<'a>(ids: impl Iterator<Item = &'a AssetId>) -> FxHashMap<AssetId, usize> {
    ids.enumerate().map(|(i, id)| (id.clone(), i)).collect()
}

fn phrases(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn mr_dog() -> Character {
    Character {
        id: AssetId::from("MR_DOG"),
        image_name: "mrDog".to_string(),
        display_name: "Mr. Dog".to_string(),
        description: "A friendly, happy-go-lucky optimistic dog".to_string(),
        size: AssetSize::Large,
        pronouns: Pronouns::HeHim,
        voice: VoiceLexicon {
            greeting: phrases(&["Woof! Hello there!", "Hey friend!", "Hi hi hi!"]),
            farewell: phrases(&["See ya later!", "Bye-bye, friend!", "Catch you soon!"]),
            excited: phrases(&["Oh boy, oh boy!", "This is pawsome!", "Yippee!"]),
            thinking: phrases(&["Hmm, let me sniff this out...", "I wonder...", "Ooh, what's that?"]),
            agreement: phrases(&["You bet!", "Absolutely!", "Let's do it!"]),
            surprise: phrases(&["Whoa!", "No way!", "Woof!"]),
        },
    }
}

fn sir_whiskers() -> Character {
    Character {
        id: AssetId::from("SIR_WHISKERS"),
        image_name: "sirWhiskers".to_string(),
        display_name: "Sir Whiskers".to_string(),
        description: "A prim and proper cat who speaks with a whimsical British accent"
            .to_string(),
        size: AssetSize::Small,
        pronouns: Pronouns::HeHim,
        voice: VoiceLexicon {
            greeting: phrases(&["Good day to you!", "Greetings, dear friend.", "Ah, splendid to see you!"]),
            farewell: phrases(&["Cheerio!", "Farewell, old chap!", "Until we meet again!"]),
            excited: phrases(&["How delightful!", "Splendid!", "Most excellent!"]),
            thinking: phrases(&["Let me ponder this...", "Curious, most curious...", "I do believe..."]),
            agreement: phrases(&["Indeed!", "Quite right!", "Precisely so!"]),
            surprise: phrases(&["Good heavens!", "My word!", "I say!"]),
        },
    }
}

fn professor_seal() -> Character {
    Character {
        id: AssetId::from("PROFESSOR_SEAL"),
        image_name: "professorSeal".to_string(),
        display_name: "Professor Seal".to_string(),
        description: "A wise and logical educator seal".to_string(),
        size: AssetSize::Large,
        pronouns: Pronouns::HeHim,
        voice: VoiceLexicon {
            greeting: phrases(&["Greetings, young learner!", "Hello there!", "Ah, welcome!"]),
            farewell: phrases(&["Keep learning!", "Until next time!", "Stay curious!"]),
            excited: phrases(&["Fascinating!", "Remarkable!", "What a discovery!"]),
            thinking: phrases(&["Let me think...", "According to my research...", "Aha!"]),
            agreement: phrases(&["Correct!", "Exactly right!", "Well reasoned!"]),
            surprise: phrases(&["Extraordinary!", "How unexpected!", "Incredible!"]),
        },
    }
}

fn ms_cow() -> Character {
    Character {
        id: AssetId::from("MS_COW"),
        image_name: "msCow".to_string(),
        display_name: "Ms. Cow".to_string(),
        description: "A kind and simple cow who speaks with a southern accent".to_string(),
        size: AssetSize::Large,
        pronouns: Pronouns::SheHer,
        voice: VoiceLexicon {
            greeting: phrases(&["Well, hello there, sugar!", "Howdy, y'all!", "Hey there, sweetpea!"]),
            farewell: phrases(&["Y'all come back now!", "Take care, hon!", "Bye-bye, darlin'!"]),
            excited: phrases(&["Well, I'll be!", "Hot diggity!", "Ain't that somethin'!"]),
            thinking: phrases(&["Now let me think on that...", "Well, I reckon...", "Hmm, sugar..."]),
            agreement: phrases(&["Bless your heart, yes!", "You got that right!", "Mhm, sure thing!"]),
            surprise: phrases(&["Oh my stars!", "Well, I never!", "Goodness gracious!"]),
        },
    }
}

fn builtin_objects() -> Vec<StoryObject> {
    vec![
        StoryObject::new("APPLE", "apple", "apple")
            .with_article("an apple")
            .with_description("a shiny red apple, healthy and delicious"),
        StoryObject::new("BALLOON", "balloon", "balloon")
            .with_article("a balloon")
            .with_description("a colorful balloon that floats in the air")
            .with_size(AssetSize::Large),
        StoryObject::new("BASKETBALL", "basketball", "basketball")
            .with_article("a basketball")
            .with_description("an orange basketball for playing and bouncing"),
        StoryObject::new("BOOK", "book", "book")
            .with_article("a book")
            .with_description("a book full of stories and knowledge"),
        StoryObject::new("BURGER", "burger", "burger")
            .with_article("a burger")
            .with_description("a tasty burger with all the fixings"),
        StoryObject::new("CAKE", "cake", "cake")
            .with_article("a cake")
            .with_description("a delicious cake perfect for celebrations"),
        StoryObject::new("CRAYON", "crayon", "crayon")
            .with_article("a crayon")
            .with_description("a colorful crayon for drawing and creating art"),
        StoryObject::new("TEDDY", "teddy", "teddy bear")
            .with_article("a teddy bear")
            .with_description("a soft and cuddly teddy bear"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn solo(id: &str) -> Character {
        Character {
            id: AssetId::from(id),
            image_name: id.to_lowercase(),
            display_name: id.to_string(),
            description: String::new(),
            size: AssetSize::Large,
            pronouns: Pronouns::TheyThem,
            voice: VoiceLexicon::default(),
        }
    }

    #[test]
    fn builtin_catalog_contents() {
        let catalog = AssetCatalog::builtin();
        assert_eq!(catalog.characters().len(), 4);
        assert_eq!(catalog.objects().len(), 8);

        let cow = catalog.character(&AssetId::from("MS_COW")).unwrap();
        assert_eq!(cow.display_name, "Ms. Cow");
        assert_eq!(cow.pronouns.subjective(), "she");

        let teddy = catalog.object(&AssetId::from("TEDDY")).unwrap();
        assert_eq!(teddy.display_name_with_article, "a teddy bear");
        assert!(catalog.character(&AssetId::from("APPLE")).is_none());
        assert!(catalog.contains(&AssetId::from("APPLE")));
        assert!(!catalog.contains(&AssetId::from("DRAGON")));
    }

    #[test]
    fn builtin_ids_unique() {
        let catalog = AssetCatalog::builtin();
        let rebuilt = AssetCatalog::new(
            catalog.characters().to_vec(),
            catalog.objects().to_vec(),
        );
        assert!(rebuilt.is_ok());
    }

    #[test]
    fn empty_catalog_rejected() {
        assert!(matches!(
            AssetCatalog::new(Vec::new(), Vec::new()),
            Err(CatalogError::NoCharacters)
        ));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let result = AssetCatalog::new(vec![solo("A"), solo("A")], Vec::new());
        assert!(matches!(result, Err(CatalogError::DuplicateAsset(id)) if id.as_str() == "A"));

        let clash = StoryObject::new("A", "a", "thing");
        let result = AssetCatalog::new(vec![solo("A")], vec![clash]);
        assert!(matches!(result, Err(CatalogError::DuplicateAsset(_))));
    }

    #[test]
    fn side_character_never_main() {
        let catalog = AssetCatalog::builtin();
        let main = catalog.character(&AssetId::from("MR_DOG")).unwrap();
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let side = catalog.side_character_for(main, &mut rng);
            assert_ne!(side.id, main.id);
        }
    }

    #[test]
    fn side_character_single_catalog_falls_back() {
        let catalog = AssetCatalog::new(vec![solo("ONLY")], Vec::new()).unwrap();
        let main = &catalog.characters()[0];
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(catalog.side_character_for(main, &mut rng).id, main.id);
    }

    #[test]
    fn random_objects_distinct_and_bounded() {
        let catalog = AssetCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(11);
        let picked = catalog.random_objects(3, &mut rng);
        assert_eq!(picked.len(), 3);
        assert_ne!(picked[0].id, picked[1].id);
        assert_ne!(picked[1].id, picked[2].id);
        assert_ne!(picked[0].id, picked[2].id);

        let all = catalog.random_objects(50, &mut rng);
        assert_eq!(all.len(), 8);
        assert_eq!(catalog.random_characters(2, &mut rng).len(), 2);
    }

    #[test]
    fn image_sizes() {
        let catalog = AssetCatalog::builtin();
        assert_eq!(catalog.size_for_image("sirWhiskers"), AssetSize::Small);
        assert_eq!(catalog.size_for_image("mrDog"), AssetSize::Large);
        assert_eq!(catalog.size_for_image("balloon"), AssetSize::Large);
        assert_eq!(catalog.size_for_image("apple"), AssetSize::Small);
        assert_eq!(catalog.size_for_image("nothing"), AssetSize::Small);
        assert_eq!(catalog.all_image_names().len(), 12);
    }

    #[test]
    fn parse_catalog_from_ron() {
        let src = r#"(
            characters: [
                (
                    id: "REX",
                    image_name: "rex",
                    display_name: "Rex",
                    pronouns: HeHim,
                    voice: (greeting: ["Arf!"]),
                ),
            ],
            objects: [
                (id: "EGG", image_name: "egg", display_name: "egg"),
            ],
        )"#;
        let catalog = AssetCatalog::parse_ron(src).unwrap();
        let rex = catalog.character(&AssetId::from("REX")).unwrap();
        assert_eq!(rex.size, AssetSize::Large);
        assert_eq!(rex.voice.greeting, vec!["Arf!".to_string()]);
        assert!(rex.voice.farewell.is_empty());
        let egg = catalog.object(&AssetId::from("EGG")).unwrap();
        assert_eq!(egg.display_name_with_article, "an egg");
    }

    #[test]
    fn voice_ownership_rule_format() {
        let catalog = AssetCatalog::builtin();
        let dog = catalog.character(&AssetId::from("MR_DOG")).unwrap();
        assert_eq!(
            dog.voice_ownership_rule(),
            "- Mr. Dog: says \"Oh boy, oh boy!\", \"Woof! Hello there!\", \"Whoa!\" - ONLY Mr. Dog uses these"
        );
    }
}
