/// Rendering integration tests: fixture catalogs and banks through the
/// renderer and the engine.
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use storybook_engine::core::catalog::AssetCatalog;
use storybook_engine::core::placeholder::Placeholder;
use storybook_engine::core::renderer::TemplateRenderer;
use storybook_engine::core::selector::{SelectionTier, SemanticMappings, TemplateSelector};
use storybook_engine::schema::asset::{AssetId, AssetSize, StoryObject};
use storybook_engine::schema::template::{Mood, TemplateBank, Theme};
use storybook_engine::{StoryEngine, StoryRequest};

fn fixture_catalog() -> AssetCatalog {
    AssetCatalog::load_from_ron(Path::new("tests/fixtures/test_catalog.ron")).unwrap()
}

fn fixture_bank() -> TemplateBank {
    TemplateBank::load(Path::new("tests/fixtures/test_templates.json")).unwrap()
}

fn fixture_engine(seed: u64, randomization: bool) -> StoryEngine {
    StoryEngine::builder()
        .seed(seed)
        .randomization(randomization)
        .with_catalog(fixture_catalog())
        .with_templates(fixture_bank())
        .build()
        .unwrap()
}

#[test]
fn fixture_catalog_loads() {
    let catalog = fixture_catalog();
    assert_eq!(catalog.characters().len(), 3);
    assert_eq!(catalog.objects().len(), 4);

    let mimi = catalog.character(&AssetId::from("CAT")).unwrap();
    assert_eq!(mimi.size, AssetSize::Small);
    assert_eq!(mimi.voice.first(storybook_engine::core::voice::VoiceCategory::Farewell), "Goodbye!");

    let apple = catalog.object(&AssetId::from("APPLE")).unwrap();
    assert_eq!(apple.display_name_with_article, "an apple");
    let hourglass = catalog.object(&AssetId::from("HOURGLASS")).unwrap();
    assert_eq!(hourglass.display_name_with_article, "an hourglass");
    let kite = catalog.object(&AssetId::from("KITE")).unwrap();
    assert_eq!(kite.display_name_with_article, "a kite");
    assert_eq!(catalog.size_for_image("kite"), AssetSize::Large);
}

#[test]
fn rex_helps_mimi_end_to_end() {
    let catalog = fixture_catalog();
    let bank = fixture_bank();
    let template = bank.get("kindness_friendship_a").unwrap();
    let rex = catalog.character(&AssetId::from("DOG")).unwrap();
    let mimi = catalog.character(&AssetId::from("CAT")).unwrap();
    let apple = catalog.object(&AssetId::from("APPLE")).unwrap().clone();

    let mut rng = StdRng::seed_from_u64(0);
    let story = TemplateRenderer::new(&catalog).render(
        template,
        rex,
        Some(mimi),
        &[apple],
        false,
        &mut rng,
    );

    assert_eq!(story.title, "Rex helps Mimi");
    assert_eq!(story.pages.len(), 1);
    assert_eq!(story.pages[0].text, "Rex found an apple.");
    assert_eq!(story.pages[0].images, vec![AssetId::from("DOG")]);
    assert_eq!(story.template_id, "kindness_friendship_a");
}

#[test]
fn engine_end_to_end() {
    let mut engine = fixture_engine(123, false);
    let request = StoryRequest::new(Mood::Kindness, Theme::Friendship, "DOG")
        .with_side_character("CAT")
        .with_objects(&["APPLE"])
        .with_page_count(1);
    let story = engine.generate(&request).unwrap();
    assert_eq!(story.title, "Rex helps Mimi");
    assert_eq!(story.pages[0].text, "Rex found an apple.");
    assert_eq!(story.pages[0].images, vec![AssetId::from("DOG")]);
}

#[test]
fn disabled_randomization_ignores_seed() {
    let request = StoryRequest::new(Mood::Kindness, Theme::Friendship, "ROBOT")
        .with_side_character("CAT")
        .with_objects(&["UMBRELLA"])
        .with_page_count(1);
    let mut first = fixture_engine(1, false);
    let mut second = fixture_engine(999, false);
    for _ in 0..5 {
        assert_eq!(
            first.generate(&request).unwrap(),
            second.generate(&request).unwrap()
        );
    }
}

#[test]
fn randomization_uses_variants() {
    let mut engine = fixture_engine(5, true);
    let request = StoryRequest::new(Mood::Kindness, Theme::Friendship, "DOG")
        .with_side_character("CAT")
        .with_objects(&["APPLE"])
        .with_page_count(1);
    let mut titles = std::collections::HashSet::new();
    let mut texts = std::collections::HashSet::new();
    let mut image_sets = std::collections::HashSet::new();
    for _ in 0..100 {
        let story = engine.generate(&request).unwrap();
        titles.insert(story.title);
        texts.insert(story.pages[0].text.clone());
        image_sets.insert(story.pages[0].images.clone());
    }
    assert_eq!(titles.len(), 2);
    assert!(texts.contains("Rex spotted an apple by the gate."));
    assert!(image_sets.contains(&vec![AssetId::from("CAT"), AssetId::from("APPLE")]));
    assert!(image_sets.contains(&vec![AssetId::from("DOG")]));
}

#[test]
fn auto_side_character_never_main() {
    let catalog = fixture_catalog();
    let bank = fixture_bank();
    let template = bank.get("kindness_friendship_b").unwrap();
    let renderer = TemplateRenderer::new(&catalog);
    for main in catalog.characters() {
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let story = renderer.render(template, main, None, catalog.objects(), true, &mut rng);
            // Page 2 images hold only the side character
            let side = &story.pages[1].images[0];
            assert_ne!(side, &main.id);
            assert!(catalog.character(side).is_some());
        }
    }
}

#[test]
fn custom_pronouns_from_catalog() {
    let mut engine = fixture_engine(0, false);
    let request = StoryRequest::new(Mood::Kindness, Theme::Friendship, "CAT")
        .with_side_character("ROBOT")
        .with_objects(&["KITE"])
        .with_page_count(2);
    let story = engine.generate(&request).unwrap();
    assert_eq!(story.title, "Sharing with Pip");
    assert_eq!(story.pages[0].text, "Mimi gave Pip the kite.");
    assert_eq!(story.pages[1].text, "xe smiled at her.");
}

#[test]
fn missing_objects_and_unknown_tokens_degrade() {
    let mut engine = fixture_engine(2, false);

    // Three object slots, one object supplied.
    let request =
        StoryRequest::new(Mood::Silly, Theme::Adventure, "DOG").with_objects(&["HOURGLASS"]);
    let story = engine.generate(&request).unwrap();
    assert_eq!(story.pages[0].text, "Rex juggled an hourglass,  and .");
    assert_eq!(
        story.pages[0].images,
        vec![AssetId::from("DOG"), AssetId::from("HOURGLASS")]
    );

    // Unknown text token stays, unknown image token is dropped,
    // literal ids pass through.
    let request = StoryRequest::new(Mood::Mystery, Theme::Birthday, "DOG");
    let story = engine.generate(&request).unwrap();
    assert_eq!(story.pages[0].text, "Someone hid his cake. Was it {{DRAGON}}?");
    assert_eq!(
        story.pages[0].images,
        vec![AssetId::from("DOG"), AssetId::from("CAKE")]
    );
}

#[test]
fn literal_image_ids_pass_through() {
    let mut engine = fixture_engine(4, false);
    let request = StoryRequest::new(Mood::Fantasy, Theme::Learning, "CAT");
    let story = engine.generate(&request).unwrap();
    assert_eq!(story.pages[0].text, "Mimi read a spell. \"Purrfect!\"");
    assert_eq!(
        story.pages[0].images,
        vec![AssetId::from("CAT"), AssetId::from("sparkles")]
    );
}

#[test]
fn builtin_bank_renders_closed() {
    let catalog = AssetCatalog::builtin();
    let bank = TemplateBank::builtin().unwrap();
    let renderer = TemplateRenderer::new(&catalog);
    let objects: Vec<StoryObject> = catalog.objects()[..3].to_vec();
    let tokens: Vec<String> = Placeholder::all().iter().map(|p| p.token()).collect();

    for template in bank.templates() {
        for main in catalog.characters() {
            for seed in 0..5 {
                let mut rng = StdRng::seed_from_u64(seed);
                let story = renderer.render(template, main, None, &objects, true, &mut rng);
                let texts = std::iter::once(&story.title).chain(story.pages.iter().map(|p| &p.text));
                for text in texts {
                    assert!(!text.contains("{{"), "{}: {}", template.id, text);
                    for token in &tokens {
                        assert!(!text.contains(token.as_str()));
                    }
                }
                for page in &story.pages {
                    assert!(!page.images.is_empty(), "{} page {}", template.id, page.page_number);
                    for id in &page.images {
                        assert!(catalog.contains(id), "{}: {}", template.id, id);
                    }
                }
            }
        }
    }
}

#[test]
fn builtin_bank_page_counts_match() {
    let bank = TemplateBank::builtin().unwrap();
    for template in bank.templates() {
        if let Some(count) = template.page_count {
            assert_eq!(count as usize, template.pages.len(), "{}", template.id);
        }
        let numbers: Vec<u32> = template.pages.iter().map(|p| p.page_number).collect();
        let expected: Vec<u32> = (1..=template.pages.len() as u32).collect();
        assert_eq!(numbers, expected, "{}", template.id);
    }
}

#[test]
fn builtin_mapping_targets_exist() {
    let bank = TemplateBank::builtin().unwrap();
    let combos = bank.available_combinations();
    let mappings = SemanticMappings::default();
    assert_eq!(mappings.len(), 2);
    for (_, to) in mappings.iter() {
        assert!(
            combos.contains(&(to.mood, to.theme)),
            "no template for {} + {}",
            to.mood,
            to.theme
        );
    }

    // No default redirect shadows a template the bank actually carries.
    let selector = TemplateSelector::new(&bank, &mappings);
    let mut rng = StdRng::seed_from_u64(0);
    for (mood, theme) in combos {
        let (picked, tier) = selector.select_with_tier(mood, theme, None, &mut rng);
        assert_eq!((picked.mood, picked.theme), (mood, theme));
        assert_eq!(tier, SelectionTier::Exact, "{} + {}", mood, theme);
    }
}

#[test]
fn variants_differ() {
    let mut engine = StoryEngine::builder().seed(77).build().unwrap();
    let request = StoryRequest::new(Mood::Adventure, Theme::Adventure, "MR_DOG");
    let variants = engine.generate_variants(&request, 6).unwrap();
    assert_eq!(variants.len(), 6);
    let distinct: std::collections::HashSet<String> = variants
        .iter()
        .map(|s| serde_json::to_string(s).unwrap())
        .collect();
    assert!(distinct.len() > 1);
}
