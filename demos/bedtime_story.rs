/// Bedtime Story example: renders a short shelf of stories from the
/// built-in template bank and catalog.
///
/// A sequence: a kindness story with a fixed cast, a courage request that
/// the mapping table redirects, a spark-driven story with a drawn side
/// character, and three variants of one request.
///
/// Run with: cargo run --example bedtime_story
use rand::rngs::StdRng;
use rand::SeedableRng;
use storybook_engine::core::pipeline::{StoryEngine, StoryRequest};
use storybook_engine::schema::spark::StorySpark;
use storybook_engine::schema::story::RenderedStory;
use storybook_engine::schema::template::{Mood, Theme};

fn main() {
    let mut engine = StoryEngine::builder()
        .seed(2024)
        .build()
        .expect("Failed to build engine");

    // --- Kindness + Friendship, cast and objects fixed ---
    let request = StoryRequest::new(Mood::Kindness, Theme::Friendship, "MR_DOG")
        .with_side_character("SIR_WHISKERS")
        .with_objects(&["APPLE", "BOOK"]);
    print_story(&engine.generate(&request).expect("Failed to generate"));

    // --- Courage + Friendship: served from the kindness shelf ---
    let template = engine.select_template(Mood::Courage, Theme::Friendship, None);
    println!("Courage + Friendship selects '{}'\n", template.id);
    let request = StoryRequest::new(Mood::Courage, Theme::Friendship, "MS_COW");
    print_story(&engine.generate(&request).expect("Failed to generate"));

    // --- Spark-driven: the reader picked "Treasure Hunt" ---
    let spark = StorySpark::TreasureHunt;
    let theme = spark.theme(&mut StdRng::seed_from_u64(engine.seed()));
    println!("Spark '{}' maps to theme {}\n", spark, theme);
    let request = StoryRequest::new(Mood::Adventure, theme, "PROFESSOR_SEAL").with_page_count(5);
    print_story(&engine.generate(&request).expect("Failed to generate"));

    // --- Three takes on the same birthday ---
    let request = StoryRequest::new(Mood::Silly, Theme::Birthday, "SIR_WHISKERS")
        .with_objects(&["BALLOON", "CRAYON"]);
    let variants = engine
        .generate_variants(&request, 3)
        .expect("Failed to generate variants");
    for (i, story) in variants.iter().enumerate() {
        println!("--- Variant {} ---", i + 1);
        print_story(story);
    }

    println!("=== Character voices ===");
    for character in engine.catalog().characters() {
        println!("{}", character.voice_ownership_rule());
    }
}

fn print_story(story: &RenderedStory) {
    println!("=== {} ===  [{}]", story.title, story.template_id);
    for page in &story.pages {
        let images: Vec<&str> = page.images.iter().map(|id| id.as_str()).collect();
        println!("  {}. {}", page.page_number, page.text);
        println!("     art: {}", images.join(", "));
    }
    println!();
}
