/// Preview: interactive shell for rendering stories from a template bank.
///
/// Usage: preview [--templates <path>] [--catalog <path>] [--config <path>] [--seed <n>]
///
/// Commands:
///   story <mood> <theme> <character>  : render one story
///   spark <spark> <mood> <character>  : render from a story spark
///   side <id|none>                    : fix or clear the side character
///   objects <id,id,...|none>          : fix or clear the object list
///   pages <n|none>                    : preferred page count
///   random <on|off>                   : toggle variant randomization
///   seed <n>                          : set RNG seed
///   bulk <n> <mood> <theme> <character>: render n stories with variety stats
///   moods | themes | sparks | characters | objects | combos: listings
///   help                              : list commands
///   quit                              : exit
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashSet};
use std::io::{self, BufRead, Write};
use std::path::Path;
use storybook_engine::core::config::EngineConfig;
use storybook_engine::core::pipeline::{StoryEngine, StoryRequest};
use storybook_engine::schema::asset::AssetId;
use storybook_engine::schema::spark::StorySpark;
use storybook_engine::schema::story::RenderedStory;
use storybook_engine::schema::template::{Mood, Theme};
use tracing_subscriber::EnvFilter;

struct Session {
    config: EngineConfig,
    side: Option<AssetId>,
    objects: Vec<AssetId>,
    page_count: Option<u32>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    let mut config = EngineConfig {
        seed: 42,
        ..EngineConfig::default()
    };
    let mut seed_override = None;
    let mut templates_override = None;
    let mut catalog_override = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--templates" if i + 1 < args.len() => {
                i += 1;
                templates_override = Some(args[i].clone());
            }
            "--catalog" if i + 1 < args.len() => {
                i += 1;
                catalog_override = Some(args[i].clone());
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                match EngineConfig::load_from_ron(Path::new(&args[i])) {
                    Ok(loaded) => config = loaded,
                    Err(e) => {
                        eprintln!("ERROR loading config {}: {}", args[i], e);
                        std::process::exit(1);
                    }
                }
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed_override = Some(args[i].parse().unwrap_or(42));
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }
    if let Some(path) = templates_override {
        config.templates_path = Some(path);
    }
    if let Some(path) = catalog_override {
        config.catalog_path = Some(path);
    }
    if let Some(seed) = seed_override {
        config.seed = seed;
    }

    let mut engine = match build_engine(&config) {
        Some(engine) => engine,
        None => std::process::exit(1),
    };
    println!(
        "Loaded {} templates (v{}), {} characters, {} objects",
        engine.templates().len(),
        engine.templates().version(),
        engine.catalog().characters().len(),
        engine.catalog().objects().len()
    );
    println!("Seed: {}", config.seed);
    println!("Type 'help' for commands.\n");

    let mut session = Session {
        config,
        side: None,
        objects: Vec::new(),
        page_count: None,
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("preview> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => print_help(),
            "story" => {
                if parts.len() < 4 {
                    println!("Usage: story <mood> <theme> <character>");
                    continue;
                }
                let (Some(mood), Some(theme)) = (parse_mood(parts[1]), parse_theme(parts[2]))
                else {
                    continue;
                };
                let request = session.request(mood, theme, parts[3]);
                match engine.generate(&request) {
                    Ok(story) => print_story(&story),
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "spark" => {
                if parts.len() < 4 {
                    println!("Usage: spark <spark> <mood> <character>");
                    println!("  sparks: {}", spark_names());
                    continue;
                }
                let Some(spark) = StorySpark::parse(parts[1]) else {
                    println!("Unknown spark: {}", parts[1]);
                    continue;
                };
                let Some(mood) = parse_mood(parts[2]) else {
                    continue;
                };
                let mut rng = StdRng::seed_from_u64(
                    session.config.seed.wrapping_add(engine.generation_count()),
                );
                let theme = spark.theme(&mut rng);
                println!("[{}] → theme {}", spark, theme);
                let request = session.request(mood, theme, parts[3]);
                match engine.generate(&request) {
                    Ok(story) => print_story(&story),
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "side" => {
                match parts.get(1) {
                    None => println!(
                        "Side character: {}",
                        session.side.as_ref().map_or("auto", AssetId::as_str)
                    ),
                    Some(&"none") | Some(&"auto") => {
                        session.side = None;
                        println!("Side character cleared.");
                    }
                    Some(id) => {
                        let id = asset_id(id);
                        if engine.catalog().character(&id).is_some() {
                            println!("Side character set to {}", id);
                            session.side = Some(id);
                        } else {
                            println!("Unknown character: {}", id);
                        }
                    }
                }
            }
            "objects" if parts.len() >= 2 => {
                if parts[1] == "none" {
                    session.objects.clear();
                    println!("Objects cleared; each story draws {}.", session.config.object_count);
                    continue;
                }
                let ids: Vec<AssetId> = parts[1]
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(asset_id)
                    .collect();
                if let Some(unknown) = ids.iter().find(|id| engine.catalog().object(id).is_none()) {
                    println!("Unknown object: {}", unknown);
                    continue;
                }
                println!(
                    "Objects set to {}",
                    ids.iter().map(AssetId::as_str).collect::<Vec<_>>().join(", ")
                );
                session.objects = ids;
            }
            "pages" => match parts.get(1) {
                None => println!("Preferred page count: {:?}", session.page_count),
                Some(&"none") => {
                    session.page_count = None;
                    println!("Preferred page count cleared.");
                }
                Some(n) => match n.parse::<u32>() {
                    Ok(n) => {
                        session.page_count = Some(n);
                        println!("Preferred page count set to {}", n);
                    }
                    Err(_) => println!("Invalid page count: {}", n),
                },
            },
            "random" => match parts.get(1).map(|s| s.to_lowercase()) {
                Some(ref s) if s == "on" => {
                    engine.set_randomization(true);
                    println!("Randomization on.");
                }
                Some(ref s) if s == "off" => {
                    engine.set_randomization(false);
                    println!("Randomization off.");
                }
                _ => println!("Randomization is {}", if engine.randomization() { "on" } else { "off" }),
            },
            "seed" => {
                if parts.len() < 2 {
                    println!("Current seed: {}", session.config.seed);
                    continue;
                }
                match parts[1].parse::<u64>() {
                    Ok(s) => {
                        session.config.seed = s;
                        session.config.randomization = engine.randomization();
                        if let Some(rebuilt) = build_engine(&session.config) {
                            engine = rebuilt;
                            println!("Seed set to {}", s);
                        }
                    }
                    Err(_) => println!("Invalid seed: {}", parts[1]),
                }
            }
            "bulk" => {
                if parts.len() < 5 {
                    println!("Usage: bulk <n> <mood> <theme> <character>");
                    continue;
                }
                let count: usize = match parts[1].parse() {
                    Ok(n) if n > 0 => n,
                    _ => {
                        println!("Invalid count: {}", parts[1]);
                        continue;
                    }
                };
                let (Some(mood), Some(theme)) = (parse_mood(parts[2]), parse_theme(parts[3]))
                else {
                    continue;
                };
                session.config.randomization = engine.randomization();
                let Some(mut bulk_engine) = build_engine(&session.config) else {
                    continue;
                };
                let request = session.request(mood, theme, parts[4]);
                run_bulk(&mut bulk_engine, &request, count);
            }
            "moods" => {
                for mood in Mood::ALL {
                    println!("  {:<12} {}", mood.name(), mood.description());
                }
            }
            "themes" => {
                for theme in Theme::ALL {
                    println!("  {:<12} {}", theme.name(), theme.description());
                }
            }
            "sparks" => println!("  {}", spark_names()),
            "characters" => {
                for character in engine.catalog().characters() {
                    println!(
                        "  {:<16} {} ({})",
                        character.id.as_str(),
                        character.display_name,
                        character.pronouns.label()
                    );
                    println!("  {:<16} {}", "", character.voice_ownership_rule());
                }
            }
            "objects" => {
                for object in engine.catalog().objects() {
                    println!(
                        "  {:<12} {}",
                        object.id.as_str(),
                        object.display_name_with_article
                    );
                }
            }
            "combos" => {
                let mut counts: BTreeMap<(Mood, Theme), usize> = BTreeMap::new();
                for combo in engine.templates().available_combinations() {
                    *counts.entry(combo).or_insert(0) += 1;
                }
                for ((mood, theme), n) in counts {
                    println!("  {} + {}: {}", mood, theme, n);
                }
                println!("Mappings:");
                let mut mappings: Vec<_> = engine.mappings().iter().collect();
                mappings.sort_by_key(|(from, _)| (from.mood, from.theme));
                for (from, to) in mappings {
                    println!("  {} + {} → {} + {}", from.mood, from.theme, to.mood, to.theme);
                }
            }
            _ => {
                println!("Unknown command: '{}'. Type 'help' for available commands.", cmd);
            }
        }
    }
}

impl Session {
    fn request(&self, mood: Mood, theme: Theme, character: &str) -> StoryRequest {
        StoryRequest {
            mood,
            theme,
            main_character: asset_id(character),
            side_character: self.side.clone(),
            objects: self.objects.clone(),
            page_count: self.page_count,
        }
    }
}

fn run_bulk(engine: &mut StoryEngine, request: &StoryRequest, count: usize) {
    let mut stories = Vec::new();
    let mut errors = 0;
    for _ in 0..count {
        match engine.generate(request) {
            Ok(story) => stories.push(story),
            Err(_) => errors += 1,
        }
    }

    println!("\n=== Bulk Generation: {} stories ({} errors) ===\n", stories.len(), errors);

    let titles: HashSet<&str> = stories.iter().map(|s| s.title.as_str()).collect();
    println!("Unique titles: {} / {}", titles.len(), stories.len());

    let openings: HashSet<&str> = stories
        .iter()
        .filter_map(|s| s.pages.first())
        .map(|p| p.text.as_str())
        .collect();
    println!("Unique first pages: {} / {}", openings.len(), stories.len());

    let mut by_template: BTreeMap<&str, u32> = BTreeMap::new();
    for story in &stories {
        *by_template.entry(story.template_id.as_str()).or_insert(0) += 1;
    }
    println!("\nTemplates used:");
    for (id, n) in &by_template {
        println!("  {}: {}", id, n);
    }

    let mut assets: BTreeMap<&str, u32> = BTreeMap::new();
    for story in &stories {
        for id in story.referenced_assets() {
            *assets.entry(id.as_str()).or_insert(0) += 1;
        }
    }
    println!("\nAssets referenced:");
    for (id, n) in &assets {
        println!("  {}: {}", id, n);
    }

    if let Some(first) = stories.first() {
        println!("\nSample story:");
        print_story(first);
    }
    println!();
}

fn print_story(story: &RenderedStory) {
    println!("\n=== {} ===", story.title);
    for page in &story.pages {
        let images: Vec<&str> = page.images.iter().map(AssetId::as_str).collect();
        println!("[{}] {}", page.page_number, page.text);
        println!("     images: [{}]", images.join(", "));
    }
    println!("[Trace] template={}\n", story.template_id);
}

fn print_usage() {
    println!("Preview: interactive shell for rendering stories from a template bank.");
    println!();
    println!("Usage: preview [--templates <path>] [--catalog <path>] [--config <path>] [--seed <n>]");
    println!();
    println!("  --templates <path>  Template document (.json or .ron; default: built-in bank)");
    println!("  --catalog <path>    Asset catalog in RON (default: built-in catalog)");
    println!("  --config <path>     Engine config in RON");
    println!("  --seed <n>          Initial RNG seed (default: 42)");
}

fn print_help() {
    println!("Commands:");
    println!("  story <mood> <theme> <character>     Render one story");
    println!("  spark <spark> <mood> <character>     Render from a story spark");
    println!("  side <id|none>                       Fix or clear the side character");
    println!("  objects <id,id,...|none>             Fix or clear the object list");
    println!("  pages <n|none>                       Preferred page count");
    println!("  random <on|off>                      Toggle variant randomization");
    println!("  seed <n>                             Set RNG seed");
    println!("  bulk <n> <mood> <theme> <character>  Render n stories with variety statistics");
    println!("  moods, themes, sparks, characters, objects, combos");
    println!("  help                                 Show this help");
    println!("  quit                                 Exit");
}

fn build_engine(config: &EngineConfig) -> Option<StoryEngine> {
    match StoryEngine::builder().from_config(config).build() {
        Ok(engine) => Some(engine),
        Err(e) => {
            eprintln!("ERROR building engine: {}", e);
            None
        }
    }
}

fn parse_mood(s: &str) -> Option<Mood> {
    let mood = s.parse().ok();
    if mood.is_none() {
        println!("Unknown mood: {} (try 'moods')", s);
    }
    mood
}

fn parse_theme(s: &str) -> Option<Theme> {
    let theme = s.parse().ok();
    if theme.is_none() {
        println!("Unknown theme: {} (try 'themes')", s);
    }
    theme
}

fn asset_id(s: &str) -> AssetId {
    AssetId::from(s.to_ascii_uppercase())
}

fn spark_names() -> String {
    StorySpark::ALL
        .iter()
        .map(|s| format!("{s:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}
