/// Template Linter: validates a template bank's placeholders, page layout
/// and mood/theme coverage.
///
/// Usage: template_linter [<templates.json|templates.ron>] [--catalog <catalog.ron>] [--mappings <mappings.ron>]
///
/// With no template path the built-in bank is checked.
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::path::Path;
use std::process;
use storybook_engine::core::catalog::AssetCatalog;
use storybook_engine::core::config::load_mappings;
use storybook_engine::core::placeholder::{contains_placeholder_syntax, unknown_tokens, Placeholder};
use storybook_engine::core::selector::{SelectionTier, SemanticMappings, TemplateSelector};
use storybook_engine::schema::asset::AssetId;
use storybook_engine::schema::template::{Mood, StoryTemplate, TemplateBank, Theme};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!(
            "Usage: template_linter [<templates.json|templates.ron>] [--catalog <catalog.ron>] [--mappings <mappings.ron>]"
        );
        process::exit(0);
    }

    let mut templates_path = None;
    let mut catalog_path = None;
    let mut mappings_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--catalog" if i + 1 < args.len() => {
                i += 1;
                catalog_path = Some(args[i].clone());
            }
            "--mappings" if i + 1 < args.len() => {
                i += 1;
                mappings_path = Some(args[i].clone());
            }
            other if templates_path.is_none() && !other.starts_with("--") => {
                templates_path = Some(other.to_string());
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let bank = match &templates_path {
        Some(path) => TemplateBank::load(Path::new(path)),
        None => TemplateBank::builtin(),
    };
    let bank = match bank {
        Ok(bank) => bank,
        Err(e) => {
            eprintln!("ERROR: Failed to load templates: {}", e);
            process::exit(1);
        }
    };

    let catalog = match &catalog_path {
        Some(path) => match AssetCatalog::load_from_ron(Path::new(path)) {
            Ok(catalog) => catalog,
            Err(e) => {
                eprintln!("ERROR: Failed to load catalog: {}", e);
                process::exit(1);
            }
        },
        None => AssetCatalog::builtin(),
    };

    let mappings = match &mappings_path {
        Some(path) => match load_mappings(Path::new(path)) {
            Ok(mappings) => mappings,
            Err(e) => {
                eprintln!("ERROR: Failed to load mappings: {}", e);
                process::exit(1);
            }
        },
        None => SemanticMappings::default(),
    };

    println!("Loaded {} templates (v{})", bank.len(), bank.version());

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    for template in bank.templates() {
        lint_template(template, &catalog, &mut errors, &mut warnings);
    }
    lint_coverage(&bank, &mappings, &mut warnings);

    println!("\n=== Template Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn lint_template(
    template: &StoryTemplate,
    catalog: &AssetCatalog,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    let id = &template.id;

    for (label, text) in std::iter::once(("title", &template.title))
        .chain(template.title_variants.iter().map(|t| ("title variant", t)))
    {
        for token in unknown_tokens(text) {
            errors.push(format!("{}: unknown token {} in {}", id, token, label));
        }
    }

    if template.pages.is_empty() {
        errors.push(format!("{}: template has no pages", id));
        return;
    }

    let mut seen = HashSet::new();
    for page in &template.pages {
        if !seen.insert(page.page_number) {
            errors.push(format!("{}: duplicate page number {}", id, page.page_number));
        }

        let texts = std::iter::once(&page.text).chain(page.text_variants.iter());
        for text in texts {
            for token in unknown_tokens(text) {
                errors.push(format!(
                    "{}: page {}: unknown token {}",
                    id, page.page_number, token
                ));
            }
        }

        let image_lists =
            std::iter::once(&page.suggested_images).chain(page.image_variants.iter());
        for images in image_lists {
            for token in images {
                lint_image_token(id, page.page_number, token, catalog, errors, warnings);
            }
        }
    }

    let expected: Vec<u32> = (1..=template.pages.len() as u32).collect();
    let actual: Vec<u32> = template.pages.iter().map(|p| p.page_number).collect();
    if actual != expected {
        warnings.push(format!(
            "{}: page numbers {:?} are not 1..{} in order",
            id,
            actual,
            template.pages.len()
        ));
    }

    if let Some(count) = template.page_count {
        if count as usize != template.pages.len() {
            warnings.push(format!(
                "{}: declares pageCount {} but has {} pages",
                id,
                count,
                template.pages.len()
            ));
        }
    }
}

fn lint_image_token(
    template_id: &str,
    page_number: u32,
    token: &str,
    catalog: &AssetCatalog,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    let token = token.trim();
    if token.is_empty() {
        warnings.push(format!("{}: page {}: empty image token", template_id, page_number));
        return;
    }
    match Placeholder::from_token(token) {
        Some(Placeholder::Name(_)) | Some(Placeholder::Object { .. }) => {}
        Some(other) => warnings.push(format!(
            "{}: page {}: {} never resolves to an image",
            template_id, page_number, other
        )),
        None if contains_placeholder_syntax(token) => errors.push(format!(
            "{}: page {}: unknown image token {}",
            template_id, page_number, token
        )),
        None => {
            if !catalog.contains(&AssetId::from(token)) {
                warnings.push(format!(
                    "{}: page {}: literal asset '{}' is not in the catalog",
                    template_id, page_number, token
                ));
            }
        }
    }
}

fn lint_coverage(bank: &TemplateBank, mappings: &SemanticMappings, warnings: &mut Vec<String>) {
    let combos: HashSet<(Mood, Theme)> = bank.available_combinations().into_iter().collect();

    let mut dead: Vec<_> = mappings
        .iter()
        .filter(|(_, to)| !combos.contains(&(to.mood, to.theme)))
        .collect();
    dead.sort_by_key(|(from, _)| (from.mood, from.theme));
    for (from, to) in dead {
        warnings.push(format!(
            "mapping {} + {} → {} + {} has no target templates",
            from.mood, from.theme, to.mood, to.theme
        ));
    }

    let selector = TemplateSelector::new(bank, mappings);
    let mut rng = StdRng::seed_from_u64(0);
    let mut gaps = Vec::new();
    for mood in Mood::ALL {
        for theme in Theme::ALL {
            let (_, tier) = selector.select_with_tier(mood, theme, None, &mut rng);
            if matches!(tier, SelectionTier::ThemeOnly | SelectionTier::Any) {
                gaps.push(format!("{} + {} ({:?})", mood, theme, tier));
            }
        }
    }
    let missing_moods: Vec<&str> = Mood::ALL
        .iter()
        .filter(|m| !combos.iter().any(|(cm, _)| cm == *m))
        .map(|m| m.name())
        .collect();
    if !missing_moods.is_empty() {
        warnings.push(format!("no templates for moods: {}", missing_moods.join(", ")));
    }
    if !gaps.is_empty() {
        warnings.push(format!(
            "{} of {} mood/theme pairs fall back past mood matching: {}",
            gaps.len(),
            Mood::ALL.len() * Theme::ALL.len(),
            gaps.join(", ")
        ));
    }
}
