/// Template rendering: side-character assignment, variant picks and
/// placeholder substitution for one selected template.
use rand::Rng;

use crate::core::catalog::AssetCatalog;
use crate::core::substitute::PlaceholderSubstitutor;
use crate::core::variety::{pick_images, pick_text};
use crate::schema::asset::{Character, StoryObject};
use crate::schema::story::{RenderedPage, RenderedStory};
use crate::schema::template::StoryTemplate;

/// Renders templates against a catalog. Holds no state between calls.
#[derive(Debug, Clone, Copy)]
pub struct TemplateRenderer<'a> {
    catalog: &'a AssetCatalog,
}

impl<'a> TemplateRenderer<'a> {
    pub fn new(catalog: &'a AssetCatalog) -> Self {
        Self { catalog }
    }

    /// Render `template` into a story.
    ///
    /// Without a `side` character one is drawn from the catalog, never the
    /// main character unless it is the only one. With `enable_randomization`
    /// off, title, page text and image lists are the template originals and
    /// voice tokens take the first phrase of their category.
    pub fn render<R: Rng + ?Sized>(
        &self,
        template: &StoryTemplate,
        main: &Character,
        side: Option<&Character>,
        objects: &[StoryObject],
        enable_randomization: bool,
        rng: &mut R,
    ) -> RenderedStory {
        let side = match side {
            Some(side) => side,
            None => self.catalog.side_character_for(main, rng),
        };
        tracing::debug!(
            "Rendering '{}' with {} and {}",
            template.id,
            main.display_name,
            side.display_name
        );

        let substitutor =
            PlaceholderSubstitutor::new(main, side, objects).randomize_voice(enable_randomization);

        let title = pick_text(
            &template.title,
            &template.title_variants,
            enable_randomization,
            rng,
        );
        let title = substitutor.substitute_text(title, rng);

        let pages = template
            .pages
            .iter()
            .map(|page| {
                let text = pick_text(&page.text, &page.text_variants, enable_randomization, rng);
                let images = pick_images(
                    &page.suggested_images,
                    &page.image_variants,
                    enable_randomization,
                    rng,
                );
                RenderedPage {
                    page_number: page.page_number,
                    text: substitutor.substitute_text(text, rng),
                    images: substitutor.substitute_images(images),
                }
            })
            .collect();

        RenderedStory {
            title,
            pages,
            template_id: template.id.clone(),
        }
    }
}
