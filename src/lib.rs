//! Storybook Engine: offline story-template rendering for personalized
//! children's story books.
//!
//! Turns a static bank of parameterized story templates into a finished
//! story for a chosen cast and set of objects, without any generative
//! model: a tiered template selector with an explicit semantic mapping
//! table, a closed placeholder language for names, pronouns, voice
//! phrases and objects, and controlled variant randomization.

pub mod core;
pub mod schema;

pub use crate::core::catalog::AssetCatalog;
pub use crate::core::pipeline::{EngineError, StoryEngine, StoryEngineBuilder, StoryRequest};
pub use crate::schema::story::{RenderedPage, RenderedStory};
pub use crate::schema::template::{Mood, StoryTemplate, TemplateBank, Theme};
