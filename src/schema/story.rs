use serde::{Deserialize, Serialize};

use super::asset::AssetId;

/// A single page after rendering: final text plus the asset ids to draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedPage {
    pub page_number: u32,
    pub text: String,
    pub images: Vec<AssetId>,
}

/// The output of one render call. Owned by the caller; nothing in the
/// engine keeps a reference to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedStory {
    pub title: String,
    pub pages: Vec<RenderedPage>,
    /// Id of the template this story came from.
    pub template_id: String,
}

impl RenderedStory {
    /// Every asset id referenced by any page, first occurrence order.
    pub fn referenced_assets(&self) -> Vec<&AssetId> {
        let mut seen: Vec<&AssetId> = Vec::new();
        for id in self.pages.iter().flat_map(|p| p.images.iter()) {
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
        seen
    }
}
