pub mod asset;
pub mod spark;
pub mod story;
pub mod template;
