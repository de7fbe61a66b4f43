pub mod catalog;
pub mod config;
pub mod pipeline;
pub mod placeholder;
pub mod renderer;
pub mod selector;
pub mod substitute;
pub mod variety;
pub mod voice;
