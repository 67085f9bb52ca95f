//! Weather map gallery.
//!
//! Each recipe is a linear pipeline: request data from a remote service,
//! derive a field, render a map and write it as PNG.

pub mod config;
pub mod recipes;

pub use config::GalleryConfig;
pub use recipes::{Recipe, RecipeOptions};
