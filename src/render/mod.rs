//! Renderer module — trait-based format dispatch.

pub mod json;
pub mod lua;

use crate::model::Docs;
use anyhow::{anyhow, Result};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("class {class} inherits from unknown class {parent}")]
    UnknownParent { class: String, parent: String },

    #[error("failed to serialize documentation: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Trait for rendering collected docs into a specific output format.
pub trait Renderer {
    fn render(&self, docs: &Docs) -> Result<String, RenderError>;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>> {
    match format {
        "lua" => Ok(Box::new(lua::LuaRenderer)),
        "json" => Ok(Box::new(json::JsonRenderer)),
        _ => Err(anyhow!("unknown format: {}. Use lua or json", format)),
    }
}
