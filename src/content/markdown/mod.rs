//! Markdown rendering pipeline
//!
//! parse → element tree → figure captions → syntax highlighting → HTML.
//! Each stage consumes the tree produced by the previous one and is
//! usable on its own.

mod figure;
mod highlight;
pub mod tree;

use pulldown_cmark::{Options, Parser};
use thiserror::Error;

use crate::config::HighlightConfig;
use crate::error::RenderStage;

pub use figure::wrap_captioned_images;
pub use highlight::Highlighter;
pub use tree::{Element, Node};

/// A failed render, tagged with the stage that failed
#[derive(Error, Debug)]
#[error("{stage} stage failed: {message}")]
pub struct RenderError {
    pub stage: RenderStage,
    pub message: String,
}

impl RenderError {
    pub fn new(stage: RenderStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

/// Turns a post's markdown body into HTML
pub trait Renderer: Send + Sync {
    fn render(&self, markdown: &str) -> Result<String, RenderError>;
}

/// Markdown renderer with figure captions and syntax highlighting
pub struct MarkdownRenderer {
    options: Options,
    highlighter: Option<Highlighter>,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options(&HighlightConfig::default())
    }

    /// Create with custom highlight settings
    pub fn with_options(highlight: &HighlightConfig) -> Self {
        // YAML metadata blocks stay disabled; front-matter is split off beforehand
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_DEFINITION_LIST
            | Options::ENABLE_GFM;

        let highlighter = if highlight.enable {
            Highlighter::new(highlight)
        } else {
            None
        };

        Self {
            options,
            highlighter,
        }
    }

    /// Render markdown to HTML; any stage failing fails the whole render
    pub fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let tree = self.parse(markdown)?;
        let tree = wrap_captioned_images(tree);
        let tree = self.highlight(tree)?;
        Ok(tree::to_html(&tree))
    }

    /// Parse markdown into the element tree, before any transform
    pub fn parse(&self, markdown: &str) -> Result<Vec<Node>, RenderError> {
        let events = Parser::new_ext(markdown, self.options);
        tree::TreeBuilder::new()
            .build(events)
            .map_err(|message| RenderError::new(RenderStage::Tree, message))
    }

    fn highlight(&self, tree: Vec<Node>) -> Result<Vec<Node>, RenderError> {
        match &self.highlighter {
            Some(highlighter) => highlighter
                .highlight(tree)
                .map_err(|e| RenderError::new(RenderStage::Highlight, e.to_string())),
            None => Ok(tree),
        }
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        MarkdownRenderer::render(self, markdown)
    }
}

/// A renderer whose highlight stage always fails
#[cfg(test)]
pub(crate) struct FailingRenderer;

#[cfg(test)]
impl Renderer for FailingRenderer {
    fn render(&self, _markdown: &str) -> Result<String, RenderError> {
        Err(RenderError::new(RenderStage::Highlight, "theme exploded"))
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}
