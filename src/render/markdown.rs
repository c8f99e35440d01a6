//! CommonMark → HTML renderer.

use pulldown_cmark::{Options, Parser, html};

use super::{RenderError, RenderedDocument, Renderer, decode};

/// Renders CommonMark (with tables, footnotes, strikethrough and task lists)
/// to an HTML fragment.
pub struct MarkdownRenderer {
    options: Options,
}

impl MarkdownRenderer {
    #[must_use]
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        Self { options }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for MarkdownRenderer {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn render(&self, markup: &[u8]) -> Result<RenderedDocument, RenderError> {
        let source = decode(markup)?;
        let mut body = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut body, Parser::new_ext(source, self.options));
        Ok(RenderedDocument::new(body))
    }
}
