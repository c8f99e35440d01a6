//! Stores markup unchanged.

use super::{RenderError, RenderedDocument, Renderer, decode};

/// Copies the markup through as the document body after checking that it is
/// UTF-8.
pub struct PassthroughRenderer;

impl Renderer for PassthroughRenderer {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn render(&self, markup: &[u8]) -> Result<RenderedDocument, RenderError> {
        decode(markup).map(|s| RenderedDocument::new(s.to_owned()))
    }
}
