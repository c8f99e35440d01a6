//! Content renderers: raw page markup in, document body out.
//!
//! The replay engine only sees the [`Renderer`] trait. Each implementation
//! handles one markup dialect; all are stateless and reentrant so the
//! pipelined replay can render ahead of the committer on another thread.

pub mod markdown;
pub mod passthrough;
pub mod wikitext;

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

pub use markdown::MarkdownRenderer;
pub use passthrough::PassthroughRenderer;
pub use wikitext::WikitextRenderer;

/// The rendered body of one revision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Rendered output, not yet wrapped with the page header.
    pub body: String,
}

impl RenderedDocument {
    /// Wrap a rendered body.
    #[must_use]
    pub const fn new(body: String) -> Self {
        Self { body }
    }
}

/// Why a renderer could not produce a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderError {
    /// The markup bytes are not valid UTF-8.
    InvalidEncoding {
        /// Byte offset of the first invalid sequence.
        valid_up_to: usize,
    },

    /// The dialect rejected this markup.
    Markup {
        /// What was wrong with it.
        reason: String,
    },

    /// The renderer cannot render anything at all (missing backend, broken
    /// installation). Retrying the next revision would fail the same way.
    Unavailable {
        /// Details from the renderer.
        reason: String,
    },
}

impl RenderError {
    /// Whether this failure should stop the whole replay rather than skip
    /// one revision.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEncoding { valid_up_to } => {
                write!(f, "markup is not valid UTF-8 (first bad byte at offset {valid_up_to})")
            }
            Self::Markup { reason } => write!(f, "markup rejected: {reason}"),
            Self::Unavailable { reason } => write!(f, "renderer unavailable: {reason}"),
        }
    }
}

impl std::error::Error for RenderError {}

/// Converts one revision's raw markup into a document body.
pub trait Renderer: Send + Sync {
    /// Short dialect name, used in logs.
    fn name(&self) -> &'static str;

    /// Render `markup`.
    ///
    /// # Errors
    /// Returns a [`RenderError`]; see [`RenderError::is_fatal`] for how the
    /// engine treats each kind.
    fn render(&self, markup: &[u8]) -> Result<RenderedDocument, RenderError>;
}

/// Decode markup bytes as UTF-8, mapping failure to
/// [`RenderError::InvalidEncoding`].
pub(crate) fn decode(markup: &[u8]) -> Result<&str, RenderError> {
    std::str::from_utf8(markup).map_err(|e| RenderError::InvalidEncoding {
        valid_up_to: e.valid_up_to(),
    })
}

// ---------------------------------------------------------------------------
// RendererKind
// ---------------------------------------------------------------------------

/// Which renderer to replay with (selected from config or the command line).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// CommonMark → HTML.
    #[default]
    Markdown,
    /// `MediaWiki` wikitext → Markdown.
    Wikitext,
    /// Store the markup unchanged.
    Passthrough,
}

impl RendererKind {
    /// Construct the renderer for this kind.
    #[must_use]
    pub fn build(self) -> Box<dyn Renderer> {
        match self {
            Self::Markdown => Box::new(MarkdownRenderer::new()),
            Self::Wikitext => Box::new(WikitextRenderer::new()),
            Self::Passthrough => Box::new(PassthroughRenderer),
        }
    }
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Markdown => write!(f, "markdown"),
            Self::Wikitext => write!(f, "wikitext"),
            Self::Passthrough => write!(f, "passthrough"),
        }
    }
}

impl FromStr for RendererKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "markdown" => Ok(Self::Markdown),
            "wikitext" => Ok(Self::Wikitext),
            "passthrough" => Ok(Self::Passthrough),
            other => Err(format!(
                "unknown renderer '{other}' (expected markdown, wikitext or passthrough)"
            )),
        }
    }
}
