//! `MediaWiki` wikitext → Markdown renderer.
//!
//! Covers the constructs that make up the bulk of real wiki pages: section
//! headings, bold/italic quote runs, internal and external links, bulleted
//! and numbered lists, definition terms, indentation, preformatted lines,
//! horizontal rules and `<nowiki>` spans. Anything else (templates, tables,
//! parser functions) is carried through verbatim.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{RenderError, RenderedDocument, Renderer, decode};
use crate::slug::slugify;

static NOWIKI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<nowiki>(.*?)</nowiki>").expect("static regex"));
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(=+)\s*(.*?)\s*(=+)\s*$").expect("static regex"));
static RULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-{4,}\s*$").expect("static regex"));
static LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([*#:;]+)\s*(.*)$").expect("static regex"));
static BOLD_ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'''''(.+?)'''''").expect("static regex"));
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'''(.+?)'''").expect("static regex"));
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"''(.+?)''").expect("static regex"));
static LABELLED_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]|]+)\|([^\]]+)\]\]").expect("static regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]|]+)\]\]").expect("static regex"));
static LABELLED_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(https?://[^\s\]]+)\s+([^\]]+)\]").expect("static regex"));
static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(https?://[^\s\]]+)\]").expect("static regex"));

const PLACEHOLDER_OPEN: char = '\u{E000}';
const PLACEHOLDER_CLOSE: char = '\u{E001}';

/// Converts wikitext to Markdown. Internal link targets are slugified so they
/// point at the path keys pages are stored under.
pub struct WikitextRenderer;

impl WikitextRenderer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for WikitextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for WikitextRenderer {
    fn name(&self) -> &'static str {
        "wikitext"
    }

    fn render(&self, markup: &[u8]) -> Result<RenderedDocument, RenderError> {
        let source = decode(markup)?;

        let mut literals = Vec::new();
        let protected = NOWIKI.replace_all(source, |caps: &Captures| {
            literals.push(escape_markdown(&caps[1]));
            format!("{PLACEHOLDER_OPEN}{}{PLACEHOLDER_CLOSE}", literals.len() - 1)
        });
        if protected.contains("<nowiki>") {
            return Err(RenderError::Markup {
                reason: "unterminated <nowiki>".to_owned(),
            });
        }

        let mut out = String::with_capacity(protected.len());
        for line in protected.lines() {
            out.push_str(&convert_line(line));
            out.push('\n');
        }

        for (i, literal) in literals.iter().enumerate() {
            out = out.replace(&format!("{PLACEHOLDER_OPEN}{i}{PLACEHOLDER_CLOSE}"), literal);
        }
        Ok(RenderedDocument::new(out))
    }
}

fn convert_line(line: &str) -> String {
    if let Some(caps) = HEADING.captures(line) {
        let level = caps[1].len().min(caps[3].len()).min(6);
        return format!("{} {}", "#".repeat(level), convert_inline(&caps[2]));
    }
    if RULE.is_match(line) {
        return "---".to_owned();
    }
    if let Some(caps) = LIST.captures(line) {
        let markers = &caps[1];
        let text = convert_inline(&caps[2]);
        let depth = markers.len();
        let indent = "    ".repeat(depth - 1);
        return match markers.chars().last() {
            Some('#') => format!("{indent}1. {text}"),
            Some(':') => format!("{} {text}", ">".repeat(depth)),
            Some(';') => format!("**{text}**"),
            _ => format!("{indent}- {text}"),
        };
    }
    if let Some(pre) = line.strip_prefix(' ') {
        return format!("    {pre}");
    }
    convert_inline(line)
}

fn convert_inline(text: &str) -> String {
    let text = BOLD_ITALIC.replace_all(text, "***$1***");
    let text = BOLD.replace_all(&text, "**$1**");
    let text = ITALIC.replace_all(&text, "*$1*");
    let text = LABELLED_LINK.replace_all(&text, |caps: &Captures| {
        format!("[{}]({})", caps[2].trim(), slugify(&caps[1]))
    });
    let text = LINK.replace_all(&text, |caps: &Captures| {
        format!("[{}]({})", caps[1].trim(), slugify(&caps[1]))
    });
    let text = LABELLED_URL.replace_all(&text, "[$2]($1)");
    BARE_URL.replace_all(&text, "<$1>").into_owned()
}

fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '*' | '_' | '[' | ']' | '`' | '#' => {
                out.push('\\');
                out.push(c);
            }
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(src: &str) -> String {
        WikitextRenderer::new().render(src.as_bytes()).unwrap().body
    }

    #[test]
    fn headings() {
        assert_eq!(render("== History =="), "## History\n");
        assert_eq!(render("===Early years==="), "### Early years\n");
        assert_eq!(render("= Top ="), "# Top\n");
    }

    #[test]
    fn quote_runs() {
        assert_eq!(render("'''bold''' and ''italic''"), "**bold** and *italic*\n");
        assert_eq!(render("'''''both'''''"), "***both***\n");
    }

    #[test]
    fn internal_links_point_at_slugs() {
        assert_eq!(render("See [[Main Page]]."), "See [Main Page](main-page).\n");
        assert_eq!(
            render("[[Category:Foo Bar|the category]]"),
            "[the category](category-foo-bar)\n"
        );
    }

    #[test]
    fn external_links() {
        assert_eq!(
            render("[https://example.org Example]"),
            "[Example](https://example.org)\n"
        );
        assert_eq!(render("[https://example.org]"), "<https://example.org>\n");
    }

    #[test]
    fn lists() {
        assert_eq!(render("* one\n** two\n# first"), "- one\n    - two\n1. first\n");
        assert_eq!(render(": indented"), "> indented\n");
        assert_eq!(render("; Term"), "**Term**\n");
    }

    #[test]
    fn rule_and_preformatted() {
        assert_eq!(render("----"), "---\n");
        assert_eq!(render(" code here"), "    code here\n");
    }

    #[test]
    fn nowiki_is_literal() {
        assert_eq!(
            render("<nowiki>[[not a link]] ''x''</nowiki>"),
            "\\[\\[not a link\\]\\] &#39;&#39;x&#39;&#39;\n"
        );
    }

    #[test]
    fn unterminated_nowiki_is_recoverable_markup_error() {
        let err = WikitextRenderer::new()
            .render(b"<nowiki>oops")
            .unwrap_err();
        assert!(matches!(err, RenderError::Markup { .. }));
        assert!(!err.is_fatal());
    }
}
