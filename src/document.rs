//! Assembling the stored document for a page revision.
//!
//! ```text
//! ---
//! title: "Welcome Page"
//! ---
//!
//! <rendered body>
//! <!-- source
//! <original markup>
//! -->
//! ```
//!
//! The trailing comment is only present when source embedding is enabled.

/// Build the bytes stored under a page's path key.
#[must_use]
pub fn assemble(display_title: &str, body: &str, source: Option<&str>) -> Vec<u8> {
    let mut doc = String::with_capacity(body.len() + display_title.len() + 32);
    doc.push_str("---\ntitle: ");
    doc.push_str(&quote(display_title));
    doc.push_str("\n---\n\n");
    doc.push_str(body);

    if let Some(source) = source {
        if !doc.ends_with('\n') {
            doc.push('\n');
        }
        doc.push_str("<!-- source\n");
        doc.push_str(&defang(source));
        if !source.ends_with('\n') {
            doc.push('\n');
        }
        doc.push_str("-->\n");
    }
    doc.into_bytes()
}

/// Double-quoted scalar. JSON string syntax is a subset of YAML's.
fn quote(title: &str) -> String {
    serde_json::to_string(title).unwrap_or_else(|_| format!("\"{title}\""))
}

/// HTML comments may not contain `--`.
fn defang(source: &str) -> String {
    let mut out = source.to_owned();
    while out.contains("--") {
        out = out.replace("--", "- -");
    }
    out
}
