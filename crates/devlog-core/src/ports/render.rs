//! Content rendering port - the external render-and-sanitize capability.

/// Result of rendering a markdown source.
#[derive(Debug, Clone)]
pub struct RenderedContent {
    /// Sanitized HTML, safe to serve to browsers.
    pub html: String,
    /// Tag-free plain text, used for excerpt and read-time derivation.
    pub plain: String,
}

/// Renders untrusted markdown into sanitized HTML.
pub trait ContentRenderer: Send + Sync {
    fn render(&self, source: &str) -> RenderedContent;
}
