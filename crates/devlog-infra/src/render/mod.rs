//! Markdown content renderer: comrak for rendering, ammonia for
//! sanitization. The plain-text variant feeds excerpt and read-time
//! derivation in the core.

use comrak::Options;

use devlog_core::ports::{ContentRenderer, RenderedContent};

pub struct MarkdownRenderer {
    options: Options<'static>,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self {
            options: Options::default(),
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentRenderer for MarkdownRenderer {
    fn render(&self, source: &str) -> RenderedContent {
        let raw_html = comrak::markdown_to_html(source, &self.options);
        let html = ammonia::clean(&raw_html);
        // strip every tag for the plain-text variant
        let plain = ammonia::Builder::empty()
            .clean(&html)
            .to_string()
            .trim()
            .to_string();
        RenderedContent { html, plain }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_becomes_html() {
        let rendered = MarkdownRenderer::new().render("# Title\n\nSome *emphasis* here.");
        assert!(rendered.html.contains("<h1>"));
        assert!(rendered.html.contains("<em>emphasis</em>"));
        assert!(!rendered.plain.contains('<'));
        assert!(rendered.plain.contains("Some"));
    }

    #[test]
    fn script_injection_is_stripped() {
        let rendered =
            MarkdownRenderer::new().render("hello <script>alert('xss')</script> world");
        assert!(!rendered.html.contains("<script>"));
        assert!(rendered.html.contains("hello"));
    }
}
