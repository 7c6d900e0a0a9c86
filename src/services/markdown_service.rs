use log::debug;
use pulldown_cmark::{html, Options, Parser};

/// Service for turning submitted markdown into storable, sanitized HTML
#[derive(Clone)]
pub struct MarkdownService {
    options: Options,
}

impl MarkdownService {
    /// Create a new markdown service
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        Self { options }
    }

    /// Render raw page text to sanitized HTML ending in exactly one newline.
    pub fn render(&self, raw: &str) -> String {
        let unsafe_html = self.markdown_to_html(raw);
        let mut clean = ammonia::clean(&unsafe_html).trim_end().to_string();
        clean.push('\n');
        debug!("Rendered {} bytes of markdown into {} bytes of HTML", raw.len(), clean.len());
        clean
    }

    /// Markdown to HTML conversion with no sanitizing applied
    fn markdown_to_html(&self, content: &str) -> String {
        let parser = Parser::new_ext(content, self.options);
        let mut out = String::with_capacity(content.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

impl Default for MarkdownService {
    fn default() -> Self {
        Self::new()
    }
}
