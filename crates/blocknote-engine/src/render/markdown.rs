use pulldown_cmark::{Options, Parser, html};

use crate::collaborators::MarkdownRenderer;

/// CommonMark plus the GitHub-style extensions notes commonly use
#[derive(Debug, Clone, Copy)]
pub struct PulldownMarkdown {
    options: Options,
}

impl PulldownMarkdown {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);
        Self { options }
    }
}

impl Default for PulldownMarkdown {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer for PulldownMarkdown {
    fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}
