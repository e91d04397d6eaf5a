use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Level-1 or level-2 heading found in a block, for the outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    /// 0-based position of the block the heading lives in
    pub block_index: usize,
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"^\s*```").expect("Invalid fence regex"))
}

fn h1_regex() -> &'static Regex {
    static H1: OnceLock<Regex> = OnceLock::new();
    H1.get_or_init(|| Regex::new(r"^#\s+(.+)").expect("Invalid h1 regex"))
}

fn h2_regex() -> &'static Regex {
    static H2: OnceLock<Regex> = OnceLock::new();
    H2.get_or_init(|| Regex::new(r"^##\s+(.+)").expect("Invalid h2 regex"))
}

/// Scan raw Markdown line by line for `# ` and `## ` headings.
///
/// A line starting with a fence marker flips the in-code toggle and is
/// never itself a heading; heading patterns only apply while the toggle is
/// off.
pub fn extract_headings(content: &str, block_index: usize) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut inside_code = false;

    for line in content.split('\n') {
        if fence_regex().is_match(line) {
            inside_code = !inside_code;
            continue;
        }
        if inside_code {
            continue;
        }

        let found = if let Some(caps) = h1_regex().captures(line) {
            Some((1, caps[1].to_string()))
        } else {
            h2_regex()
                .captures(line)
                .map(|caps| (2, caps[1].to_string()))
        };
        if let Some((level, text)) = found {
            headings.push(Heading {
                level,
                text,
                block_index,
            });
        }
    }

    headings
}
