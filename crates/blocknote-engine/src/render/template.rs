//! Small logic-light template renderer for the note page.
//!
//! Understands the subset of Jinja/Nunjucks syntax the page templates need:
//!
//! - `{{ path.to.value }}`: looked up in the data, HTML-escaped
//! - `{{ path | safe }}`: inserted verbatim
//! - `{% for item in path %}...{% endfor %}`: one level of iteration, with
//!   `loop.index` (1-based), `loop.first` and `loop.last` in scope
//!
//! Missing values render as the empty string.

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::sync::OnceLock;

use crate::collaborators::TemplateRenderer;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template syntax error: {0}")]
    Syntax(String),
    #[error("`{0}` is not a list")]
    NotIterable(String),
    #[error("failed to build template data: {0}")]
    Data(#[from] serde_json::Error),
}

/// Body of the note: one section per block
pub const DEFAULT_MAIN_TEMPLATE: &str = r##"{% for block in blocks %}<section class="block" id="block-{{ block.position }}" data-index="{{ block.index }}">
{{ block.content_html | safe }}<footer class="block-meta">created {{ block.created }}, modified {{ block.modified }}</footer>
</section>
{% endfor %}"##;

/// Outline plus recently changed blocks
pub const DEFAULT_SIDEBAR_TEMPLATE: &str = r##"<nav class="toc">{% for heading in headings %}
<a class="toc-h{{ heading.level }}" href="#block-{{ heading.block_index }}">{{ heading.text }}</a>{% endfor %}
</nav>
<ol class="recently-modified">{% for item in by_modified %}
<li><a href="#block-{{ item.position }}">{{ item.modified }}</a></li>{% endfor %}
</ol>
<ol class="recently-created">{% for item in by_created %}
<li><a href="#block-{{ item.position }}">{{ item.created }}</a></li>{% endfor %}
</ol>
"##;

fn loop_regex() -> &'static Regex {
    static LOOP: OnceLock<Regex> = OnceLock::new();
    LOOP.get_or_init(|| {
        Regex::new(r"(?s)\{%\s*for\s+(\w+)\s+in\s+([\w.]+)\s*%\}(.*?)\{%\s*endfor\s*%\}")
            .expect("Invalid loop regex")
    })
}

fn expr_regex() -> &'static Regex {
    static EXPR: OnceLock<Regex> = OnceLock::new();
    EXPR.get_or_init(|| {
        Regex::new(r"\{\{\s*([\w.]+)\s*(\|\s*safe\s*)?\}\}").expect("Invalid expression regex")
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateEngine;

impl TemplateEngine {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateRenderer for TemplateEngine {
    fn render(&self, template: &str, data: &Value) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(template.len());
        let mut last = 0;

        for caps in loop_regex().captures_iter(template) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            out.push_str(&render_text(&template[last..whole.start()], None, data)?);

            let var = &caps[1];
            let path = &caps[2];
            let body = &caps[3];
            let items = match lookup(path, None, data) {
                Some(Value::Array(items)) => items.as_slice(),
                None | Some(Value::Null) => &[],
                Some(_) => return Err(TemplateError::NotIterable(path.to_string())),
            };

            for (i, item) in items.iter().enumerate() {
                let mut locals = Map::new();
                locals.insert(var.to_string(), item.clone());
                locals.insert(
                    "loop".to_string(),
                    serde_json::json!({
                        "index": i + 1,
                        "first": i == 0,
                        "last": i + 1 == items.len(),
                    }),
                );
                out.push_str(&render_text(body, Some(&locals), data)?);
            }

            last = whole.end();
        }
        out.push_str(&render_text(&template[last..], None, data)?);

        Ok(out)
    }
}

/// Substitute expressions in a stretch of template containing no loops
fn render_text(
    text: &str,
    locals: Option<&Map<String, Value>>,
    data: &Value,
) -> Result<String, TemplateError> {
    if let Some(pos) = text.find("{%") {
        let tag: String = text[pos..].chars().take(40).collect();
        return Err(TemplateError::Syntax(format!(
            "unsupported or unbalanced tag near `{tag}`"
        )));
    }

    let rendered = expr_regex().replace_all(text, |caps: &Captures| {
        let value = lookup(&caps[1], locals, data);
        let raw = display_value(value);
        if caps.get(2).is_some() {
            raw
        } else {
            html_escape::encode_quoted_attribute(&raw).into_owned()
        }
    });
    Ok(rendered.into_owned())
}

/// Resolve a dotted path, locals first, then the root data object.
/// Numeric segments index into arrays.
fn lookup<'a>(
    path: &str,
    locals: Option<&'a Map<String, Value>>,
    data: &'a Value,
) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let head = parts.next()?;
    let mut current = locals
        .and_then(|l| l.get(head))
        .or_else(|| data.get(head))?;
    for part in parts {
        current = match current {
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            other => other.get(part)?,
        };
    }
    Some(current)
}

fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}
