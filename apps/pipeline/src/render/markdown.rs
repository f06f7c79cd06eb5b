//! Deterministic Markdown → HTML for the fallback path.
//!
//! Handles h1/h2/h3, `-`/`*` bullet lists, horizontal rules, paragraphs, and
//! inline bold / italic / code. Output is a pure function of the input: the
//! same Markdown always produces byte-identical HTML. No input makes it fail;
//! anything unrecognised becomes a paragraph.

use std::convert::Infallible;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::ModelUsed;
use crate::render::{Rendered, Renderer};

const DEFAULT_TITLE: &str = "Resume";

const STYLESHEET: &str = "\
body { font-family: Arial, Helvetica, sans-serif; margin: 40px auto; color: #111; max-width: 860px; padding: 0 20px; }\
h1 { font-size: 26px; margin: 0 0 4px; }\
h2 { font-size: 16px; margin: 20px 0 4px; border-bottom: 1px solid #ccc; padding-bottom: 2px; text-transform: uppercase; letter-spacing: 0.05em; }\
h3 { font-size: 14px; margin: 12px 0 2px; }\
p, li { font-size: 13px; line-height: 1.5; margin: 3px 0; }\
ul { margin: 4px 0 10px 20px; padding: 0; }\
hr { border: none; border-top: 1px solid #ddd; margin: 14px 0; }\
code { background: #f4f4f4; padding: 1px 4px; border-radius: 3px; font-size: 12px; }\
strong { font-weight: 600; }";

static HORIZONTAL_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[-*]{3,}\s*$").expect("valid hr regex"));

// Applied in order; longer delimiters first so `***` is not eaten by `**`.
static INLINE_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\*\*\*(.*?)\*\*\*", "<strong><em>${1}</em></strong>"),
        (r"___(.*?)___", "<strong><em>${1}</em></strong>"),
        (r"\*\*(.*?)\*\*", "<strong>${1}</strong>"),
        (r"__(.*?)__", "<strong>${1}</strong>"),
        (r"\*(.*?)\*", "<em>${1}</em>"),
        (r"_(.*?)_", "<em>${1}</em>"),
        (r"`([^`]+)`", "<code>${1}</code>"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("valid inline regex"),
            replacement,
        )
    })
    .collect()
});

/// Local, dependency-free renderer used when Bedrock is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    /// Renders a full HTML document. Infallible.
    pub fn render_document(&self, markdown: &str) -> String {
        let body = render_body(markdown);
        let title = document_title(markdown);
        format!(
            "<!doctype html><html lang='en'><head><meta charset='utf-8'>\
             <meta name='viewport' content='width=device-width, initial-scale=1'>\
             <title>{title}</title><style>{STYLESHEET}</style></head>\
             <body>{body}</body></html>"
        )
    }
}

#[async_trait]
impl Renderer for MarkdownRenderer {
    type Error = Infallible;

    async fn render(&self, markdown: &str) -> Result<Rendered, Infallible> {
        Ok(Rendered {
            html: self.render_document(markdown),
            model_used: ModelUsed::Fallback,
        })
    }
}

fn render_body(markdown: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut in_list = false;

    for line in markdown.lines().map(str::trim_end) {
        if HORIZONTAL_RULE.is_match(line) {
            close_list(&mut parts, &mut in_list);
            parts.push("<hr>".to_string());
            continue;
        }

        if line.trim().is_empty() {
            close_list(&mut parts, &mut in_list);
            continue;
        }

        if let Some(text) = line.strip_prefix("# ") {
            close_list(&mut parts, &mut in_list);
            parts.push(format!("<h1>{}</h1>", render_inline(text.trim())));
        } else if let Some(text) = line.strip_prefix("## ") {
            close_list(&mut parts, &mut in_list);
            parts.push(format!("<h2>{}</h2>", render_inline(text.trim())));
        } else if let Some(text) = line.strip_prefix("### ") {
            close_list(&mut parts, &mut in_list);
            parts.push(format!("<h3>{}</h3>", render_inline(text.trim())));
        } else if let Some(text) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
            if !in_list {
                parts.push("<ul>".to_string());
                in_list = true;
            }
            parts.push(format!("<li>{}</li>", render_inline(text.trim())));
        } else {
            close_list(&mut parts, &mut in_list);
            parts.push(format!("<p>{}</p>", render_inline(line.trim())));
        }
    }

    close_list(&mut parts, &mut in_list);
    parts.concat()
}

fn close_list(parts: &mut Vec<String>, in_list: &mut bool) {
    if *in_list {
        parts.push("</ul>".to_string());
        *in_list = false;
    }
}

/// Escapes raw text, then maps inline Markdown onto tags.
pub fn render_inline(text: &str) -> String {
    INLINE_RULES
        .iter()
        .fold(escape_html(text), |acc, (regex, replacement)| {
            regex.replace_all(&acc, *replacement).into_owned()
        })
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Plain text of the first level-1 heading.
fn document_title(markdown: &str) -> String {
    markdown
        .lines()
        .find_map(|line| line.trim_end().strip_prefix("# "))
        .map(|text| text.replace(['*', '_', '`'], ""))
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .map(|text| escape_html(&text))
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_of(html: &str) -> &str {
        let start = html.find("<body>").unwrap() + "<body>".len();
        let end = html.find("</body>").unwrap();
        &html[start..end]
    }

    #[test]
    fn test_heading_and_list() {
        let html = MarkdownRenderer.render_document("# Name\n\n- Skill A\n- Skill B");
        assert_eq!(
            body_of(&html),
            "<h1>Name</h1><ul><li>Skill A</li><li>Skill B</li></ul>"
        );
        assert_eq!(html.matches("<h1>").count(), 1);
        assert_eq!(html.matches("<li>").count(), 2);
    }

    #[test]
    fn test_output_is_byte_identical_across_runs() {
        let md = "# Will Soto\n## Skills\n- **AWS**, *Terraform*\n---\nBuilt `ci` pipelines & more";
        let first = MarkdownRenderer.render_document(md);
        for _ in 0..5 {
            assert_eq!(MarkdownRenderer.render_document(md), first);
        }
    }

    #[test]
    fn test_heading_levels() {
        let html = MarkdownRenderer.render_document("# A\n## B\n### C\n#### D");
        assert_eq!(
            body_of(&html),
            "<h1>A</h1><h2>B</h2><h3>C</h3><p>#### D</p>"
        );
    }

    #[test]
    fn test_blank_line_splits_lists() {
        let html = MarkdownRenderer.render_document("- a\n\n* b");
        assert_eq!(body_of(&html), "<ul><li>a</li></ul><ul><li>b</li></ul>");
    }

    #[test]
    fn test_paragraph_closes_list() {
        let html = MarkdownRenderer.render_document("- a\nplain text");
        assert_eq!(body_of(&html), "<ul><li>a</li></ul><p>plain text</p>");
    }

    #[test]
    fn test_horizontal_rule_variants() {
        let html = MarkdownRenderer.render_document("---\n  ***  \n-----");
        assert_eq!(body_of(&html), "<hr><hr><hr>");
    }

    #[test]
    fn test_inline_formatting() {
        assert_eq!(
            render_inline("***both*** **bold** *it* `code`"),
            "<strong><em>both</em></strong> <strong>bold</strong> <em>it</em> <code>code</code>"
        );
        assert_eq!(render_inline("__b__ _i_"), "<strong>b</strong> <em>i</em>");
        assert_eq!(
            render_inline("___both___ x"),
            "<strong><em>both</em></strong> x"
        );
    }

    #[test]
    fn test_raw_html_is_escaped_before_formatting() {
        assert_eq!(
            render_inline("<script>\"x\" & 'y'</script>"),
            "&lt;script&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_stray_markers() {
        assert_eq!(render_inline("5 * 3 = 15"), "5 * 3 = 15");
        assert_eq!(render_inline("snake_case_name"), "snake<em>case</em>name");
        assert_eq!(render_inline("****"), "<strong></strong>");
    }

    #[test]
    fn test_title_from_first_heading() {
        let html = MarkdownRenderer.render_document("intro\n# **Will** Soto\n# Other");
        assert!(html.contains("<title>Will Soto</title>"));
    }

    #[test]
    fn test_title_defaults_without_heading() {
        let html = MarkdownRenderer.render_document("just text");
        assert!(html.contains("<title>Resume</title>"));
    }

    #[test]
    fn test_empty_input_renders_empty_body() {
        let html = MarkdownRenderer.render_document("");
        assert_eq!(body_of(&html), "");
        assert!(html.starts_with("<!doctype html>"));
    }

    #[tokio::test]
    async fn test_renderer_trait_tags_fallback() {
        let rendered = MarkdownRenderer.render("# Name").await.unwrap();
        assert_eq!(rendered.model_used, ModelUsed::Fallback);
    }
}
