//! Minimal markdown to HTML: headings, emphasis, links and paragraphs.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static H3_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^### (.*)$").unwrap());
static H2_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^## (.*)$").unwrap());
static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^# (.*)$").unwrap());
static BOLD_STAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static BOLD_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"__(.*?)__").unwrap());
static ITALIC_STAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static ITALIC_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_(.*?)_").unwrap());
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(.*?)\]\((.*?)\)").unwrap());
static BREAKS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(<br>){2,}").unwrap());

pub fn render(markdown: &str) -> String {
    if markdown.is_empty() {
        return String::new();
    }

    let html = markdown.replace("\r\n", "\n");

    let html = H3_RE.replace_all(&html, "<h3>$1</h3>");
    let html = H2_RE.replace_all(&html, "<h2>$1</h2>");
    let html = H1_RE.replace_all(&html, "<h1>$1</h1>");

    let html = BOLD_STAR_RE.replace_all(&html, "<strong>$1</strong>");
    let html = BOLD_UNDERSCORE_RE.replace_all(&html, "<strong>$1</strong>");
    let html = ITALIC_STAR_RE.replace_all(&html, "<em>$1</em>");
    let html = ITALIC_UNDERSCORE_RE.replace_all(&html, "<em>$1</em>");

    let html = LINK_RE.replace_all(&html, |caps: &Captures| {
        let (text, href) = (&caps[1], &caps[2]);
        if is_safe_href(href) {
            format!(r#"<a href="{href}" target="_blank">{text}</a>"#)
        } else {
            text.to_string()
        }
    });

    let html = html.replace('\n', "<br>");
    let html = BREAKS_RE.replace_all(&html, "</p><p>");
    let html = format!("<p>{html}</p>");

    html.replace("<p></p>", "").replace("<p><br>", "<p>")
}

/// Only web links and relative paths may become anchors.
fn is_safe_href(href: &str) -> bool {
    let href = href.trim_matches(|c: char| c.is_whitespace() || c.is_control());
    let lower = href.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return true;
    }
    let head = href.split(['/', '?', '#']).next().unwrap_or_default();
    !head.contains(':') && !head.contains('&')
}

/// Escapes text so it can be embedded in HTML before rendering.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Renders untrusted markdown: escaped first, then converted.
pub fn render_escaped(markdown: &str) -> String {
    render(&escape_html(markdown))
}
