//! Markdown rendering and sanitization
//!
//! Turns raw user text into markup safe for direct embedding. Markdown
//! formatting is preserved; raw HTML in the input is demoted to literal text
//! so active content never reaches the page.

use pulldown_cmark::{html, Event, Parser};

/// Render user text to sanitized HTML.
///
/// Total: always produces output, possibly empty. HTML block and inline
/// events are re-emitted as text, which the HTML writer escapes.
pub fn render(text: &str) -> String {
    let parser = Parser::new(text).map(|event| match event {
        Event::Html(raw) => Event::Text(raw),
        Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_formatting_preserved() {
        let out = render("hello **world**");
        assert!(out.contains("<strong>world</strong>"));
    }

    #[test]
    fn test_script_tags_neutralized() {
        let out = render("<script>alert(1)</script>");
        assert!(!out.contains("<script>"));
        assert!(out.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_inline_html_neutralized() {
        let out = render("click <a href=\"x\" onclick=\"evil()\">here</a>");
        assert!(!out.contains("onclick=\"evil()\""));
        assert!(out.contains("&lt;a href="));
    }

    #[test]
    fn test_empty_input_allowed() {
        assert_eq!(render(""), "");
    }
}
