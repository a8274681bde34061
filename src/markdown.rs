//! Markdown to HTML conversion for post bodies and exported pages.

use pulldown_cmark::{html, Options, Parser};

/// Render markdown to HTML.
///
/// Fenced code blocks become `<pre><code class="language-xx">` so the
/// language hint survives for client-side highlighting. Tables,
/// strikethrough and task lists are enabled.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

/// Escape text for use inside HTML attributes and element bodies
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unescape(text: &str) -> String {
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&")
    }

    fn code_block_body<'a>(html: &'a str, language: &str) -> &'a str {
        let open = format!("<pre><code class=\"language-{}\">", language);
        let start = html.find(&open).expect("code block present") + open.len();
        let end = html[start..].find("</code></pre>").expect("closed code block") + start;
        &html[start..end]
    }

    #[test]
    fn test_fenced_code_keeps_language_and_content() {
        let block = "fn main() {\n    let v: Vec<u8> = vec![1, 2];\n    println!(\"{:?} & done\", v);\n}";
        let markdown = format!("# Title\n\nIntro text.\n\n```rust\n{}\n```\n", block);

        let html = to_html(&markdown);
        let body = unescape(code_block_body(&html, "rust"));

        assert_eq!(body.trim_end_matches('\n'), block);
    }

    #[test]
    fn test_inline_code_and_headings() {
        let html = to_html("# Hi\nBody with `cargo build` inline.");
        assert!(html.contains("<h1>Hi</h1>"));
        assert!(html.contains("<code>cargo build</code>"));
    }

    #[test]
    fn test_tables_enabled() {
        let html = to_html("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">Tom & Jerry's</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }
}
