//! Local exports: markdown documents, standalone HTML pages and project trees.

use chrono::{DateTime, Local};
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;
use tokio::fs;
use tracing::info;

use crate::ai::content::{ProjectFiles, SeoMetadata};
use crate::error::{Error, Result};
use crate::markdown::{escape_html, to_html};

const GENERATED_BY: &str = "AI Content Agent Pro";
const HTML_PAGE_NAME: &str = "index.html";

fn filename_strip_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^\w\s-]").expect("valid filename pattern"))
}

fn separator_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[-\s]+").expect("valid separator pattern"))
}

/// `"Hello, World!"` -> `"hello-world"`
pub fn markdown_filename(title: &str) -> String {
    let stripped = filename_strip_pattern().replace_all(title, "");
    let name = separator_pattern()
        .replace_all(stripped.trim(), "-")
        .to_lowercase();
    if name.is_empty() {
        "generated-content".to_string()
    } else {
        name
    }
}

/// Directory name for a generated project.
pub fn project_dir_name(project_name: &str) -> String {
    project_name.trim().replace(' ', "_").to_lowercase()
}

fn quoted(value: &str) -> String {
    // JSON string literals are valid YAML scalars
    serde_json::Value::String(value.to_string()).to_string()
}

/// Markdown document with a `---` front-matter block.
///
/// A first line `# <title>` (case-insensitive match) is dropped since the
/// title already lives in the front matter.
pub fn render_markdown_document(
    content: &str,
    title: &str,
    seo: Option<&SeoMetadata>,
    generated_at: DateTime<Local>,
) -> String {
    let mut doc = String::from("---\n");
    doc.push_str(&format!("title: {}\n", quoted(title)));
    doc.push_str(&format!("date: {}\n", generated_at.format("%Y-%m-%d %H:%M:%S")));
    doc.push_str(&format!("generated_by: {}\n", GENERATED_BY));

    if let Some(seo) = seo {
        doc.push_str(&format!("seo_title: {}\n", quoted(&seo.title)));
        doc.push_str(&format!("description: {}\n", quoted(&seo.description)));
        doc.push_str(&format!("keywords: {}\n", quoted(&seo.keywords.join(", "))));
        doc.push_str(&format!("slug: {}\n", quoted(&seo.slug)));
    }
    doc.push_str("---\n\n");

    doc.push_str(strip_title_heading(content, title));
    doc
}

fn strip_title_heading<'a>(content: &'a str, title: &str) -> &'a str {
    let (first, rest) = content.split_once('\n').unwrap_or((content, ""));
    let first = first.trim();
    match first.strip_prefix('#') {
        Some(heading) if heading.trim().eq_ignore_ascii_case(title.trim()) => rest,
        _ => content,
    }
}

/// Write the markdown document to `<dir>/<filename>.md`.
pub async fn save_markdown_file(
    dir: &Path,
    content: &str,
    title: &str,
    seo: Option<&SeoMetadata>,
) -> Result<PathBuf> {
    fs::create_dir_all(dir).await?;
    let path = dir.join(format!("{}.md", markdown_filename(title)));
    let document = render_markdown_document(content, title, seo, Local::now());
    fs::write(&path, document).await?;

    info!(path = %path.display(), "Markdown saved");
    Ok(path)
}

/// Split a saved document into its front-matter title (if any) and body.
pub fn split_front_matter(document: &str) -> (Option<String>, &str) {
    let Some(rest) = document.strip_prefix("---\n") else {
        return (None, document);
    };
    let Some(end) = rest.find("\n---\n") else {
        return (None, document);
    };

    let title = rest[..end]
        .lines()
        .find_map(|line| line.strip_prefix("title:"))
        .map(|raw| {
            let raw = raw.trim();
            serde_json::from_str::<String>(raw).unwrap_or_else(|_| raw.to_string())
        });
    let body = rest[end + "\n---\n".len()..].trim_start_matches('\n');
    (title, body)
}

/// Standalone HTML page with meta/OpenGraph tags and highlight.js.
pub fn render_html_page(
    content: &str,
    title: &str,
    seo: Option<&SeoMetadata>,
    generated_at: DateTime<Local>,
) -> String {
    let body = to_html(content);
    let page_title = escape_html(seo.map(|s| s.title.as_str()).unwrap_or(title));
    let description = escape_html(seo.map(|s| s.description.as_str()).unwrap_or(""));
    let keywords = escape_html(&seo.map(|s| s.keywords.join(", ")).unwrap_or_default());
    let published_on = generated_at.format("%B %d, %Y");
    let published_at = generated_at.format("%Y-%m-%d at %H:%M:%S");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{page_title}</title>
    <meta name="description" content="{description}">
    <meta name="keywords" content="{keywords}">
    <meta name="author" content="{author}">
    <meta property="og:title" content="{page_title}">
    <meta property="og:description" content="{description}">
    <meta property="og:type" content="article">
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.8.0/styles/github.min.css">
    <script src="https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.8.0/highlight.min.js"></script>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; max-width: 900px; margin: 0 auto; padding: 20px; background-color: #fafafa; }}
        .container {{ background-color: white; padding: 40px; border-radius: 12px; box-shadow: 0 4px 20px rgba(0,0,0,0.1); }}
        h1 {{ color: #2c3e50; border-bottom: 3px solid #3498db; padding-bottom: 15px; }}
        h2 {{ color: #34495e; border-bottom: 2px solid #3498db; padding-bottom: 10px; margin-top: 40px; }}
        pre {{ background-color: #f8f9fa; border: 1px solid #e9ecef; border-radius: 8px; padding: 20px; overflow-x: auto; }}
        code {{ font-family: 'SFMono-Regular', Monaco, 'Courier New', monospace; font-size: 0.9em; }}
        blockquote {{ border-left: 4px solid #3498db; margin: 0; padding: 15px 20px; background-color: #f8f9fa; }}
        table {{ border-collapse: collapse; width: 100%; }}
        th, td {{ border: 1px solid #ddd; padding: 12px; text-align: left; }}
        img {{ max-width: 100%; height: auto; }}
        .article-header, .meta {{ text-align: center; color: #7f8c8d; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="article-header">
            <div class="publish-date">Published on {published_on}</div>
        </div>
        {body}
        <div class="meta">
            <p><strong>Article Information</strong><br>
            Published on {published_at}</p>
        </div>
    </div>
    <script>hljs.highlightAll();</script>
</body>
</html>
"#,
        author = GENERATED_BY,
    )
}

/// Write the HTML page to `<dir>/index.html`.
pub async fn save_html_page(
    dir: &Path,
    content: &str,
    title: &str,
    seo: Option<&SeoMetadata>,
) -> Result<PathBuf> {
    fs::create_dir_all(dir).await?;
    let path = dir.join(HTML_PAGE_NAME);
    fs::write(&path, render_html_page(content, title, seo, Local::now())).await?;

    info!(path = %path.display(), "HTML page saved");
    Ok(path)
}

/// 生成されたファイル名が出力先の外を指していないか確認
fn safe_relative_path(name: &str) -> Result<PathBuf> {
    let path = Path::new(name);
    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes || name.trim().is_empty() {
        return Err(Error::Config(format!(
            "Refusing to write project file outside the output directory: {}",
            name
        )));
    }
    Ok(path.to_path_buf())
}

/// Write every project file under `root`, creating parent directories.
///
/// All names are checked before anything is written.
pub async fn write_project_files(root: &Path, files: &ProjectFiles) -> Result<Vec<PathBuf>> {
    let relative: Vec<PathBuf> = files
        .keys()
        .map(|name| safe_relative_path(name))
        .collect::<Result<_>>()?;

    let mut written = Vec::with_capacity(files.len());
    for (rel, content) in relative.iter().zip(files.values()) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, content).await?;
        written.push(path);
    }

    info!(root = %root.display(), files = written.len(), "Project written");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn sample_seo() -> SeoMetadata {
        SeoMetadata {
            title: "Rust \"Ownership\" Guide".to_string(),
            description: "Learn <borrowing>".to_string(),
            keywords: vec!["rust".to_string(), "ownership".to_string()],
            slug: "rust-ownership".to_string(),
        }
    }

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap()
    }

    #[test]
    fn test_markdown_filename() {
        assert_eq!(markdown_filename("Hello, World!"), "hello-world");
        assert_eq!(markdown_filename("  A -- B  C "), "a-b-c");
        assert_eq!(markdown_filename("!!!"), "generated-content");
    }

    #[test]
    fn test_front_matter() {
        let doc = render_markdown_document(
            "# Rust Guide\nBody line",
            "Rust Guide",
            Some(&sample_seo()),
            fixed_time(),
        );

        assert!(doc.starts_with("---\ntitle: \"Rust Guide\"\ndate: 2024-03-05 14:30:00\n"));
        assert!(doc.contains("generated_by: AI Content Agent Pro\n"));
        assert!(doc.contains("seo_title: \"Rust \\\"Ownership\\\" Guide\"\n"));
        assert!(doc.contains("keywords: \"rust, ownership\"\n"));
        assert!(doc.contains("slug: \"rust-ownership\"\n"));
        // 重複するH1は削除される
        assert!(doc.ends_with("---\n\nBody line"));
    }

    #[test]
    fn test_different_heading_is_kept() {
        let doc = render_markdown_document("# Other\nBody", "Title", None, fixed_time());
        assert!(doc.ends_with("---\n\n# Other\nBody"));
        assert!(!doc.contains("seo_title"));
    }

    #[test]
    fn test_split_front_matter() {
        let doc = render_markdown_document("# T\nBody", "Quoted \"T\"", None, fixed_time());
        let (title, body) = split_front_matter(&doc);
        assert_eq!(title.as_deref(), Some("Quoted \"T\""));
        assert_eq!(body, "# T\nBody");

        assert_eq!(split_front_matter("# Plain\n"), (None, "# Plain\n"));
    }

    #[test]
    fn test_html_page_escapes_metadata() {
        let html = render_html_page("# Hi\n\n```rust\nfn main() {}\n```", "Hi", Some(&sample_seo()), fixed_time());

        assert!(html.contains("<title>Rust &quot;Ownership&quot; Guide</title>"));
        assert!(html.contains("content=\"Learn &lt;borrowing&gt;\""));
        assert!(html.contains("<meta property=\"og:type\" content=\"article\">"));
        assert!(html.contains("hljs.highlightAll()"));
        assert!(html.contains("<h1>Hi</h1>"));
        assert!(html.contains("Published on March 05, 2024"));
    }

    #[tokio::test]
    async fn test_save_markdown_and_html() {
        let dir = TempDir::new().unwrap();

        let md = save_markdown_file(dir.path(), "Body", "My Post", None).await.unwrap();
        assert_eq!(md, dir.path().join("my-post.md"));
        let saved = std::fs::read_to_string(&md).unwrap();
        assert!(saved.starts_with("---\ntitle: \"My Post\"\n"));

        let html = save_html_page(&dir.path().join("site"), "Body", "My Post", None)
            .await
            .unwrap();
        assert_eq!(html, dir.path().join("site").join("index.html"));
        assert!(std::fs::read_to_string(html).unwrap().contains("<title>My Post</title>"));
    }

    #[tokio::test]
    async fn test_write_project_files() {
        let dir = TempDir::new().unwrap();
        let mut files = ProjectFiles::new();
        files.insert("src/main.py".to_string(), "print(1)".to_string());
        files.insert("README.md".to_string(), "# Demo".to_string());

        let written = write_project_files(dir.path(), &files).await.unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("src/main.py")).unwrap(),
            "print(1)"
        );
    }

    #[tokio::test]
    async fn test_project_paths_cannot_escape() {
        let dir = TempDir::new().unwrap();
        for bad in ["../evil.sh", "/etc/passwd", "a/../../b"] {
            let mut files = ProjectFiles::new();
            files.insert("ok.txt".to_string(), "fine".to_string());
            files.insert(bad.to_string(), "x".to_string());

            let result = write_project_files(dir.path(), &files).await;
            assert!(matches!(result, Err(Error::Config(_))), "{bad} accepted");
        }
        // 検証は書き込み前に行われる
        assert!(!dir.path().join("ok.txt").exists());
    }

    #[test]
    fn test_project_dir_name() {
        assert_eq!(project_dir_name("My Cool App"), "my_cool_app");
    }
}
