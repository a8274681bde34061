//! Multi-file project responses.
//!
//! The model is asked to answer with blocks of the form
//!
//! ```text
//! FILE: src/main.py
//! ```python
//! ...
//! ```
//! ```

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::warn;

use crate::error::{Error, Result};

/// Generated project: relative file name -> file content
pub type ProjectFiles = BTreeMap<String, String>;

fn strict_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)FILE:[ \t]*([^\n]+)\n```([a-zA-Z0-9]+)?\n(.*?)\n```")
            .expect("valid file block pattern")
    })
}

fn marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)FILE:[ \t]*[^\n]+").expect("valid marker pattern"))
}

/// Extract files from a project response.
///
/// Tries the strict `FILE:` + fenced block format first, then falls back to
/// splitting on `FILE:` markers and stripping any surrounding fence. A
/// response with no recognisable file is a [`Error::ParseError`].
pub fn parse_project_files(response: &str) -> Result<ProjectFiles> {
    let response = response.replace("\r\n", "\n");
    let mut files = ProjectFiles::new();

    for captures in strict_pattern().captures_iter(&response) {
        let name = captures[1].trim().to_string();
        let content = captures[3].trim().to_string();
        if !name.is_empty() {
            files.insert(name, content);
        }
    }

    if files.is_empty() {
        warn!("Could not parse files using strict FILE: and ``` markers, trying lenient parsing");
        files = parse_lenient(&response);
    }

    if files.is_empty() {
        return Err(Error::ParseError(
            "No FILE: blocks found in project response".to_string(),
        ));
    }

    Ok(files)
}

fn parse_lenient(response: &str) -> ProjectFiles {
    let markers: Vec<_> = marker_pattern().find_iter(response).collect();
    let mut files = ProjectFiles::new();

    for (i, marker) in markers.iter().enumerate() {
        // "FILE:" は大文字小文字を問わず5文字
        let name = marker.as_str()[5..].trim().to_string();
        let end = markers
            .get(i + 1)
            .map(|next| next.start())
            .unwrap_or(response.len());
        let body = strip_fence(response[marker.end()..end].trim());

        if !name.is_empty() && !body.is_empty() {
            files.insert(name, body);
        }
    }

    files
}

fn strip_fence(body: &str) -> String {
    if !body.starts_with("```") {
        return body.to_string();
    }

    let mut lines: Vec<&str> = body.lines().skip(1).collect();
    if lines.last().map(|l| l.trim() == "```").unwrap_or(false) {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}
