//! Markdown text helpers
//!
//! Plain-text rendering of markdown for titles, and the normalization used to
//! compare file contents when detecting write echoes.

use regex::Regex;
use std::sync::LazyLock;

/// Compiled regex patterns for markdown stripping
///
/// The order matters: wikilinks and placeholders before generic links, images
/// before links, bold before italic, line-start patterns last.
static MARKDOWN_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        // [[target]] -> target
        (Regex::new(r"\[\[([^\[\]]+)\]\]").unwrap(), "$1"),
        // [target]* -> target
        (Regex::new(r"\[([^\[\]]+)\]\*").unwrap(), "$1"),
        // ![alt](url) -> alt
        (Regex::new(r"!\[([^\]]*)\]\([^)]+\)").unwrap(), "$1"),
        // [text](url) -> text
        (Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap(), "$1"),
        (Regex::new(r"`([^`]+)`").unwrap(), "$1"),
        (Regex::new(r"\*\*([^*]+)\*\*").unwrap(), "$1"),
        (Regex::new(r"__([^_]+)__").unwrap(), "$1"),
        (Regex::new(r"~~([^~]+)~~").unwrap(), "$1"),
        (Regex::new(r"\*([^*]+)\*").unwrap(), "$1"),
        (Regex::new(r"_([^_]+)_").unwrap(), "$1"),
        (Regex::new(r"^#{1,6}\s+").unwrap(), ""),
        (Regex::new(r"^>\s*").unwrap(), ""),
        (Regex::new(r"^\d+\.\s+").unwrap(), ""),
        (Regex::new(r"^[-*+]\s+").unwrap(), ""),
        (Regex::new(r"^[-*_]{3,}$").unwrap(), ""),
        (Regex::new(r"<[^>]+>").unwrap(), ""),
    ]
});

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*#{1,6}\s+\S").unwrap());

/// Link syntax removed before echo comparison: `[[x]]` and `[x]*` both become `x`
static LINK_BRACKETS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]]*)\]\]|\[([^\[\]]*)\]\*").unwrap());

/// Strip markdown formatting from content to produce plain text
///
/// # Examples
///
/// ```
/// use vaultgraph_core::utils::strip_markdown;
///
/// assert_eq!(strip_markdown("# Hello World"), "Hello World");
/// assert_eq!(strip_markdown("**bold** text"), "bold text");
/// assert_eq!(strip_markdown("see [[roadmap]]"), "see roadmap");
/// ```
pub fn strip_markdown(content: &str) -> String {
    let mut result = content.to_string();

    for (pattern, replacement) in MARKDOWN_PATTERNS.iter() {
        if replacement.is_empty() && pattern.as_str().starts_with('^') {
            result = result
                .lines()
                .map(|line| pattern.replace_all(line, *replacement).to_string())
                .collect::<Vec<_>>()
                .join("\n");
        } else {
            result = pattern.replace_all(&result, *replacement).to_string();
        }
    }

    result = WHITESPACE_RE.replace_all(&result, " ").to_string();
    result.trim().to_string()
}

/// Plain text of the first markdown heading, if any line is one
pub fn first_heading(content: &str) -> Option<String> {
    content
        .lines()
        .find(|line| HEADING_RE.is_match(line))
        .map(strip_markdown)
        .filter(|title| !title.is_empty())
}

/// Plain text of the first paragraph that is not a heading.
///
/// Paragraphs are separated by blank lines. Used as a node's summary when its
/// front matter carries none.
pub fn first_paragraph(content: &str) -> Option<String> {
    content
        .split("\n\n")
        .map(|block| {
            block
                .lines()
                .filter(|line| !HEADING_RE.is_match(line))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .map(|block| strip_markdown(&block))
        .find(|text| !text.is_empty())
}

/// Canonical form of file text for write-echo comparison.
///
/// Removes link brackets (both on-disk `[[x]]` and in-memory `[x]*` forms) and
/// collapses all whitespace, so re-serialization differences that do not change
/// what a human wrote compare equal.
pub fn normalize_for_echo(text: &str) -> String {
    let unbracketed = LINK_BRACKETS_RE.replace_all(text, |caps: &regex::Captures| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    });
    WHITESPACE_RE
        .replace_all(&unbracketed, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_headers_and_emphasis() {
        assert_eq!(strip_markdown("## Project Planning"), "Project Planning");
        assert_eq!(strip_markdown("text with **bold** word"), "text with bold word");
        assert_eq!(strip_markdown("*italic*"), "italic");
    }

    #[test]
    fn test_strip_link_forms() {
        assert_eq!(strip_markdown("Check [docs](http://test.com)"), "Check docs");
        assert_eq!(strip_markdown("child of [[parent]]"), "child of parent");
        assert_eq!(strip_markdown("child of [parent]*"), "child of parent");
    }

    #[test]
    fn test_strip_multiline() {
        let input = "# Header\n\nSome **bold** text\n- List item";
        assert_eq!(strip_markdown(input), "Header Some bold text List item");
    }

    #[test]
    fn test_first_heading() {
        assert_eq!(
            first_heading("intro line\n\n## The **Plan**\n# Later"),
            Some("The Plan".to_string())
        );
        assert_eq!(first_heading("#hashtag is not a heading"), None);
        assert_eq!(first_heading(""), None);
    }

    #[test]
    fn test_first_paragraph_skips_headings() {
        assert_eq!(
            first_paragraph("# Title\n\nFirst **real** line\nsame paragraph\n\nSecond"),
            Some("First real line same paragraph".to_string())
        );
        assert_eq!(first_paragraph("# Title\nright under it"), Some("right under it".to_string()));
        assert_eq!(first_paragraph("# Only a heading"), None);
    }

    #[test]
    fn test_normalize_for_echo_ignores_link_form_and_whitespace() {
        let on_disk = "---\ntitle: A\n---\nSee [[target]]  now\n\n";
        let reserialized = "---\ntitle: A\n---\nSee [target]* now\n";
        assert_eq!(normalize_for_echo(on_disk), normalize_for_echo(reserialized));
        assert_eq!(normalize_for_echo(on_disk), "--- title: A --- See target now");
    }

    #[test]
    fn test_normalize_for_echo_keeps_real_differences() {
        assert_ne!(
            normalize_for_echo("See [[target]] now"),
            normalize_for_echo("See [[target]] later")
        );
    }
}
