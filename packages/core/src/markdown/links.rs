//! Wikilinks and node placeholders
//!
//! On disk a link is written `[[target]]`. In a node's `content` the same link is
//! the placeholder `[target]*`, and the link itself lives in `outgoing_edges`.
//! The raw target text is kept verbatim in both forms so a file round-trips.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static WIKILINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]\n]+?)\]\]").unwrap());

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]\n]+?)\]\*").unwrap());

/// Extension of node files, without the dot
pub const NODE_FILE_EXTENSION: &str = "md";

/// A `[[target]]` reference found in a file body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLink {
    /// Target text exactly as written between the brackets
    pub name: String,
    /// Relationship text preceding the link on its line, possibly empty
    pub label: String,
}

/// Every wikilink of `body`, in order of appearance.
///
/// The label of a link is the text between the start of its line (or the end of
/// the previous link on that line) and the link, with list markers, a trailing
/// `:` and underscores cleaned up: `- is_a_child_of [[parent]]` has label
/// `is a child of`.
pub fn extract_links(body: &str) -> Vec<ParsedLink> {
    let mut links = Vec::new();
    for line in body.lines() {
        let mut cursor = 0;
        for caps in WIKILINK_RE.captures_iter(line) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            links.push(ParsedLink {
                name: name.as_str().to_string(),
                label: link_label(&line[cursor..whole.start()]),
            });
            cursor = whole.end();
        }
    }
    links
}

fn link_label(prefix: &str) -> String {
    let mut text = prefix.trim();
    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = text.strip_prefix(marker) {
            text = rest.trim_start();
            break;
        }
    }
    if text == "-" || text == "*" || text == "+" {
        text = "";
    }
    text.trim_end_matches(':').trim().replace('_', " ")
}

/// Placeholder text for a link name: `name` → `[name]*`
pub fn placeholder(name: &str) -> String {
    format!("[{name}]*")
}

/// Wikilink text for a link name: `name` → `[[name]]`
pub fn wikilink(name: &str) -> String {
    format!("[[{name}]]")
}

/// Replace every `[[x]]` with `[x]*`
pub fn links_to_placeholders(body: &str) -> String {
    WIKILINK_RE
        .replace_all(body, |caps: &Captures| placeholder(&caps[1]))
        .into_owned()
}

/// Replace every `[x]*` with `[[x]]`
pub fn placeholders_to_links(content: &str) -> String {
    PLACEHOLDER_RE
        .replace_all(content, |caps: &Captures| wikilink(&caps[1]))
        .into_owned()
}

/// Raw names of every placeholder in `content`, in order, duplicates kept
pub fn placeholder_names(content: &str) -> Vec<String> {
    PLACEHOLDER_RE
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Rewrite placeholders: `rename` receives each raw name and returns the new
/// name, or `None` to leave that placeholder as it is.
pub fn rewrite_placeholders<F>(content: &str, rename: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    PLACEHOLDER_RE
        .replace_all(content, |caps: &Captures| match rename(&caps[1]) {
            Some(name) => placeholder(&name),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Turn matching placeholders back into plain text: `[x]*` → `x`
pub fn demote_placeholders<F>(content: &str, should_demote: F) -> String
where
    F: Fn(&str) -> bool,
{
    PLACEHOLDER_RE
        .replace_all(content, |caps: &Captures| {
            if should_demote(&caps[1]) {
                caps[1].to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Canonical node-id form of a link name.
///
/// Trims whitespace, converts `\` separators, and drops a leading `./` and a
/// trailing `.md`.
pub fn normalize_link_name(raw: &str) -> String {
    let trimmed = raw.trim().replace('\\', "/");
    let without_dot = trimmed.strip_prefix("./").unwrap_or(&trimmed);
    let suffix = format!(".{NODE_FILE_EXTENSION}");
    without_dot
        .strip_suffix(suffix.as_str())
        .unwrap_or(without_dot)
        .to_string()
}
