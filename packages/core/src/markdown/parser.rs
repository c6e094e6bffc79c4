//! Markdown file parsing
//!
//! A node file is optional YAML front matter followed by a markdown body:
//!
//! ```text
//! ---
//! title: Weekly plan
//! color: "#ffaa00"
//! position: { x: 10.0, y: 20.0 }
//! ---
//! # Plan
//! - refines [[goals]]
//! ```

use serde_yaml::{Mapping, Value as YamlValue};
use tracing::debug;

use super::links::{extract_links, links_to_placeholders, ParsedLink};
use crate::models::{NodeUiMetadata, Position};

/// Result of reading one node file, before link resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedNodeFile {
    pub metadata: NodeUiMetadata,
    /// Body with every `[[x]]` replaced by `[x]*`
    pub content: String,
    pub links: Vec<ParsedLink>,
}

/// Parse the text of a node file.
///
/// Never fails: front matter that is not a YAML mapping is treated as absent and
/// the whole text becomes the body, so nothing the user wrote is dropped.
pub fn parse_node_file(text: &str) -> ParsedNodeFile {
    let (front_matter, body) = split_front_matter(text);
    let metadata = front_matter
        .map(metadata_from_front_matter)
        .unwrap_or_default();

    ParsedNodeFile {
        metadata,
        content: links_to_placeholders(body),
        links: extract_links(body),
    }
}

/// Split `text` into its front-matter mapping and body.
fn split_front_matter(text: &str) -> (Option<Mapping>, &str) {
    let Some(rest) = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))
    else {
        return (None, text);
    };

    let (yaml, body) = if let Some(rest_body) = rest.strip_prefix("---\n") {
        ("", rest_body)
    } else if let Some(idx) = rest.find("\n---\n") {
        (&rest[..idx], &rest[idx + 5..])
    } else if let Some(idx) = rest.find("\n---\r\n") {
        (&rest[..idx], &rest[idx + 6..])
    } else if let Some(yaml) = rest.strip_suffix("\n---") {
        (yaml, "")
    } else {
        return (None, text);
    };

    if yaml.trim().is_empty() {
        return (Some(Mapping::new()), body);
    }

    match serde_yaml::from_str::<YamlValue>(yaml) {
        Ok(YamlValue::Mapping(mapping)) => (Some(mapping), body),
        Ok(YamlValue::Null) => (Some(Mapping::new()), body),
        Ok(_) => {
            debug!("Front matter is not a mapping, keeping it as body text");
            (None, text)
        }
        Err(e) => {
            debug!("Unparseable front matter, keeping it as body text: {}", e);
            (None, text)
        }
    }
}

/// Map known front-matter keys onto [`NodeUiMetadata`].
///
/// Known keys with an unexpected shape are kept in `extra_properties` rather
/// than dropped.
fn metadata_from_front_matter(mapping: Mapping) -> NodeUiMetadata {
    let mut metadata = NodeUiMetadata::default();

    for (key, value) in mapping {
        let Some(key) = yaml_key(&key) else {
            debug!("Skipping non-scalar front matter key");
            continue;
        };

        match key.as_str() {
            "title" => match scalar_string(&value) {
                Some(title) => metadata.title = Some(title),
                None => keep_extra(&mut metadata, key, &value),
            },
            "color" => match scalar_string(&value) {
                Some(color) => metadata.color = Some(color),
                None => keep_extra(&mut metadata, key, &value),
            },
            "position" => match yaml_position(&value) {
                Some(position) => metadata.position = Some(position),
                None => keep_extra(&mut metadata, key, &value),
            },
            "isContextNode" | "is_context_node" => match value.as_bool() {
                Some(flag) => metadata.is_context_node = flag,
                None => keep_extra(&mut metadata, key, &value),
            },
            _ => keep_extra(&mut metadata, key, &value),
        }
    }

    metadata
}

fn yaml_key(key: &YamlValue) -> Option<String> {
    match key {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn scalar_string(value: &YamlValue) -> Option<String> {
    match value {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn yaml_position(value: &YamlValue) -> Option<Position> {
    let x = value.get("x")?.as_f64()?;
    let y = value.get("y")?.as_f64()?;
    Some(Position::new(x, y))
}

fn keep_extra(metadata: &mut NodeUiMetadata, key: String, value: &YamlValue) {
    match serde_json::to_value(value) {
        Ok(json) => {
            metadata.extra_properties.insert(key, json);
        }
        Err(e) => debug!("Dropping front matter key {} with unsupported value: {}", key, e),
    }
}
