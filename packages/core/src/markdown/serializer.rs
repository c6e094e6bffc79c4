//! Markdown file serialization
//!
//! `to_markdown` is the single path from a node to file text. Editor saves and
//! structural operations both go through it, so a file written by this process
//! always parses back to the same edges.

use serde_yaml::{Mapping, Value as YamlValue};
use tracing::warn;

use super::links::{normalize_link_name, placeholder_names, placeholders_to_links, wikilink};
use crate::models::{basename, Edge, Node, NodeUiMetadata};

/// Render `node` as the text of its markdown file.
///
/// Front matter carries the UI metadata, placeholders in the content become
/// wikilinks, and every edge not already written inline is appended as a
/// `- label [[target]]` line so the file stays the source of truth.
pub fn to_markdown(node: &Node) -> String {
    let mut out = String::new();

    if let Some(yaml) = front_matter(&node.ui_metadata) {
        out.push_str("---\n");
        out.push_str(&yaml);
        if !yaml.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("---\n");
    }

    out.push_str(&placeholders_to_links(&node.content));

    let unbacked = unbacked_edges(node);
    if !unbacked.is_empty() {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        if !node.content.trim().is_empty() {
            out.push('\n');
        }
        for edge in unbacked {
            if edge.label.is_empty() {
                out.push_str(&format!("- {}\n", wikilink(edge.target_id())));
            } else {
                out.push_str(&format!("- {} {}\n", edge.label, wikilink(edge.target_id())));
            }
        }
    }

    out
}

/// Edges of `node` with no matching placeholder in its content.
///
/// Placeholders are consumed one per edge, so two edges to the same target
/// need two placeholders.
pub fn unbacked_edges(node: &Node) -> Vec<&Edge> {
    let mut available: Vec<String> = placeholder_names(&node.content)
        .iter()
        .map(|name| normalize_link_name(name))
        .collect();

    node.outgoing_edges
        .iter()
        .filter(|edge| {
            let written = normalize_link_name(&edge.name);
            let target = normalize_link_name(edge.target_id());
            let target_base = basename(&target);
            let matched = available.iter().position(|name| {
                *name == written
                    || *name == target
                    || (edge.target.is_resolved() && name.as_str() == target_base)
            });
            match matched {
                Some(idx) => {
                    available.swap_remove(idx);
                    false
                }
                None => true,
            }
        })
        .collect()
}

fn front_matter(metadata: &NodeUiMetadata) -> Option<String> {
    let mut mapping = Mapping::new();

    if let Some(title) = &metadata.title {
        mapping.insert("title".into(), YamlValue::String(title.clone()));
    }
    if let Some(color) = &metadata.color {
        mapping.insert("color".into(), YamlValue::String(color.clone()));
    }
    if let Some(position) = metadata.position {
        let mut coords = Mapping::new();
        coords.insert("x".into(), YamlValue::Number(position.x.into()));
        coords.insert("y".into(), YamlValue::Number(position.y.into()));
        mapping.insert("position".into(), YamlValue::Mapping(coords));
    }
    if metadata.is_context_node {
        mapping.insert("isContextNode".into(), YamlValue::Bool(true));
    }
    for (key, value) in &metadata.extra_properties {
        match serde_yaml::to_value(value) {
            Ok(yaml) => {
                mapping.insert(key.as_str().into(), yaml);
            }
            Err(e) => warn!("Skipping front matter key {}: {}", key, e),
        }
    }

    if mapping.is_empty() {
        return None;
    }

    match serde_yaml::to_string(&YamlValue::Mapping(mapping)) {
        Ok(yaml) => Some(yaml),
        Err(e) => {
            warn!("Failed to serialize front matter: {}", e);
            None
        }
    }
}
