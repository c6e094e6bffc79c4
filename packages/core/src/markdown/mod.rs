//! Markdown node file codec
//!
//! Converts between the on-disk form of a node (front matter plus a body with
//! `[[wikilinks]]`) and the in-memory form (`content` with `[name]*`
//! placeholders and a separate edge list).

mod links;
mod parser;
mod serializer;

pub use links::{
    demote_placeholders, extract_links, links_to_placeholders, normalize_link_name, placeholder,
    placeholder_names, placeholders_to_links, rewrite_placeholders, wikilink, ParsedLink,
    NODE_FILE_EXTENSION,
};
pub use parser::{parse_node_file, ParsedNodeFile};
pub use serializer::{to_markdown, unbacked_edges};
