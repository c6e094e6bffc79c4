//! Benchmarks for VaultGraph core graph operations
//!
//! Run with: `cargo bench -p vaultgraph-core`
//!
//! These benchmarks cover the paths that run on every change in a large vault:
//! - Applying a single-node delta to a 2000-node graph
//! - Building a markdown node file from text and back
//! - Spanning tree, ASCII tree and context extraction on a cyclic graph

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::path::Path;
use vaultgraph_core::markdown::{parse_node_file, to_markdown};
use vaultgraph_core::sync::map_fs_event;
use vaultgraph_core::utils::render_ascii_tree;
use vaultgraph_core::{
    apply_graph_delta, extract_context, spanning_tree, ContentLevel, Edge, FsEvent, FsEventKind,
    Graph, Node, NodeDelta,
};

/// Generate a vault graph with N nodes, each linking to its successor and to
/// a node a few steps back, so the graph is full of cycles
fn generate_graph(node_count: usize) -> Graph {
    let nodes = (0..node_count).map(|i| {
        let next = format!("note-{}", (i + 1) % node_count);
        let back = format!("note-{}", i.saturating_sub(7));
        Node::new(
            format!("note-{i}"),
            format!("# Note {i}\n\nBody text for note {i}.\n\n- next [{next}]*\n- see_also [{back}]*"),
        )
        .with_edges(vec![
            Edge::resolved(next.clone(), "next"),
            Edge::resolved(back.clone(), "see also"),
        ])
    });
    Graph::from_nodes(nodes)
}

fn bench_reducer(c: &mut Criterion) {
    let graph = generate_graph(2000);
    let previous = graph.get("note-1000").cloned();
    let updated = Node::new("note-1000", "rewritten [[note-3]]")
        .with_edges(vec![Edge::resolved("note-3", "")]);
    let delta = vec![NodeDelta::upsert(updated, previous)];

    c.bench_function("apply_graph_delta_2000_nodes", |b| {
        b.iter(|| apply_graph_delta(black_box(&graph), black_box(&delta)))
    });
}

fn bench_node_files(c: &mut Criterion) {
    let graph = generate_graph(2000);
    let text = match graph.get("note-42") {
        Some(node) => to_markdown(node),
        None => String::new(),
    };
    let root = Path::new("/vault");
    let event = FsEvent::new(FsEventKind::Change, "/vault/note-42.md").with_content(text.clone());

    let mut group = c.benchmark_group("node_files");
    group.bench_function("parse_node_file", |b| {
        b.iter(|| parse_node_file(black_box(&text)))
    });
    group.bench_function("map_fs_event_change", |b| {
        b.iter(|| map_fs_event(black_box(&event), root, black_box(&graph)))
    });
    group.finish();
}

fn bench_traversal(c: &mut Criterion) {
    let graph = generate_graph(2000);

    let mut group = c.benchmark_group("traversal");
    group.sample_size(20); // Whole-graph walks
    group.bench_function("spanning_tree_2000_nodes", |b| {
        b.iter(|| spanning_tree(black_box(&graph), "note-0"))
    });
    group.bench_function("render_ascii_tree_forced_root", |b| {
        b.iter(|| render_ascii_tree(black_box(&graph), Some("note-0")))
    });
    group.bench_function("extract_context_distance_3", |b| {
        b.iter(|| extract_context(black_box(&graph), "note-500", 3, ContentLevel::FullContent))
    });
    group.finish();
}

criterion_group!(benches, bench_reducer, bench_node_files, bench_traversal);
criterion_main!(benches);
