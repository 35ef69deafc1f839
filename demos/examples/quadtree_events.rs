// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quadtree events.
//!
//! Watch a tree subdivide, merge, and re-split through its lifecycle events.
//! Set `RUST_LOG=strata_quadtree=trace` to see the placement trace too.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p strata_demos --example quadtree_events`

use strata_quadtree::{
    EventLog, NodeEvent, PointEntity, Quadtree, QuadtreeConfig, TraceEvents,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = QuadtreeConfig::from_toml_str(
        r#"
        threshold = 3
        max_depth = 6
        "#,
    )
    .unwrap();
    let mut tree = Quadtree::new(0.0, 0.0, 256.0, 256.0, config).unwrap();
    let log = EventLog::default();
    tree.observe(Box::new(log.clone()));
    tree.observe(Box::new(TraceEvents));

    // A tight cluster in the north-east corner forces a few levels of splits.
    for i in 0..8_u64 {
        let f = i as f64;
        tree.add_object(PointEntity::new(i, 200.0 + f * 3.0, 200.0 + f * 2.0))
            .unwrap();
    }
    println!(
        "after clustering: {} nodes, {} subdivisions",
        tree.node_count(),
        log.subdivisions()
    );
    assert!(log.subdivisions() >= 1);

    // Thin the cluster out and fold the sparse children back into their parent.
    for i in 2..8_u64 {
        tree.del_object(&i);
    }
    let parent = tree.leaf_of(&0).and_then(|leaf| tree.node(leaf)?.parent());
    if let Some(parent) = parent {
        let merged = tree.purge_subnodes(parent).unwrap();
        println!("purged {parent:?}: {merged}");
    }

    // Lowering a leaf's threshold below its population splits it straight away.
    log.clear();
    for i in 10..13_u64 {
        let f = i as f64;
        tree.add_object(PointEntity::new(i, f * 5.0, f * 4.0)).unwrap();
    }
    let leaf = tree.leaf_of(&10).unwrap();
    tree.set_threshold(leaf, 1).unwrap();
    let adjusted = log
        .events()
        .iter()
        .filter(|e| matches!(e, NodeEvent::Adjusted { .. }))
        .count();
    println!("threshold adjustments seen: {adjusted}");
    assert_eq!(adjusted, 1);
    assert!(log.subdivisions() >= 1);

    tree.check_consistency().unwrap();
    for node in tree.nodes() {
        println!(
            "  {:?} depth={} objects={} leaf={}",
            node.id(),
            node.depth(),
            node.len(),
            !node.has_subnodes()
        );
    }
}
