//! Integration test: loading structure descriptions from disk.

use std::fs;
use std::path::PathBuf;

use hardy_core::{BuildError, EndIndex, NodeId};
use hardy_frame::{load_structure, LoadError};

fn scratch(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("hardy-frame-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn loads_and_normalizes() {
    // Raw factors 3 and 1 at node 1 normalize to 0.75 / 0.25.
    let path = scratch(
        "beam.txt",
        "3\n0 F\n1 N\n2 F\n2\n0 1 0 -50 1 3 0 50\n1 1 0 -80 2 1 0 80\n",
    );
    let s = load_structure(&path).unwrap();
    let node = s.node(NodeId(1)).unwrap();
    assert!((node.ends()[0].df() - 0.75).abs() < 1e-12);
    assert!((node.ends()[1].df() - 0.25).abs() < 1e-12);
    assert_eq!(s.moment(NodeId(2), EndIndex(0)), Some(80.0));
}

#[test]
fn missing_file_is_io_error() {
    let path = std::env::temp_dir().join("hardy-frame-no-such-file.txt");
    assert!(matches!(load_structure(&path), Err(LoadError::Io(_))));
}

#[test]
fn unknown_node_builds_nothing() {
    let path = scratch("unknown.txt", "3\n0 F 1 N 2 N\n2\n0 1 0 -1 1 1 0 1\n1 1 0 -1 99 1 0 1\n");
    match load_structure(&path) {
        Err(LoadError::Build(BuildError::UnreachableNode { node, member })) => {
            assert_eq!(node, NodeId(99));
            assert_eq!(member, 1);
        }
        other => panic!("expected UnreachableNode, got {other:?}"),
    }
}

#[test]
fn listing_round_trips_node_count() {
    let path = scratch("listing.txt", "2\n0 F\n1 N\n1\n0 1 0 -10 1 1 0 10\n");
    let s = load_structure(&path).unwrap();
    let listing = s.to_string();
    assert_eq!(listing.matches("Node id:").count(), 2);
    assert!(listing.contains("End df: 1.00 moment: 10.0"));
}
