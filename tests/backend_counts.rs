//! Tests for the shared counting helper.

mod common;

use common::BackendCounts;

#[test]
fn test_backend_counts_inc() {
    let mut bc = BackendCounts::new();
    bc.inc("b1");
    bc.inc("b1");
    bc.inc("b2");

    let expected: BackendCounts<&str> = [("b1", 2), ("b2", 1)].into_iter().collect();
    assert_eq!(bc, expected);
    assert_eq!(bc.get(&"b3"), 0);
}

#[test]
fn test_backend_counts_merge() {
    let mut bc1: BackendCounts<&str> = [("b1", 1)].into_iter().collect();
    let bc2: BackendCounts<&str> = [("b2", 2), ("b3", 3)].into_iter().collect();

    bc1.merge(bc2);

    let expected: BackendCounts<&str> = [("b1", 1), ("b2", 2), ("b3", 3)].into_iter().collect();
    assert_eq!(bc1, expected);
    assert_eq!(bc1.total(), 6);
}
