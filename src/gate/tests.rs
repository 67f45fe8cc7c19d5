use super::*;
use chrono::{Duration, TimeZone};

#[test]
fn test_every_declared_pair_is_symmetric() {
    let graph = LocationGraph::campus_default();
    for (a, b) in CAMPUS_ADJACENCY {
        assert!(graph.is_nearby(a, b), "{a} -> {b}");
        assert!(graph.is_nearby(b, a), "{b} -> {a}");
    }
}

#[test]
fn test_same_place_is_nearby() {
    let graph = LocationGraph::campus_default();
    assert!(graph.is_nearby("Library", "Library"));
    assert!(graph.is_nearby("Room 101", "room  101"));
}

#[test]
fn test_matching_is_case_and_space_insensitive() {
    let graph = LocationGraph::campus_default();
    assert!(graph.is_nearby("library", "  ACADEMIC BLOCK A "));
}

#[test]
fn test_unrelated_places_are_not_nearby() {
    let graph = LocationGraph::campus_default();
    assert!(!graph.is_nearby("Library", "Parking"));
    assert!(!graph.is_nearby("Hostel", "Main Gate"));
    assert!(!graph.is_nearby("Library", "Unknown Annex"));
}

#[test]
fn test_blank_place_never_matches() {
    let graph = LocationGraph::campus_default();
    assert!(!graph.is_nearby("", ""));
    assert!(!graph.is_nearby("  ", "Library"));
}

#[test]
fn test_adjacency_is_not_transitive() {
    let graph = LocationGraph::from_pairs([("a", "b"), ("b", "c")]);
    assert!(graph.is_nearby("a", "b"));
    assert!(graph.is_nearby("c", "b"));
    assert!(!graph.is_nearby("a", "c"));
}

#[test]
fn test_self_loops_are_ignored() {
    let graph = LocationGraph::from_pairs([("Library", "library")]);
    assert!(graph.is_empty());
}

#[test]
fn test_time_valid() {
    let lost = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();

    assert!(time_valid(lost, lost));
    assert!(time_valid(lost, lost + Duration::days(1)));
    assert!(!time_valid(lost, lost - Duration::days(1)));
    assert!(!time_valid(lost, lost - Duration::seconds(1)));
}
