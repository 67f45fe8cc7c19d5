//! Spatio-temporal gate.
//!
//! A candidate can only match when both predicates hold, whatever its similarity:
//! the two places are the same or adjacent, and the item was not found before it
//! was lost.

#[cfg(test)]
mod tests;

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

/// Campus adjacency, declared once per pair.
const CAMPUS_ADJACENCY: &[(&str, &str)] = &[
    ("Library", "Academic Block A"),
    ("Library", "Academic Block B"),
    ("Library", "Cafeteria"),
    ("Academic Block A", "Academic Block B"),
    ("Academic Block A", "Admin Block"),
    ("Academic Block B", "Auditorium"),
    ("Cafeteria", "Hostel"),
    ("Cafeteria", "Sports Complex"),
    ("Hostel", "Sports Complex"),
    ("Admin Block", "Main Gate"),
    ("Main Gate", "Parking"),
    ("Auditorium", "Parking"),
];

/// Symmetric, case-insensitive place adjacency.
#[derive(Debug, Clone, Default)]
pub struct LocationGraph {
    adjacency: HashMap<String, HashSet<String>>,
}

impl LocationGraph {
    /// Builds the graph, inserting every pair in both directions.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut graph = Self::default();
        for (a, b) in pairs {
            graph.connect(a, b);
        }
        graph
    }

    pub fn campus_default() -> Self {
        Self::from_pairs(CAMPUS_ADJACENCY.iter().copied())
    }

    pub fn connect(&mut self, a: &str, b: &str) {
        let (a, b) = (place_key(a), place_key(b));
        if a.is_empty() || b.is_empty() || a == b {
            return;
        }
        self.adjacency
            .entry(a.clone())
            .or_default()
            .insert(b.clone());
        self.adjacency.entry(b).or_default().insert(a);
    }

    /// `true` when the places are equal or declared adjacent. Blank places never match.
    pub fn is_nearby(&self, a: &str, b: &str) -> bool {
        let (a, b) = (place_key(a), place_key(b));
        if a.is_empty() || b.is_empty() {
            return false;
        }
        a == b || self.adjacency.get(&a).is_some_and(|near| near.contains(&b))
    }

    /// Number of places with at least one neighbour.
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}

/// Found time must not precede lost time.
#[inline]
pub fn time_valid(lost_at: DateTime<Utc>, found_at: DateTime<Utc>) -> bool {
    found_at >= lost_at
}

fn place_key(place: &str) -> String {
    place.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
