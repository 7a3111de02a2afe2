//! Availability results and the persisted record map.

use std::collections::BTreeMap;

/// Identifier → Unix timestamp (seconds) when it was first seen available.
///
/// A `BTreeMap` keeps the serialized file in a stable key order so repeated
/// saves of the same state produce identical bytes.
pub type PersistedState = BTreeMap<String, i64>;

/// Outcome of a successful availability lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// The service confirmed nobody owns the identifier.
    Available,
    /// The identifier has an owner.
    Taken,
}

impl Availability {
    pub fn is_available(self) -> bool {
        matches!(self, Availability::Available)
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Availability::Available => write!(f, "available"),
            Availability::Taken => write!(f, "taken"),
        }
    }
}
