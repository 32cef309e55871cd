//! Two-field immutable tuple
//!
//! `Pair<K, V>` is the element type of every table and the result type of
//! key/value projections.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An immutable (first, second) tuple.
///
/// Fields are only reachable through accessors; a pair is replaced, never
/// edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Pair<K, V> {
    first: K,
    second: V,
}

impl<K, V> Pair<K, V> {
    /// Create a pair from its two components
    pub fn of(first: K, second: V) -> Self {
        Pair { first, second }
    }

    /// First component (the key of a table row)
    #[inline]
    pub fn first(&self) -> &K {
        &self.first
    }

    /// Second component (the value of a table row)
    #[inline]
    pub fn second(&self) -> &V {
        &self.second
    }

    /// Consume the pair and return both components
    #[inline]
    pub fn into_parts(self) -> (K, V) {
        (self.first, self.second)
    }

    /// Consume the pair and return the first component
    #[inline]
    pub fn into_first(self) -> K {
        self.first
    }

    /// Consume the pair and return the second component
    #[inline]
    pub fn into_second(self) -> V {
        self.second
    }

    /// Apply `f` to the second component, keeping the first
    pub fn map_second<W, F>(self, f: F) -> Pair<K, W>
    where
        F: FnOnce(V) -> W,
    {
        Pair {
            first: self.first,
            second: f(self.second),
        }
    }
}

impl<K, V> From<(K, V)> for Pair<K, V> {
    fn from((first, second): (K, V)) -> Self {
        Pair::of(first, second)
    }
}

impl<K, V> From<Pair<K, V>> for (K, V) {
    fn from(pair: Pair<K, V>) -> Self {
        pair.into_parts()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for Pair<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.first, self.second)
    }
}
