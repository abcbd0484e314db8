//! The generic-parameter environment: a small mapping from in-scope
//! parameter names to their declared `Variance`.
//!
//! Sizes are bounded by the number of tparams in scope (typically <= 8), so
//! a hash map sized for that is already generous; an association list would
//! have worked too (see design notes).

use rustc_hash::FxHashMap;

use crate::polarity::Variance;
use crate::types::Name;

#[derive(Clone, Debug, Default)]
pub struct Environment(FxHashMap<Name, Variance>);

impl Environment {
    pub fn new() -> Self {
        Self(FxHashMap::default())
    }

    pub fn insert(&mut self, name: Name, variance: Variance) {
        self.0.insert(name, variance);
    }

    /// The declared variance of `name`, or `Bivariant` if it is not in scope.
    pub fn get(&self, name: &str) -> Variance {
        self.0.get(name).cloned().unwrap_or(Variance::Bivariant)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// A copy of this environment with the given names removed. Used when
    /// entering a function's own scope: its type parameters shadow (and are
    /// not subject to) the enclosing class's variance discipline.
    pub fn without(&self, names: impl IntoIterator<Item = Name>) -> Environment {
        let mut copy = self.clone();
        for name in names {
            copy.0.remove(&name);
        }
        copy
    }
}
