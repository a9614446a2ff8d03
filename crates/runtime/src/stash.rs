use crate::Value;
use indexmap::IndexMap;
use rustc_hash::FxHasher;
use std::{
    hash::BuildHasherDefault,
    ops::{Deref, DerefMut},
};

type StashMap = IndexMap<String, Value, BuildHasherDefault<FxHasher>>;

/// The variable bag supplied by the embedder
///
/// Maps identifiers to the [Value]s that form a render's initial
/// environment. The VM only reads from it.
#[derive(Clone, Default)]
pub struct Stash(StashMap);

impl Stash {
    /// Makes an empty stash
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes an empty stash with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self(StashMap::with_capacity_and_hasher(
            capacity,
            Default::default(),
        ))
    }

    /// Sets a variable
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }
}

impl Deref for Stash {
    type Target = StashMap;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Stash {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<(String, Value)> for Stash {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(StashMap::from_iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut stash = Stash::new();
        stash.set("name", "Ada");
        stash.set("count", 3i64);

        assert_eq!(stash.get("name"), Some(&Value::from("Ada")));
        assert_eq!(stash.get("count"), Some(&Value::Int(3)));
        assert_eq!(stash.get("missing"), None);
    }

    #[test]
    fn preserves_insertion_order() {
        let mut stash = Stash::new();
        stash.set("b", 1i64);
        stash.set("a", 2i64);

        let keys: Vec<_> = stash.keys().cloned().collect();
        assert_eq!(keys, vec!["b".to_string(), "a".to_string()]);
    }
}
