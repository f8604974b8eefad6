use indexmap::IndexMap;
use std::hash::Hash;
use std::ops::Index;

/// An immutable, ordered map from a subset of store keys to their values.
#[derive(Clone, Debug)]
pub struct Composite<K, V> {
    entries: IndexMap<K, V>,
}

impl<K: Hash + Eq, V> Composite<K, V> {
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }

    pub fn into_inner(self) -> IndexMap<K, V> {
        self.entries
    }
}

impl<K: Hash + Eq, V: PartialEq> PartialEq for Composite<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Hash + Eq, V: Eq> Eq for Composite<K, V> {}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for Composite<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<K: Hash + Eq, V> Index<&K> for Composite<K, V> {
    type Output = V;

    /// # Panics
    ///
    /// Panics if `key` is not part of the composite.
    fn index(&self, key: &K) -> &V {
        &self.entries[key]
    }
}

impl<'a, K, V> IntoIterator for &'a Composite<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = indexmap::map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_deep() {
        let a: Composite<&str, Vec<i32>> = [("x", vec![1, 2])].into_iter().collect();
        let b: Composite<&str, Vec<i32>> = [("x", vec![1, 2])].into_iter().collect();
        let c: Composite<&str, Vec<i32>> = [("x", vec![1, 3])].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn preserves_insertion_order() {
        let composite: Composite<&str, i32> = [("b", 2), ("a", 1)].into_iter().collect();
        assert_eq!(composite.keys().copied().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(composite[&"a"], 1);
        assert!(composite.get(&"c").is_none());
    }
}
