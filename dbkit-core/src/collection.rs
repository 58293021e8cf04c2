//! Ordered collection wrapper returned by list queries.

use std::fmt;
use std::hash::Hash;
use std::ops::{Index, RangeBounds};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::page::clamped_slice;

/// Items shown by [`Collection`]'s `Display` before the rest is summarized
const DISPLAY_LIMIT: usize = 10;

/// An ordered list of items with lookup, grouping and choice helpers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection<T> {
    items: Vec<T>,
}

/// A value/label pair for select widgets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice<V, L> {
    pub value: V,
    pub label: L,
}

impl<T> Collection<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    /// First item matching `predicate`.
    pub fn find<P>(&self, mut predicate: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.items.iter().find(|item| predicate(*item))
    }

    pub fn reverse(mut self) -> Self {
        self.items.reverse();
        self
    }

    /// Consecutive chunks of `size` items; the last chunk may be shorter.
    ///
    /// # Panics
    ///
    /// Panics if `size` is 0.
    pub fn chunk(&self, size: usize) -> std::slice::Chunks<'_, T> {
        self.items.chunks(size)
    }

    /// Extract one value from every item.
    pub fn pluck<U, F>(&self, f: F) -> Vec<U>
    where
        F: FnMut(&T) -> U,
    {
        self.items.iter().map(f).collect()
    }

    pub fn filter<'a, P>(&'a self, mut predicate: P) -> impl Iterator<Item = &'a T> + 'a
    where
        P: FnMut(&T) -> bool + 'a,
    {
        self.items.iter().filter(move |item| predicate(*item))
    }

    /// Group items by key, keeping first-seen key order.
    pub fn group_by<K, F>(&self, mut key: F) -> IndexMap<K, Vec<T>>
    where
        K: Hash + Eq,
        F: FnMut(&T) -> K,
        T: Clone,
    {
        let mut groups: IndexMap<K, Vec<T>> = IndexMap::new();
        for item in &self.items {
            groups.entry(key(item)).or_default().push(item.clone());
        }
        groups
    }

    /// Index items by key; later items replace earlier ones with the same key.
    pub fn key_value<K, F>(&self, mut key: F) -> IndexMap<K, T>
    where
        K: Hash + Eq,
        F: FnMut(&T) -> K,
        T: Clone,
    {
        self.items
            .iter()
            .map(|item| (key(item), item.clone()))
            .collect()
    }

    /// `(value, label)` pairs, in collection order.
    pub fn choices<V, L, FL, FV>(&self, mut label: FL, mut value: FV) -> Vec<(V, L)>
    where
        FL: FnMut(&T) -> L,
        FV: FnMut(&T) -> V,
    {
        self.items
            .iter()
            .map(|item| (value(item), label(item)))
            .collect()
    }

    /// Like [`Collection::choices`] but as serializable records.
    pub fn choices_dict<V, L, FL, FV>(&self, label: FL, value: FV) -> Vec<Choice<V, L>>
    where
        FL: FnMut(&T) -> L,
        FV: FnMut(&T) -> V,
    {
        self.choices(label, value)
            .into_iter()
            .map(|(value, label)| Choice { value, label })
            .collect()
    }

    /// Insert `item` at `index`, shifting later items right.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, item: T) {
        self.items.insert(index, item);
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Sub-slice clamped to the collection bounds.
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> &[T] {
        clamped_slice(&self.items, range)
    }

    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.items.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T> From<Vec<T>> for Collection<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T> FromIterator<T> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for Collection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> Index<usize> for Collection<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T: PartialEq> PartialEq<Vec<T>> for Collection<T> {
    fn eq(&self, other: &Vec<T>) -> bool {
        &self.items == other
    }
}

impl<T: PartialEq> PartialEq<[T]> for Collection<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.items == other
    }
}

impl<T: fmt::Display> fmt::Display for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Collection: [")?;
        for (i, item) in self.items.iter().take(DISPLAY_LIMIT).enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", item)?;
        }
        if self.items.len() > DISPLAY_LIMIT {
            write!(f, " and {} items more", self.items.len() - DISPLAY_LIMIT)?;
        }
        write!(f, "]>")
    }
}
