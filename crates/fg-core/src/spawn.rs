//! Weighted choice list

use fg_rng::LayoutRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Append-only list of `(item, weight)` pairs.
///
/// `pick` rolls once over the total weight and walks the entries in insertion
/// order, so every entry's chance is exactly `weight / total`. Serialized as
/// a plain list of `[item, weight]` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnList<T> {
    entries: Vec<(T, i32)>,
    total: i32,
}

impl<T> Default for SpawnList<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            total: 0,
        }
    }
}

impl<T> SpawnList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. Non-positive weights are ignored.
    pub fn add(&mut self, item: T, weight: i32) {
        if weight <= 0 {
            return;
        }
        self.entries.push((item, weight));
        self.total += weight;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_weight(&self) -> i32 {
        self.total
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|(item, _)| item)
    }

    pub fn weight(&self, index: usize) -> Option<i32> {
        self.entries.get(index).map(|(_, w)| *w)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(item, _)| item)
    }

    /// Index of a weighted random entry. Draws once, or not at all when empty.
    pub fn pick_index(&self, rng: &mut dyn LayoutRng) -> Option<usize> {
        if self.total <= 0 {
            return None;
        }
        let mut rolled = rng.next_max(self.total);
        for (i, (_, weight)) in self.entries.iter().enumerate() {
            if rolled < *weight {
                return Some(i);
            }
            rolled -= weight;
        }
        None
    }

    /// A weighted random entry. Draws once, or not at all when empty.
    pub fn pick(&self, rng: &mut dyn LayoutRng) -> Option<&T> {
        self.pick_index(rng).map(|i| &self.entries[i].0)
    }
}

impl<T> FromIterator<(T, i32)> for SpawnList<T> {
    fn from_iter<I: IntoIterator<Item = (T, i32)>>(iter: I) -> Self {
        let mut list = SpawnList::new();
        for (item, weight) in iter {
            list.add(item, weight);
        }
        list
    }
}

impl<T: Serialize> Serialize for SpawnList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for SpawnList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<(T, i32)>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}
