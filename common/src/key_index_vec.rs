use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::Index;

use hashbrown::HashMap;
use serde::de::{Error as SerdeError, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Values stored in a [`KeyIndexVec`] carry their own key.
pub trait KeyIndexKey<K> {
    fn key(&self) -> &K;
}

/// Insertion-ordered vector with O(1) lookup by key.
///
/// Serializes as a map (`key -> value`) in insertion order.
#[derive(Debug, Clone)]
pub struct KeyIndexVec<K: Clone + Eq + Hash, V: KeyIndexKey<K>> {
    items: Vec<V>,
    idx_by_key: HashMap<K, usize>,
}

impl<K, V> Default for KeyIndexVec<K, V>
where
    K: Clone + Eq + Hash,
    V: KeyIndexKey<K>,
{
    fn default() -> Self {
        Self {
            items: Vec::new(),
            idx_by_key: HashMap::new(),
        }
    }
}

impl<K, V> KeyIndexVec<K, V>
where
    K: Clone + Eq + Hash,
    V: KeyIndexKey<K>,
{
    /// Appends `v`, or replaces the existing value with the same key in place.
    pub fn push(&mut self, v: V) {
        match self.idx_by_key.get(v.key()).copied() {
            Some(idx) => self.items[idx] = v,
            None => {
                self.idx_by_key.insert(v.key().clone(), self.items.len());
                self.items.push(v);
            }
        }
    }

    /// Returns the value for `key`, creating it with `create` on first use.
    pub fn get_or_insert_with(&mut self, key: &K, create: impl FnOnce() -> V) -> &mut V {
        let idx = match self.idx_by_key.get(key).copied() {
            Some(idx) => idx,
            None => {
                let value = create();
                assert!(value.key() == key, "created value must carry the requested key");
                let idx = self.items.len();
                self.idx_by_key.insert(key.clone(), idx);
                self.items.push(value);
                idx
            }
        };
        &mut self.items[idx]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.items.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.items.iter().map(|v| v.key())
    }

    pub fn len(&self) -> usize {
        assert_eq!(self.items.len(), self.idx_by_key.len());
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        assert_eq!(self.items.len(), self.idx_by_key.len());
        self.items.is_empty()
    }

    pub fn index_of_key(&self, key: &K) -> Option<usize> {
        self.idx_by_key.get(key).copied()
    }

    pub fn by_key(&self, key: &K) -> Option<&V> {
        self.index_of_key(key).map(|idx| &self.items[idx])
    }
}

impl<K, V> PartialEq for KeyIndexVec<K, V>
where
    K: Clone + Eq + Hash,
    V: KeyIndexKey<K> + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<K, V> Index<usize> for KeyIndexVec<K, V>
where
    K: Clone + Eq + Hash,
    V: KeyIndexKey<K>,
{
    type Output = V;

    fn index(&self, idx: usize) -> &Self::Output {
        assert!(idx < self.items.len());
        &self.items[idx]
    }
}

impl<'a, K, V> IntoIterator for &'a KeyIndexVec<K, V>
where
    K: Clone + Eq + Hash,
    V: KeyIndexKey<K>,
{
    type Item = &'a V;
    type IntoIter = std::slice::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<K, V> Serialize for KeyIndexVec<K, V>
where
    K: Clone + Eq + Hash + Serialize,
    V: KeyIndexKey<K> + Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.items.len()))?;
        for item in &self.items {
            map.serialize_entry(item.key(), item)?;
        }
        map.end()
    }
}

/// Deserialized values whose key lives outside the value body (the map key)
/// get it restored through this hook.
pub trait KeyIndexRestore<K>: KeyIndexKey<K> {
    fn restore_key(&mut self, key: K);
}

impl<'de, K, V> Deserialize<'de> for KeyIndexVec<K, V>
where
    K: Clone + Eq + Hash + Deserialize<'de>,
    V: KeyIndexRestore<K> + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MapVisitor<K, V>(PhantomData<(K, V)>);

        impl<'de, K, V> Visitor<'de> for MapVisitor<K, V>
        where
            K: Clone + Eq + Hash + Deserialize<'de>,
            V: KeyIndexRestore<K> + Deserialize<'de>,
        {
            type Value = KeyIndexVec<K, V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of keyed values")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut out = KeyIndexVec::default();
                while let Some((key, mut value)) = access.next_entry::<K, V>()? {
                    if out.idx_by_key.contains_key(&key) {
                        return Err(A::Error::custom("Duplicate key in KeyIndexVec"));
                    }
                    value.restore_key(key);
                    out.push(value);
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(MapVisitor(PhantomData))
    }
}
