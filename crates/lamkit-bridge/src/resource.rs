//! Named binary resources offered to the native module.

use indexmap::IndexMap;
use log::warn;

/// One named resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceEntry {
    /// Name the native side looks the resource up by.
    pub name: String,
    /// Raw bytes.
    pub data: Vec<u8>,
}

impl ResourceEntry {
    /// Create an entry.
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// An ordered set of resources keyed by name.
///
/// Iteration follows insertion order, which is the order the entries
/// appear in the marshalled tables. Inserting an existing name replaces
/// its bytes without moving it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceSet {
    entries: IndexMap<String, Vec<u8>>,
}

impl ResourceSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding a single resource.
    pub fn single(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        let mut set = Self::new();
        set.insert(name, data);
        set
    }

    /// Insert or replace a resource, returning the bytes it replaced.
    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Option<Vec<u8>> {
        self.entries.insert(name.into(), data.into())
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(name, data);
        self
    }

    /// Remove a resource, keeping the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
        self.entries.shift_remove(name)
    }

    /// Bytes of the named resource.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Number of resources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries
            .iter()
            .map(|(name, data)| (name.as_str(), data.as_slice()))
    }

    /// Total payload bytes, excluding names.
    pub fn data_bytes(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

/// Entries sharing a name collapse into one: the last bytes win and the
/// name keeps its first position. Each collapse is logged.
impl FromIterator<ResourceEntry> for ResourceSet {
    fn from_iter<I: IntoIterator<Item = ResourceEntry>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

/// Same collapsing rule as [`FromIterator`]: a name already in the set has
/// its bytes replaced in place, with a warning.
impl Extend<ResourceEntry> for ResourceSet {
    fn extend<I: IntoIterator<Item = ResourceEntry>>(&mut self, iter: I) {
        for entry in iter {
            let len = entry.data.len();
            if let Some(previous) = self.insert(entry.name.as_str(), entry.data) {
                warn!(
                    "resource {:?} given twice; {} bytes replace the earlier {}",
                    entry.name,
                    len,
                    previous.len()
                );
            }
        }
    }
}
