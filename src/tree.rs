use crate::boxes::{FourCC, Mp4Box};
use indexmap::IndexMap;
use serde::Serialize;

/// What a type tag maps to within one parent.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Entry {
    /// The common case: one box per tag.
    Single(Mp4Box),
    /// Tags registered as repeatable (`trak`), in file order.
    Repeated(Vec<Mp4Box>),
    /// `uuid` boxes, keyed by their canonical UUID string.
    Keyed(IndexMap<String, Mp4Box>),
}

/// Children of one parent, keyed by type tag in file order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct BoxTree {
    entries: IndexMap<FourCC, Entry>,
}

impl BoxTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a box under its own tag. A later box with the same tag replaces
    /// the earlier one in place.
    pub fn insert(&mut self, b: Mp4Box) {
        self.entries.insert(b.typ, Entry::Single(b));
    }

    /// Append a box to the sequence stored under its tag.
    pub fn push(&mut self, b: Mp4Box) {
        match self.entries.entry(b.typ).or_insert_with(|| Entry::Repeated(Vec::new())) {
            Entry::Repeated(list) => list.push(b),
            other => *other = Entry::Repeated(vec![b]),
        }
    }

    /// Store a box under `tag[key]`.
    pub fn insert_keyed(&mut self, key: String, b: Mp4Box) {
        match self.entries.entry(b.typ).or_insert_with(|| Entry::Keyed(IndexMap::new())) {
            Entry::Keyed(map) => {
                map.insert(key, b);
            }
            other => {
                let typ = b.typ;
                *other = Entry::Keyed(IndexMap::from([(key, b)]));
                tracing::warn!("{typ} entry replaced by keyed variant");
            }
        }
    }

    pub fn get(&self, typ: &FourCC) -> Option<&Entry> {
        self.entries.get(typ)
    }

    /// The box stored under `typ`, if that tag holds a single box.
    pub fn single(&self, typ: &FourCC) -> Option<&Mp4Box> {
        match self.entries.get(typ)? {
            Entry::Single(b) => Some(b),
            _ => None,
        }
    }

    pub fn repeated(&self, typ: &FourCC) -> &[Mp4Box] {
        match self.entries.get(typ) {
            Some(Entry::Repeated(list)) => list,
            _ => &[],
        }
    }

    pub fn keyed(&self, typ: &FourCC, key: &str) -> Option<&Mp4Box> {
        match self.entries.get(typ)? {
            Entry::Keyed(map) => map.get(key),
            _ => None,
        }
    }

    /// Swap the box stored under its tag for `b`, keeping its position.
    pub fn replace(&mut self, b: Mp4Box) -> bool {
        match self.entries.get_mut(&b.typ) {
            Some(slot) if matches!(slot, Entry::Single(_)) => {
                *slot = Entry::Single(b);
                true
            }
            _ => false,
        }
    }

    pub fn tags(&self) -> impl Iterator<Item = &FourCC> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FourCC, &Entry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
