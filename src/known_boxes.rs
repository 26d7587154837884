use crate::boxes::FourCC;

/// Plain containers: the payload is nothing but child boxes.
pub const CONTAINER_BOXES: [FourCC; 7] = [
    FourCC(*b"moov"), // movie
    FourCC(*b"edts"), // edit list container
    FourCC(*b"mdia"), // media
    FourCC(*b"minf"), // media information
    FourCC(*b"dinf"), // data information
    FourCC(*b"udta"), // user data
    FourCC(*b"ilst"), // iTunes item list
];

/// Containers that may appear several times under one parent.
pub const REPEATED_BOXES: [FourCC; 1] = [FourCC(*b"trak")];

/// Sample table: a container whose `sdtp` child depends on a sibling.
pub const SAMPLE_TABLE_BOX: FourCC = FourCC(*b"stbl");

/// Metadata: a FullBox whose children start after version and flags.
pub const PREFIXED_CONTAINER_BOX: FourCC = FourCC(*b"meta");

/// Extended type: disambiguated by the 16-byte UUID after the header.
pub const KEYED_VARIANT_BOX: FourCC = FourCC(*b"uuid");

/// How the walker treats a box, decided by its type tag alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxPolicy {
    Container,
    RepeatedSibling,
    SampleTable,
    PrefixedContainer,
    KeyedVariant,
    Leaf,
}

impl BoxPolicy {
    /// First match wins, in the order the variants are declared.
    pub fn classify(typ: FourCC) -> Self {
        if CONTAINER_BOXES.contains(&typ) {
            BoxPolicy::Container
        } else if REPEATED_BOXES.contains(&typ) {
            BoxPolicy::RepeatedSibling
        } else if typ == SAMPLE_TABLE_BOX {
            BoxPolicy::SampleTable
        } else if typ == PREFIXED_CONTAINER_BOX {
            BoxPolicy::PrefixedContainer
        } else if typ == KEYED_VARIANT_BOX {
            BoxPolicy::KeyedVariant
        } else {
            BoxPolicy::Leaf
        }
    }

    /// Does this box *contain* child boxes?
    pub fn has_children(&self) -> bool {
        !matches!(self, BoxPolicy::Leaf)
    }
}

impl From<FourCC> for BoxPolicy {
    fn from(cc: FourCC) -> Self {
        BoxPolicy::classify(cc)
    }
}
