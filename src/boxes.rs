use crate::codec::read_fixed_text;
use crate::fields::BoxFields;
use crate::tree::BoxTree;
use serde::{Serialize, Serializer};
use std::fmt;

/// Four-byte box type tag, kept as raw bytes.
///
/// Tags are compared byte-for-byte, so non-ASCII tags such as the iTunes
/// `©nam` family (`0xA9` prefix) need no special handling.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// Latin-1 rendering, one char per byte (`0xA9` becomes `©`).
    pub fn as_text(&self) -> String {
        read_fixed_text(&self.0)
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

impl Serialize for FourCC {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_text())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxHeader {
    pub start: u64,       // file offset of header start
    pub size: u64,        // total size including header
    pub typ: FourCC,
    pub header_size: u64, // 8, or 16 with a 64-bit size
}

impl BoxHeader {
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.size)
    }

    pub fn payload_offset(&self) -> u64 {
        self.start + self.header_size
    }

    pub fn payload_len(&self) -> u64 {
        self.size.saturating_sub(self.header_size)
    }
}

/// One parsed box: its header, the fields its decoder extracted, and any
/// boxes nested inside it.
///
/// Serializes as `{ "size", "type", <fields...>, <children by tag...> }`.
#[derive(Debug, Clone, Serialize)]
pub struct Mp4Box {
    #[serde(skip)]
    pub header: BoxHeader,
    pub size: u64,
    #[serde(rename = "type")]
    pub typ: FourCC,
    #[serde(flatten)]
    pub fields: Option<BoxFields>,
    #[serde(flatten)]
    pub children: BoxTree,
}

impl Mp4Box {
    /// A bare `{size, type}` placeholder.
    pub fn new(header: BoxHeader) -> Self {
        Self {
            size: header.size,
            typ: header.typ,
            header,
            fields: None,
            children: BoxTree::new(),
        }
    }

    pub fn with_fields(mut self, fields: BoxFields) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn with_children(mut self, children: BoxTree) -> Self {
        self.children = children;
        self
    }

    /// Sample count of a fixed (`stsz`) or compact (`stz2`) sample size box.
    pub fn sample_count(&self) -> Option<u32> {
        match &self.fields {
            Some(BoxFields::SampleSize(d)) => Some(d.sample_count),
            Some(BoxFields::CompactSampleSize(d)) => Some(d.sample_count),
            _ => None,
        }
    }
}
