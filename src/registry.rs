use crate::boxes::{BoxHeader, FourCC, Mp4Box};
use crate::decoders::*;
use crate::parser::Result;
use crate::util::ByteSource;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Trait for box field decoders.
///
/// A decoder receives the box header and the byte source, reads the fields it
/// knows about from within `[hdr.start, hdr.end())` and returns the built box.
pub trait BoxDecoder: Send + Sync {
    fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Mp4Box>;
}

/// Registry of leaf decoders keyed by raw type tag.
///
/// The registry is immutable once constructed; use [`Registry::with_decoder`]
/// to build it fluently.
pub struct Registry {
    map: HashMap<FourCC, BoxDecoderEntry>,
}

struct BoxDecoderEntry {
    inner: Box<dyn BoxDecoder>,
    name: String,
}

/// iTunes free-text items, tagged `©xxx` (first byte 0xA9).
pub const ITUNES_TEXT_BOXES: [FourCC; 10] = [
    FourCC(*b"\xa9nam"),
    FourCC(*b"\xa9too"),
    FourCC(*b"\xa9ART"),
    FourCC(*b"\xa9alb"),
    FourCC(*b"\xa9day"),
    FourCC(*b"\xa9cmt"),
    FourCC(*b"\xa9gen"),
    FourCC(*b"\xa9wrt"),
    FourCC(*b"\xa9grp"),
    FourCC(*b"\xa9lyr"),
];

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Return a new registry with the given decoder added, replacing any
    /// decoder already registered for `typ`.
    ///
    /// `name` is human-readable and used only for logging.
    pub fn with_decoder(mut self, typ: FourCC, name: &str, dec: Box<dyn BoxDecoder>) -> Self {
        self.map.insert(
            typ,
            BoxDecoderEntry {
                inner: dec,
                name: name.to_string(),
            },
        );
        self
    }

    /// Try to decode a box using a registered decoder.
    ///
    /// Returns `None` if no decoder exists for the box's type.
    pub fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Option<Result<Mp4Box>> {
        let entry = self.map.get(&hdr.typ)?;
        tracing::trace!(typ = %hdr.typ, decoder = %entry.name, "decode");
        Some(entry.inner.decode(src, hdr))
    }

    pub fn contains(&self, typ: &FourCC) -> bool {
        self.map.contains_key(typ)
    }

    /// Every decoder this crate ships.
    pub fn standard() -> Self {
        let reg = Registry::new()
            .with_decoder(FourCC(*b"ftyp"), "ftyp", Box::new(FtypDecoder))
            .with_decoder(FourCC(*b"mvhd"), "mvhd", Box::new(MvhdDecoder))
            .with_decoder(FourCC(*b"tkhd"), "tkhd", Box::new(TkhdDecoder))
            .with_decoder(FourCC(*b"mdhd"), "mdhd", Box::new(MdhdDecoder))
            .with_decoder(FourCC(*b"hdlr"), "hdlr", Box::new(HdlrDecoder))
            .with_decoder(FourCC(*b"elst"), "elst", Box::new(ElstDecoder))
            .with_decoder(FourCC(*b"free"), "free", Box::new(FreeDecoder))
            .with_decoder(FourCC(*b"skip"), "skip", Box::new(FreeDecoder))
            .with_decoder(FourCC(*b"vmhd"), "vmhd", Box::new(VmhdDecoder))
            .with_decoder(FourCC(*b"smhd"), "smhd", Box::new(SmhdDecoder))
            .with_decoder(FourCC(*b"dref"), "dref", Box::new(DrefDecoder))
            .with_decoder(FourCC(*b"stsd"), "stsd", Box::new(StsdDecoder))
            .with_decoder(FourCC(*b"stts"), "stts", Box::new(SttsDecoder))
            .with_decoder(FourCC(*b"ctts"), "ctts", Box::new(CttsDecoder))
            .with_decoder(FourCC(*b"stsc"), "stsc", Box::new(StscDecoder))
            .with_decoder(FourCC(*b"stss"), "stss", Box::new(StssDecoder))
            .with_decoder(FourCC(*b"stsz"), "stsz", Box::new(StszDecoder))
            .with_decoder(FourCC(*b"stz2"), "stz2", Box::new(Stz2Decoder))
            .with_decoder(FourCC(*b"stco"), "stco", Box::new(ChunkOffsetDecoder { wide: false }))
            .with_decoder(FourCC(*b"co64"), "co64", Box::new(ChunkOffsetDecoder { wide: true }))
            .with_decoder(FourCC(*b"sdtp"), "sdtp", Box::new(SdtpDecoder))
            .with_decoder(FourCC(*b"meta"), "meta", Box::new(FullBoxDecoder))
            .with_decoder(FourCC(*b"cprt"), "cprt", Box::new(FullBoxDecoder));

        ITUNES_TEXT_BOXES.iter().fold(reg, |reg, &typ| {
            reg.with_decoder(typ, &typ.as_text(), Box::new(ItunesTextDecoder))
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// The standard registry, built once per process.
pub fn default_registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::standard)
}
