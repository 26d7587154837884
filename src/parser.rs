use crate::boxes::{BoxHeader, FourCC, Mp4Box};
use crate::codec::{read_uint, read_uuid};
use crate::decoders::decode_sample_dependencies;
use crate::known_boxes::BoxPolicy;
use crate::registry::Registry;
use crate::tree::BoxTree;
use crate::util::ByteSource;
use tracing::{debug, warn};

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("SizeError: {{ size: {size}, type: {typ} }}")]
    InvalidSize { size: u64, typ: FourCC },
}

pub type Result<T> = std::result::Result<T, ParseError>;

const FULL_BOX_PREAMBLE: u64 = 4;
const UUID_LEN: u64 = 16;

/// Read the header of the box starting at `offset`.
///
/// Declared sizes 0 and 2..=7 cannot hold a header and are rejected.
pub fn read_box_header(src: &mut dyn ByteSource, offset: u64) -> Result<BoxHeader> {
    let buf = src.read_at(offset, 8)?;
    let size32 = read_uint(&buf[0..4]);
    let typ = FourCC([buf[4], buf[5], buf[6], buf[7]]);

    let (size, header_size) = match size32 {
        1 => {
            let size = read_uint(&src.read_at(offset + 8, 8)?);
            if size < 16 {
                return Err(ParseError::InvalidSize { size, typ });
            }
            (size, 16)
        }
        0 | 2..=7 => return Err(ParseError::InvalidSize { size: size32, typ }),
        _ => (size32, 8),
    };

    Ok(BoxHeader { start: offset, size, typ, header_size })
}

/// Parse every box in `[offset, end)` into a tree.
///
/// Unknown boxes become `{size, type}` placeholders; the walk always advances
/// by the declared size, so their payload is skipped without being read.
pub fn walk(src: &mut dyn ByteSource, reg: &Registry, mut offset: u64, end: u64) -> Result<BoxTree> {
    let mut tree = BoxTree::new();

    while offset.saturating_add(8) < end {
        let hdr = read_box_header(src, offset)?;
        let policy = BoxPolicy::classify(hdr.typ);
        debug!(offset, size = hdr.size, typ = %hdr.typ, ?policy, "box");
        if hdr.end() > end {
            warn!("{} at {} runs {} bytes past its parent", hdr.typ, offset, hdr.end() - end);
        }

        match policy {
            BoxPolicy::Container => {
                let children = walk(src, reg, hdr.payload_offset(), hdr.end())?;
                tree.insert(Mp4Box::new(hdr.clone()).with_children(children));
            }
            BoxPolicy::RepeatedSibling => {
                let children = walk(src, reg, hdr.payload_offset(), hdr.end())?;
                tree.push(Mp4Box::new(hdr.clone()).with_children(children));
            }
            BoxPolicy::SampleTable => {
                let children = walk(src, reg, hdr.payload_offset(), hdr.end())?;
                let children = resolve_sample_dependencies(src, children)?;
                tree.insert(Mp4Box::new(hdr.clone()).with_children(children));
            }
            BoxPolicy::PrefixedContainer => {
                let own = decode_leaf(src, reg, &hdr)?;
                let children = walk(src, reg, hdr.payload_offset() + FULL_BOX_PREAMBLE, hdr.end())?;
                tree.insert(own.with_children(children));
            }
            BoxPolicy::KeyedVariant => {
                let mut raw = [0u8; 16];
                raw.copy_from_slice(&src.read_at(hdr.payload_offset(), UUID_LEN)?);
                let uuid = read_uuid(&raw);
                let children = walk(src, reg, hdr.payload_offset() + UUID_LEN, hdr.end())?;
                tree.insert_keyed(uuid, Mp4Box::new(hdr.clone()).with_children(children));
            }
            BoxPolicy::Leaf => {
                tree.insert(decode_leaf(src, reg, &hdr)?);
            }
        }

        offset = hdr.end();
    }

    Ok(tree)
}

fn decode_leaf(src: &mut dyn ByteSource, reg: &Registry, hdr: &BoxHeader) -> Result<Mp4Box> {
    reg.decode(src, hdr)
        .unwrap_or_else(|| Ok(Mp4Box::new(hdr.clone())))
}

/// `sdtp` carries one byte per sample but no count of its own; take the count
/// from the sibling `stsz` (or `stz2`) and decode the records.
fn resolve_sample_dependencies(src: &mut dyn ByteSource, mut children: BoxTree) -> Result<BoxTree> {
    let sdtp = match children.single(&FourCC(*b"sdtp")) {
        Some(b) => b.header.clone(),
        None => return Ok(children),
    };
    let sample_count = children
        .single(&FourCC(*b"stsz"))
        .or_else(|| children.single(&FourCC(*b"stz2")))
        .and_then(Mp4Box::sample_count);

    if let Some(count) = sample_count {
        debug!(count, "decoding sdtp records");
        let fields = decode_sample_dependencies(src, &sdtp, Some(count))?;
        children.replace(Mp4Box::new(sdtp).with_fields(fields));
    }
    Ok(children)
}
