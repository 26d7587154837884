use crate::boxes::{BoxHeader, Mp4Box};
use crate::codec::{read_fixed_text, read_language, read_uint, read_utf8_text};
use crate::fields::*;
use crate::parser::{Result, read_box_header};
use crate::registry::BoxDecoder;
use crate::tree::BoxTree;
use crate::util::ByteSource;
use byteorder::{BigEndian, ReadBytesExt};
use std::io::{Cursor, Read};

// ---------- Helpers ----------

/// The whole payload of `hdr`, so nothing past the box end can be read.
fn payload(src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Cursor<Vec<u8>>> {
    Ok(Cursor::new(src.read_at(hdr.payload_offset(), hdr.payload_len())?))
}

fn read_full_box<R: Read>(r: &mut R) -> std::io::Result<FullBoxHeader> {
    let version = r.read_u8()?;
    let mut f = [0u8; 3];
    r.read_exact(&mut f)?;
    Ok(FullBoxHeader {
        version,
        flags: read_uint(&f) as u32,
    })
}

fn skip(cur: &mut Cursor<Vec<u8>>, n: u64) {
    cur.set_position(cur.position() + n);
}

fn rest(cur: &Cursor<Vec<u8>>) -> &[u8] {
    let buf = cur.get_ref();
    let pos = (cur.position() as usize).min(buf.len());
    &buf[pos..]
}

/// 32-bit for version 0, 64-bit otherwise.
fn read_versioned(cur: &mut Cursor<Vec<u8>>, version: u8) -> std::io::Result<u64> {
    if version == 1 {
        cur.read_u64::<BigEndian>()
    } else {
        cur.read_u32::<BigEndian>().map(u64::from)
    }
}

/// Headers of up to `count` boxes packed back to back from `pos` to the end
/// of `hdr`. Used for tables whose entries are themselves boxes.
fn read_entry_headers(
    src: &mut dyn ByteSource,
    hdr: &BoxHeader,
    mut pos: u64,
    count: u32,
) -> Result<Vec<BoxHeader>> {
    let mut entries = Vec::new();
    for i in 0..count {
        if pos.saturating_add(8) > hdr.end() {
            tracing::warn!("{} declares {} entries but holds only {}", hdr.typ, count, i);
            break;
        }
        let entry = read_box_header(src, pos)?;
        pos = entry.end();
        entries.push(entry);
    }
    Ok(entries)
}

// ---------- Decoders ----------

// ftyp: major + minor + compatible brands
pub struct FtypDecoder;

impl BoxDecoder for FtypDecoder {
    fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Mp4Box> {
        let mut cur = payload(src, hdr)?;

        let mut major = [0u8; 4];
        cur.read_exact(&mut major)?;
        let minor_version = cur.read_u32::<BigEndian>()?;
        let compatible_brands = rest(&cur).chunks_exact(4).map(read_fixed_text).collect();

        Ok(Mp4Box::new(hdr.clone()).with_fields(BoxFields::FileType(FtypData {
            major_brand: read_fixed_text(&major),
            minor_version,
            compatible_brands,
        })))
    }
}

// mvhd: times, timescale, duration in seconds, next track id
pub struct MvhdDecoder;

impl BoxDecoder for MvhdDecoder {
    fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Mp4Box> {
        let mut cur = payload(src, hdr)?;
        let full = read_full_box(&mut cur)?;

        let creation_time = read_versioned(&mut cur, full.version)?;
        let modification_time = read_versioned(&mut cur, full.version)?;
        let timescale = cur.read_u32::<BigEndian>()?;
        let duration = read_versioned(&mut cur, full.version)?;

        // rate(4) volume(2) reserved(2+8) matrix(36) pre_defined(24)
        skip(&mut cur, 4 + 2 + 10 + 36 + 24);
        let next_track_id = cur.read_u32::<BigEndian>()?;

        let duration = if timescale == 0 {
            0.0
        } else {
            (duration as f64 * 100.0 / timescale as f64).round() / 100.0
        };

        Ok(Mp4Box::new(hdr.clone()).with_fields(BoxFields::MovieHeader(MvhdData {
            full,
            creation_time,
            modification_time,
            timescale,
            duration,
            next_track_id,
        })))
    }
}

// tkhd: track id, duration, layer, volume, width, height
pub struct TkhdDecoder;

impl BoxDecoder for TkhdDecoder {
    fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Mp4Box> {
        let mut cur = payload(src, hdr)?;
        let full = read_full_box(&mut cur)?;

        let creation_time = read_versioned(&mut cur, full.version)?;
        let modification_time = read_versioned(&mut cur, full.version)?;
        let track_id = cur.read_u32::<BigEndian>()?;
        skip(&mut cur, 4); // reserved
        let duration = read_versioned(&mut cur, full.version)?;

        skip(&mut cur, 8); // reserved[2]
        let layer = cur.read_u16::<BigEndian>()?;
        let alternate_group = cur.read_u16::<BigEndian>()?;
        let volume = cur.read_u16::<BigEndian>()?;
        skip(&mut cur, 2 + 36); // reserved, matrix

        // 16.16 fixed point, integer part only
        let width = (cur.read_u32::<BigEndian>()? >> 16) as u16;
        let height = (cur.read_u32::<BigEndian>()? >> 16) as u16;

        Ok(Mp4Box::new(hdr.clone()).with_fields(BoxFields::TrackHeader(TkhdData {
            full,
            creation_time,
            modification_time,
            track_id,
            duration,
            layer,
            alternate_group,
            volume,
            width,
            height,
        })))
    }
}

// mdhd: creation time, timescale, duration, language
pub struct MdhdDecoder;

impl BoxDecoder for MdhdDecoder {
    fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Mp4Box> {
        let mut cur = payload(src, hdr)?;
        let full = read_full_box(&mut cur)?;

        let timestamp = read_versioned(&mut cur, full.version)?;
        let _modification_time = read_versioned(&mut cur, full.version)?;
        let timescale = cur.read_u32::<BigEndian>()?;
        let duration = read_versioned(&mut cur, full.version)?;
        let language = read_language(cur.read_u16::<BigEndian>()?);

        Ok(Mp4Box::new(hdr.clone()).with_fields(BoxFields::MediaHeader(MdhdData {
            full,
            timestamp,
            timescale,
            duration,
            language,
        })))
    }
}

// hdlr: handler type + name
pub struct HdlrDecoder;

impl BoxDecoder for HdlrDecoder {
    fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Mp4Box> {
        let mut cur = payload(src, hdr)?;
        let full = read_full_box(&mut cur)?;

        skip(&mut cur, 4); // pre_defined
        let mut handler_type = [0u8; 4];
        cur.read_exact(&mut handler_type)?;
        skip(&mut cur, 12); // reserved

        // null-terminated; the whole remainder when no terminator is present
        let name = rest(&cur);
        let name = name.iter().position(|&b| b == 0).map_or(name, |nul| &name[..nul]);

        Ok(Mp4Box::new(hdr.clone()).with_fields(BoxFields::HandlerReference(HdlrData {
            full,
            handler_type: read_fixed_text(&handler_type),
            name: read_fixed_text(name),
        })))
    }
}

// elst: edit list
pub struct ElstDecoder;

impl BoxDecoder for ElstDecoder {
    fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Mp4Box> {
        let mut cur = payload(src, hdr)?;
        let full = read_full_box(&mut cur)?;

        let entry_count = cur.read_u32::<BigEndian>()?;
        let mut entries = Vec::new();
        for _ in 0..entry_count {
            let (segment_duration, media_time) = if full.version == 1 {
                (cur.read_u64::<BigEndian>()?, cur.read_i64::<BigEndian>()?)
            } else {
                (
                    cur.read_u32::<BigEndian>()? as u64,
                    cur.read_i32::<BigEndian>()? as i64,
                )
            };
            entries.push(ElstEntry {
                segment_duration,
                media_time,
                media_rate_integer: cur.read_i16::<BigEndian>()?,
                media_rate_fraction: cur.read_i16::<BigEndian>()?,
            });
        }

        Ok(Mp4Box::new(hdr.clone()).with_fields(BoxFields::EditList(ElstData {
            full,
            entry_count,
            entries,
        })))
    }
}

// free / skip: nothing to decode, but the payload must be there
pub struct FreeDecoder;

impl BoxDecoder for FreeDecoder {
    fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Mp4Box> {
        if hdr.payload_len() > 0 {
            src.read_at(hdr.payload_offset(), 1)?;
        }
        Ok(Mp4Box::new(hdr.clone()))
    }
}

// vmhd: graphics mode + opcolor
pub struct VmhdDecoder;

impl BoxDecoder for VmhdDecoder {
    fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Mp4Box> {
        let mut cur = payload(src, hdr)?;
        let full = read_full_box(&mut cur)?;

        let graphicsmode = cur.read_u16::<BigEndian>()?;
        let mut opcolor = [0u16; 3];
        cur.read_u16_into::<BigEndian>(&mut opcolor)?;

        Ok(Mp4Box::new(hdr.clone()).with_fields(BoxFields::VideoMediaHeader(VmhdData {
            full,
            graphicsmode,
            opcolor,
        })))
    }
}

// smhd: balance
pub struct SmhdDecoder;

impl BoxDecoder for SmhdDecoder {
    fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Mp4Box> {
        let mut cur = payload(src, hdr)?;
        let full = read_full_box(&mut cur)?;
        let balance = cur.read_i16::<BigEndian>()?;

        Ok(Mp4Box::new(hdr.clone())
            .with_fields(BoxFields::SoundMediaHeader(SmhdData { full, balance })))
    }
}

// dref: data entries (url / urn), each a FullBox of its own
pub struct DrefDecoder;

impl BoxDecoder for DrefDecoder {
    fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Mp4Box> {
        let mut cur = Cursor::new(src.read_at(hdr.payload_offset(), 8)?);
        let full = read_full_box(&mut cur)?;
        let entry_count = cur.read_u32::<BigEndian>()?;

        let mut entries = Vec::new();
        for entry in read_entry_headers(src, hdr, hdr.payload_offset() + 8, entry_count)? {
            let mut pre = Cursor::new(src.read_at(entry.payload_offset(), 4)?);
            entries.push(DrefEntry {
                size: entry.size,
                typ: entry.typ,
                full: read_full_box(&mut pre)?,
            });
        }

        Ok(Mp4Box::new(hdr.clone()).with_fields(BoxFields::DataReference(DrefData {
            full,
            entry_count,
            entries,
        })))
    }
}

// stsd: sample entries, header only, keyed by codec tag
pub struct StsdDecoder;

impl BoxDecoder for StsdDecoder {
    fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Mp4Box> {
        let mut cur = Cursor::new(src.read_at(hdr.payload_offset(), 8)?);
        let full = read_full_box(&mut cur)?;
        let entry_count = cur.read_u32::<BigEndian>()?;

        let mut children = BoxTree::new();
        for entry in read_entry_headers(src, hdr, hdr.payload_offset() + 8, entry_count)? {
            children.insert(Mp4Box::new(entry));
        }

        Ok(Mp4Box::new(hdr.clone())
            .with_fields(BoxFields::SampleDescription(EntryCountData { full, entry_count }))
            .with_children(children))
    }
}

// stts: time-to-sample
pub struct SttsDecoder;

impl BoxDecoder for SttsDecoder {
    fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Mp4Box> {
        let mut cur = payload(src, hdr)?;
        let full = read_full_box(&mut cur)?;

        let entry_count = cur.read_u32::<BigEndian>()?;
        let mut entries = Vec::new();
        for _ in 0..entry_count {
            entries.push(SttsEntry {
                sample_count: cur.read_u32::<BigEndian>()?,
                sample_delta: cur.read_u32::<BigEndian>()?,
            });
        }

        Ok(Mp4Box::new(hdr.clone()).with_fields(BoxFields::TimeToSample(SttsData {
            full,
            entry_count,
            entries,
        })))
    }
}

// ctts: composition time to sample
pub struct CttsDecoder;

impl BoxDecoder for CttsDecoder {
    fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Mp4Box> {
        let mut cur = payload(src, hdr)?;
        let full = read_full_box(&mut cur)?;

        let entry_count = cur.read_u32::<BigEndian>()?;
        let mut entries = Vec::new();
        for _ in 0..entry_count {
            let sample_count = cur.read_u32::<BigEndian>()?;
            let sample_offset = if full.version == 0 {
                cur.read_u32::<BigEndian>()? as i64
            } else {
                cur.read_i32::<BigEndian>()? as i64
            };
            entries.push(CttsEntry {
                sample_count,
                sample_offset,
            });
        }

        Ok(Mp4Box::new(hdr.clone()).with_fields(BoxFields::CompositionOffset(CttsData {
            full,
            entry_count,
            entries,
        })))
    }
}

// stsc: sample-to-chunk
pub struct StscDecoder;

impl BoxDecoder for StscDecoder {
    fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Mp4Box> {
        let mut cur = payload(src, hdr)?;
        let full = read_full_box(&mut cur)?;

        let entry_count = cur.read_u32::<BigEndian>()?;
        let mut entries = Vec::new();
        for _ in 0..entry_count {
            entries.push(StscEntry {
                first_chunk: cur.read_u32::<BigEndian>()?,
                samples_per_chunk: cur.read_u32::<BigEndian>()?,
                sample_description_index: cur.read_u32::<BigEndian>()?,
            });
        }

        Ok(Mp4Box::new(hdr.clone()).with_fields(BoxFields::SampleToChunk(StscData {
            full,
            entry_count,
            entries,
        })))
    }
}

// stss: sync sample table
pub struct StssDecoder;

impl BoxDecoder for StssDecoder {
    fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Mp4Box> {
        let mut cur = payload(src, hdr)?;
        let full = read_full_box(&mut cur)?;

        let entry_count = cur.read_u32::<BigEndian>()?;
        let mut entries = Vec::new();
        for _ in 0..entry_count {
            entries.push(cur.read_u32::<BigEndian>()?);
        }

        Ok(Mp4Box::new(hdr.clone()).with_fields(BoxFields::SyncSample(StssData {
            full,
            entry_count,
            entries,
        })))
    }
}

// stsz: sample sizes and their total
pub struct StszDecoder;

impl BoxDecoder for StszDecoder {
    fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Mp4Box> {
        let mut cur = payload(src, hdr)?;
        let full = read_full_box(&mut cur)?;

        let sample_size = cur.read_u32::<BigEndian>()?;
        let sample_count = cur.read_u32::<BigEndian>()?;

        // If sample_size is 0, each sample has its own size
        let mut entry_sizes = Vec::new();
        if sample_size == 0 {
            for _ in 0..sample_count {
                entry_sizes.push(cur.read_u32::<BigEndian>()?);
            }
        }
        let sample_total = if sample_size == 0 {
            entry_sizes.iter().map(|&s| s as u64).sum()
        } else {
            sample_size as u64 * sample_count as u64
        };

        Ok(Mp4Box::new(hdr.clone()).with_fields(BoxFields::SampleSize(StszData {
            full,
            sample_size,
            sample_count,
            sample_total,
            entry_sizes,
        })))
    }
}

// stz2: compact sample sizes (4, 8 or 16 bits each)
pub struct Stz2Decoder;

impl BoxDecoder for Stz2Decoder {
    fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Mp4Box> {
        let mut cur = payload(src, hdr)?;
        let full = read_full_box(&mut cur)?;

        let mut reserved = [0u8; 3];
        cur.read_exact(&mut reserved)?;
        let field_size = cur.read_u8()?;
        let sample_count = cur.read_u32::<BigEndian>()?;

        let mut entry_sizes = Vec::new();
        match field_size {
            4 => {
                // two samples per byte, high nibble first
                let bytes = sample_count.div_ceil(2);
                for _ in 0..bytes {
                    let b = cur.read_u8()?;
                    entry_sizes.push((b >> 4) as u16);
                    entry_sizes.push((b & 0x0F) as u16);
                }
                entry_sizes.truncate(sample_count as usize);
            }
            8 => {
                for _ in 0..sample_count {
                    entry_sizes.push(cur.read_u8()? as u16);
                }
            }
            16 => {
                for _ in 0..sample_count {
                    entry_sizes.push(cur.read_u16::<BigEndian>()?);
                }
            }
            other => tracing::warn!("stz2: unsupported field size {}", other),
        }

        Ok(Mp4Box::new(hdr.clone()).with_fields(BoxFields::CompactSampleSize(Stz2Data {
            full,
            reserved: read_uint(&reserved) as u32,
            field_size,
            sample_count,
            entry_sizes,
        })))
    }
}

// stco / co64: chunk offsets, 32 or 64 bits wide
pub struct ChunkOffsetDecoder {
    pub wide: bool,
}

impl BoxDecoder for ChunkOffsetDecoder {
    fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Mp4Box> {
        let mut cur = payload(src, hdr)?;
        let full = read_full_box(&mut cur)?;

        let entry_count = cur.read_u32::<BigEndian>()?;
        let mut entries = Vec::new();
        for _ in 0..entry_count {
            entries.push(if self.wide {
                cur.read_u64::<BigEndian>()?
            } else {
                cur.read_u32::<BigEndian>()? as u64
            });
        }

        Ok(Mp4Box::new(hdr.clone()).with_fields(BoxFields::ChunkOffset(ChunkOffsetData {
            full,
            entry_count,
            entries,
        })))
    }
}

// sdtp: version/flags alone; records need a sample count from the sample table
pub struct SdtpDecoder;

impl BoxDecoder for SdtpDecoder {
    fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Mp4Box> {
        let fields = decode_sample_dependencies(src, hdr, None)?;
        Ok(Mp4Box::new(hdr.clone()).with_fields(fields))
    }
}

/// Decode `sdtp`, reading one dependency record per sample when
/// `sample_count` is known.
pub fn decode_sample_dependencies(
    src: &mut dyn ByteSource,
    hdr: &BoxHeader,
    sample_count: Option<u32>,
) -> Result<BoxFields> {
    let mut cur = payload(src, hdr)?;
    let full = read_full_box(&mut cur)?;

    let samples = match sample_count {
        Some(count) => {
            let mut records = Vec::new();
            for _ in 0..count {
                records.push(SdtpRecord::from(cur.read_u8()?));
            }
            Some(records)
        }
        None => None,
    };

    Ok(BoxFields::SampleDependency(SdtpData { full, samples }))
}

// meta, cprt: version/flags only
pub struct FullBoxDecoder;

impl BoxDecoder for FullBoxDecoder {
    fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Mp4Box> {
        let mut cur = Cursor::new(src.read_at(hdr.payload_offset(), 4)?);
        let full = read_full_box(&mut cur)?;
        Ok(Mp4Box::new(hdr.clone()).with_fields(BoxFields::FullBox(full)))
    }
}

// ©xxx: UTF-8 text inside a nested `data` box
pub struct ItunesTextDecoder;

impl BoxDecoder for ItunesTextDecoder {
    fn decode(&self, src: &mut dyn ByteSource, hdr: &BoxHeader) -> Result<Mp4Box> {
        let mut cur = payload(src, hdr)?;

        // size(4) "data"(4) type indicator(4) locale indicator(4)
        let data_size = cur.read_u32::<BigEndian>()? as usize;
        skip(&mut cur, 12);

        let text = rest(&cur);
        let text = &text[..data_size.saturating_sub(16).min(text.len())];

        Ok(Mp4Box::new(hdr.clone()).with_fields(BoxFields::Text(TextData {
            data: read_utf8_text(text),
        })))
    }
}
