#![allow(dead_code)]

use mp4tree::{BoxTree, FourCC, Mp4Box, ParseError};
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::PathBuf;

/// A plain box: 32-bit size, type, payload.
pub fn bx(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&((8 + payload.len()) as u32).to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(payload);
    v
}

/// A box using the 64-bit size extension (size field = 1).
pub fn large_bx(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&1u32.to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(&((16 + payload.len()) as u64).to_be_bytes());
    v.extend_from_slice(payload);
    v
}

/// A box whose payload starts with version + 24-bit flags.
pub fn full_bx(typ: &[u8; 4], version: u8, flags: u32, payload: &[u8]) -> Vec<u8> {
    let mut p = vec![version];
    p.extend_from_slice(&flags.to_be_bytes()[1..]);
    p.extend_from_slice(payload);
    bx(typ, &p)
}

pub fn container(typ: &[u8; 4], children: &[Vec<u8>]) -> Vec<u8> {
    bx(typ, &children.concat())
}

pub fn u32s(vals: &[u32]) -> Vec<u8> {
    vals.iter().flat_map(|v| v.to_be_bytes()).collect()
}

pub fn ftyp(major: &[u8; 4], minor: u32, brands: &[&[u8; 4]]) -> Vec<u8> {
    let mut p = major.to_vec();
    p.extend_from_slice(&minor.to_be_bytes());
    for b in brands {
        p.extend_from_slice(*b);
    }
    bx(b"ftyp", &p)
}

pub fn mvhd_v0(timescale: u32, duration: u32, next_track_id: u32) -> Vec<u8> {
    let mut p = u32s(&[0, 0, timescale, duration]);
    p.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // rate
    p.extend_from_slice(&0x0100u16.to_be_bytes()); // volume
    p.extend_from_slice(&[0u8; 10]); // reserved
    p.extend_from_slice(&[0u8; 36]); // matrix
    p.extend_from_slice(&[0u8; 24]); // pre_defined
    p.extend_from_slice(&next_track_id.to_be_bytes());
    full_bx(b"mvhd", 0, 0, &p)
}

pub fn tkhd_v0(track_id: u32, duration: u32, width: u16, height: u16) -> Vec<u8> {
    let mut p = u32s(&[0, 0, track_id, 0, duration]);
    p.extend_from_slice(&[0u8; 8]); // reserved
    p.extend_from_slice(&0u16.to_be_bytes()); // layer
    p.extend_from_slice(&0u16.to_be_bytes()); // alternate_group
    p.extend_from_slice(&0u16.to_be_bytes()); // volume
    p.extend_from_slice(&[0u8; 2]); // reserved
    p.extend_from_slice(&[0u8; 36]); // matrix
    p.extend_from_slice(&((width as u32) << 16).to_be_bytes());
    p.extend_from_slice(&((height as u32) << 16).to_be_bytes());
    full_bx(b"tkhd", 0, 3, &p)
}

pub fn hdlr(handler: &[u8; 4], name: &[u8]) -> Vec<u8> {
    let mut p = vec![0u8; 4];
    p.extend_from_slice(handler);
    p.extend_from_slice(&[0u8; 12]);
    p.extend_from_slice(name);
    full_bx(b"hdlr", 0, 0, &p)
}

pub fn stsz(sample_size: u32, sample_count: u32, sizes: &[u32]) -> Vec<u8> {
    let mut p = u32s(&[sample_size, sample_count]);
    p.extend_from_slice(&u32s(sizes));
    full_bx(b"stsz", 0, 0, &p)
}

pub fn sdtp(records: &[u8]) -> Vec<u8> {
    full_bx(b"sdtp", 0, 0, records)
}

/// An iTunes item (`©nam`, ...) wrapping a UTF-8 `data` box.
pub fn itunes_text(typ: &[u8; 4], text: &str) -> Vec<u8> {
    let mut data = u32s(&[1, 0]); // type indicator: UTF-8, locale
    data.extend_from_slice(text.as_bytes());
    bx(typ, &bx(b"data", &data))
}

pub fn parse_bytes(data: Vec<u8>) -> Result<BoxTree, ParseError> {
    mp4tree::parse_reader(Cursor::new(data))
}

pub fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    let mut f = File::create(&path).expect("create temp file failed");
    f.write_all(bytes).expect("write temp data failed");
    path
}

/// Follow a chain of single-box tags from the root.
pub fn at<'a>(tree: &'a BoxTree, path: &[&[u8; 4]]) -> &'a Mp4Box {
    let (first, rest) = path.split_first().expect("empty path");
    let mut b = tree
        .single(&FourCC(**first))
        .unwrap_or_else(|| panic!("no {:?} at root", FourCC(**first)));
    for tag in rest {
        b = b
            .children
            .single(&FourCC(**tag))
            .unwrap_or_else(|| panic!("no {:?} under {:?}", FourCC(**tag), b.typ));
    }
    b
}
