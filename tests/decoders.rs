mod common;

use common::*;
use mp4tree::fields::{CttsEntry, ElstEntry, StscEntry, SttsEntry};
use mp4tree::{BoxFields, FourCC, ParseError};

fn fields_of(data: Vec<u8>, tag: &[u8; 4]) -> BoxFields {
    let tree = parse_bytes(data).expect("parse failed");
    at(&tree, &[tag]).fields.clone().expect("no fields decoded")
}

#[test]
fn mvhd_duration_is_seconds_rounded_to_centiseconds() {
    match fields_of(mvhd_v0(1000, 12345, 4), b"mvhd") {
        BoxFields::MovieHeader(m) => {
            assert_eq!(m.full.version, 0);
            assert_eq!(m.timescale, 1000);
            assert_eq!(m.duration, 12.35);
            assert_eq!(m.next_track_id, 4);
        }
        other => panic!("expected mvhd fields, got {other:?}"),
    }
}

#[test]
fn mvhd_version_one_uses_wide_fields() {
    let mut p = Vec::new();
    p.extend_from_slice(&3_000_000_000u64.to_be_bytes()); // creation
    p.extend_from_slice(&3_000_000_001u64.to_be_bytes()); // modification
    p.extend_from_slice(&90_000u32.to_be_bytes());
    p.extend_from_slice(&(90_000u64 * 7_200).to_be_bytes());
    p.extend_from_slice(&[0u8; 76]);
    p.extend_from_slice(&9u32.to_be_bytes());

    match fields_of(full_bx(b"mvhd", 1, 0, &p), b"mvhd") {
        BoxFields::MovieHeader(m) => {
            assert_eq!(m.full.version, 1);
            assert_eq!(m.creation_time, 3_000_000_000);
            assert_eq!(m.modification_time, 3_000_000_001);
            assert_eq!(m.duration, 7200.0);
            assert_eq!(m.next_track_id, 9);
        }
        other => panic!("expected mvhd fields, got {other:?}"),
    }
}

#[test]
fn mvhd_zero_timescale_reports_zero_duration() {
    match fields_of(mvhd_v0(0, 500, 1), b"mvhd") {
        BoxFields::MovieHeader(m) => assert_eq!(m.duration, 0.0),
        other => panic!("expected mvhd fields, got {other:?}"),
    }
}

#[test]
fn tkhd_fields() {
    match fields_of(tkhd_v0(2, 4000, 1920, 1080), b"tkhd") {
        BoxFields::TrackHeader(t) => {
            assert_eq!(t.full.flags, 3);
            assert_eq!(t.track_id, 2);
            assert_eq!(t.duration, 4000);
            assert_eq!(t.width, 1920);
            assert_eq!(t.height, 1080);
        }
        other => panic!("expected tkhd fields, got {other:?}"),
    }
}

#[test]
fn mdhd_version_zero() {
    let mut p = u32s(&[100, 200, 48_000, 96_000]);
    p.extend_from_slice(&0x15C7u16.to_be_bytes()); // "eng"
    p.extend_from_slice(&[0, 0]);

    match fields_of(full_bx(b"mdhd", 0, 0, &p), b"mdhd") {
        BoxFields::MediaHeader(m) => {
            assert_eq!(m.timestamp, 100);
            assert_eq!(m.timescale, 48_000);
            assert_eq!(m.duration, 96_000);
            assert_eq!(m.language, "eng");
        }
        other => panic!("expected mdhd fields, got {other:?}"),
    }
}

#[test]
fn mdhd_version_one_stays_aligned() {
    let mut p = Vec::new();
    p.extend_from_slice(&1u64.to_be_bytes());
    p.extend_from_slice(&2u64.to_be_bytes());
    p.extend_from_slice(&44_100u32.to_be_bytes());
    p.extend_from_slice(&(44_100u64 * 60).to_be_bytes());
    p.extend_from_slice(&0x55C4u16.to_be_bytes()); // "und"
    p.extend_from_slice(&[0, 0]);

    match fields_of(full_bx(b"mdhd", 1, 0, &p), b"mdhd") {
        BoxFields::MediaHeader(m) => {
            assert_eq!(m.timestamp, 1);
            assert_eq!(m.timescale, 44_100);
            assert_eq!(m.duration, 2_646_000);
            assert_eq!(m.language, "und");
        }
        other => panic!("expected mdhd fields, got {other:?}"),
    }
}

#[test]
fn hdlr_name_stops_at_nul() {
    match fields_of(hdlr(b"vide", b"VideoHandler\0junk"), b"hdlr") {
        BoxFields::HandlerReference(h) => {
            assert_eq!(h.handler_type, "vide");
            assert_eq!(h.name, "VideoHandler");
        }
        other => panic!("expected hdlr fields, got {other:?}"),
    }
}

#[test]
fn hdlr_name_without_nul_takes_remainder() {
    match fields_of(hdlr(b"soun", b"Sound"), b"hdlr") {
        BoxFields::HandlerReference(h) => assert_eq!(h.name, "Sound"),
        other => panic!("expected hdlr fields, got {other:?}"),
    }
}

#[test]
fn elst_entries() {
    let mut p = 2u32.to_be_bytes().to_vec();
    p.extend_from_slice(&1000u32.to_be_bytes());
    p.extend_from_slice(&(-1i32).to_be_bytes());
    p.extend_from_slice(&[0, 1, 0, 0]);
    p.extend_from_slice(&5000u32.to_be_bytes());
    p.extend_from_slice(&512i32.to_be_bytes());
    p.extend_from_slice(&[0, 1, 0, 0]);

    let tree = parse_bytes(container(b"edts", &[full_bx(b"elst", 0, 0, &p)])).unwrap();
    match &at(&tree, &[b"edts", b"elst"]).fields {
        Some(BoxFields::EditList(e)) => {
            assert_eq!(e.entry_count, 2);
            assert_eq!(
                e.entries,
                vec![
                    ElstEntry {
                        segment_duration: 1000,
                        media_time: -1,
                        media_rate_integer: 1,
                        media_rate_fraction: 0,
                    },
                    ElstEntry {
                        segment_duration: 5000,
                        media_time: 512,
                        media_rate_integer: 1,
                        media_rate_fraction: 0,
                    },
                ]
            );
        }
        other => panic!("expected elst fields, got {other:?}"),
    }
}

#[test]
fn media_headers() {
    let mut v = 0u16.to_be_bytes().to_vec();
    v.extend_from_slice(&[0, 1, 0, 2, 0, 3]);
    match fields_of(full_bx(b"vmhd", 0, 1, &v), b"vmhd") {
        BoxFields::VideoMediaHeader(m) => {
            assert_eq!(m.full.flags, 1);
            assert_eq!(m.graphicsmode, 0);
            assert_eq!(m.opcolor, [1, 2, 3]);
        }
        other => panic!("expected vmhd fields, got {other:?}"),
    }

    match fields_of(full_bx(b"smhd", 0, 0, &[0xFF, 0x00, 0, 0]), b"smhd") {
        BoxFields::SoundMediaHeader(m) => assert_eq!(m.balance, -256),
        other => panic!("expected smhd fields, got {other:?}"),
    }
}

#[test]
fn dref_entries() {
    let mut p = 1u32.to_be_bytes().to_vec();
    p.extend_from_slice(&full_bx(b"url ", 0, 1, &[]));
    let tree = parse_bytes(container(b"dinf", &[full_bx(b"dref", 0, 0, &p)])).unwrap();

    match &at(&tree, &[b"dinf", b"dref"]).fields {
        Some(BoxFields::DataReference(d)) => {
            assert_eq!(d.entry_count, 1);
            assert_eq!(d.entries.len(), 1);
            assert_eq!(d.entries[0].typ, FourCC(*b"url "));
            assert_eq!(d.entries[0].size, 12);
            assert_eq!(d.entries[0].full.flags, 1);
        }
        other => panic!("expected dref fields, got {other:?}"),
    }
}

#[test]
fn time_to_sample_tables() {
    match fields_of(full_bx(b"stts", 0, 0, &u32s(&[2, 100, 1024, 1, 512])), b"stts") {
        BoxFields::TimeToSample(t) => assert_eq!(
            t.entries,
            vec![
                SttsEntry { sample_count: 100, sample_delta: 1024 },
                SttsEntry { sample_count: 1, sample_delta: 512 },
            ]
        ),
        other => panic!("expected stts fields, got {other:?}"),
    }

    let ctts = u32s(&[2, 5, 256, 2, 0xFFFF_FF00]);
    match fields_of(full_bx(b"ctts", 1, 0, &ctts), b"ctts") {
        BoxFields::CompositionOffset(c) => assert_eq!(
            c.entries,
            vec![
                CttsEntry { sample_count: 5, sample_offset: 256 },
                CttsEntry { sample_count: 2, sample_offset: -256 },
            ]
        ),
        other => panic!("expected ctts fields, got {other:?}"),
    }
    match fields_of(full_bx(b"ctts", 0, 0, &ctts), b"ctts") {
        BoxFields::CompositionOffset(c) => assert_eq!(c.entries[1].sample_offset, 0xFFFF_FF00),
        other => panic!("expected ctts fields, got {other:?}"),
    }
}

#[test]
fn chunk_tables() {
    match fields_of(full_bx(b"stsc", 0, 0, &u32s(&[2, 1, 5, 1, 10, 3, 1])), b"stsc") {
        BoxFields::SampleToChunk(s) => {
            assert_eq!(s.entry_count, 2);
            assert_eq!(
                s.entries[1],
                StscEntry { first_chunk: 10, samples_per_chunk: 3, sample_description_index: 1 }
            );
        }
        other => panic!("expected stsc fields, got {other:?}"),
    }

    match fields_of(full_bx(b"stco", 0, 0, &u32s(&[3, 10_000, 20_000, 30_000])), b"stco") {
        BoxFields::ChunkOffset(c) => assert_eq!(c.entries, vec![10_000, 20_000, 30_000]),
        other => panic!("expected stco fields, got {other:?}"),
    }

    let mut p = 2u32.to_be_bytes().to_vec();
    p.extend_from_slice(&10_000u64.to_be_bytes());
    p.extend_from_slice(&6_000_000_000u64.to_be_bytes());
    match fields_of(full_bx(b"co64", 0, 0, &p), b"co64") {
        BoxFields::ChunkOffset(c) => assert_eq!(c.entries, vec![10_000, 6_000_000_000]),
        other => panic!("expected co64 fields, got {other:?}"),
    }

    match fields_of(full_bx(b"stss", 0, 0, &u32s(&[4, 1, 15, 30, 45])), b"stss") {
        BoxFields::SyncSample(s) => assert_eq!(s.entries, vec![1, 15, 30, 45]),
        other => panic!("expected stss fields, got {other:?}"),
    }
}

#[test]
fn cprt_is_version_and_flags_only() {
    let tree = parse_bytes(full_bx(b"cprt", 0, 0, &[0x15, 0xC7, b'(', b'c', 0])).unwrap();
    assert!(matches!(&at(&tree, &[b"cprt"]).fields, Some(BoxFields::FullBox(f)) if f.version == 0));
}

#[test]
fn free_and_skip_have_no_fields() {
    let data = [bx(b"free", &[0u8; 4]), bx(b"skip", &[0u8; 4])].concat();
    let tree = parse_bytes(data).unwrap();

    assert!(at(&tree, &[b"free"]).fields.is_none());
    assert_eq!(at(&tree, &[b"skip"]).size, 12);
}

#[test]
fn entry_table_past_box_end_fails() {
    // stts claims 3 entries but carries one
    let err = parse_bytes(full_bx(b"stts", 0, 0, &u32s(&[3, 1, 1]))).expect_err("should fail");
    assert!(matches!(err, ParseError::Io(_)));
}
