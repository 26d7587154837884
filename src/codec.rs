//! Primitive decoders for the raw byte ranges found inside boxes.

/// Big-endian unsigned integer of any width up to 8 bytes.
///
/// Wider inputs keep only their low 64 bits.
pub fn read_uint(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

/// One character per byte (Latin-1). Never fails.
pub fn read_fixed_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// UTF-8 text as stored by iTunes-style metadata items.
pub fn read_utf8_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Canonical lower-case `8-4-4-4-12` form.
pub fn read_uuid(bytes: &[u8; 16]) -> String {
    format!(
        "{}-{}-{}-{}-{}",
        hex::encode(&bytes[0..4]),
        hex::encode(&bytes[4..6]),
        hex::encode(&bytes[6..8]),
        hex::encode(&bytes[8..10]),
        hex::encode(&bytes[10..16]),
    )
}

/// Packed ISO-639-2/T language code (three 5-bit letters offset from 0x60).
pub fn read_language(code: u16) -> String {
    if code == 0 {
        return "und".to_string();
    }
    [(code >> 10) & 0x1F, (code >> 5) & 0x1F, code & 0x1F]
        .iter()
        .map(|&c| (c as u8 + 0x60) as char)
        .collect()
}
