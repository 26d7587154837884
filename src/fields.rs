use serde::Serialize;

/// Fields decoded from a box payload, one variant per decoder.
///
/// Serialized untagged and flattened into the owning box, so a decoded
/// `mvhd` reads `{ "size", "type", "version", "flag", "creationTime", ... }`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BoxFields {
    /// File Type Box (ftyp)
    FileType(FtypData),
    /// Movie Header Box (mvhd)
    MovieHeader(MvhdData),
    /// Track Header Box (tkhd)
    TrackHeader(TkhdData),
    /// Media Header Box (mdhd)
    MediaHeader(MdhdData),
    /// Handler Reference Box (hdlr)
    HandlerReference(HdlrData),
    /// Edit List Box (elst)
    EditList(ElstData),
    /// Video Media Header Box (vmhd)
    VideoMediaHeader(VmhdData),
    /// Sound Media Header Box (smhd)
    SoundMediaHeader(SmhdData),
    /// Data Reference Box (dref)
    DataReference(DrefData),
    /// Sample Description Box (stsd); entries live in the box's children
    SampleDescription(EntryCountData),
    /// Decoding Time-to-Sample Box (stts)
    TimeToSample(SttsData),
    /// Composition Time-to-Sample Box (ctts)
    CompositionOffset(CttsData),
    /// Sample-to-Chunk Box (stsc)
    SampleToChunk(StscData),
    /// Sync Sample Box (stss)
    SyncSample(StssData),
    /// Sample Size Box (stsz)
    SampleSize(StszData),
    /// Compact Sample Size Box (stz2)
    CompactSampleSize(Stz2Data),
    /// Chunk Offset Box (stco / co64)
    ChunkOffset(ChunkOffsetData),
    /// Sample Dependency Type Box (sdtp)
    SampleDependency(SdtpData),
    /// iTunes free-text item (`©nam`, `©too`, ...)
    Text(TextData),
    /// Version and flags only (meta, cprt)
    FullBox(FullBoxHeader),
}

/// Version and flags leading every FullBox payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FullBoxHeader {
    pub version: u8,
    #[serde(rename = "flag")]
    pub flags: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FtypData {
    pub major_brand: String,
    pub minor_version: u32,
    pub compatible_brands: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MvhdData {
    #[serde(flatten)]
    pub full: FullBoxHeader,
    pub creation_time: u64,
    pub modification_time: u64,
    pub timescale: u32,
    /// Seconds, rounded to two decimals.
    pub duration: f64,
    #[serde(rename = "nextTrackID")]
    pub next_track_id: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TkhdData {
    #[serde(flatten)]
    pub full: FullBoxHeader,
    pub creation_time: u64,
    pub modification_time: u64,
    #[serde(rename = "trackID")]
    pub track_id: u32,
    pub duration: u64,
    pub layer: u16,
    pub alternate_group: u16,
    pub volume: u16,
    /// Integer part of the 16.16 fixed-point width.
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MdhdData {
    #[serde(flatten)]
    pub full: FullBoxHeader,
    /// Creation time.
    pub timestamp: u64,
    pub timescale: u32,
    pub duration: u64,
    pub language: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HdlrData {
    #[serde(flatten)]
    pub full: FullBoxHeader,
    pub handler_type: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElstData {
    #[serde(flatten)]
    pub full: FullBoxHeader,
    pub entry_count: u32,
    pub entries: Vec<ElstEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElstEntry {
    pub segment_duration: u64,
    /// -1 marks an empty edit.
    pub media_time: i64,
    pub media_rate_integer: i16,
    pub media_rate_fraction: i16,
}

#[derive(Debug, Clone, Serialize)]
pub struct VmhdData {
    #[serde(flatten)]
    pub full: FullBoxHeader,
    pub graphicsmode: u16,
    pub opcolor: [u16; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct SmhdData {
    #[serde(flatten)]
    pub full: FullBoxHeader,
    /// 8.8 fixed point.
    pub balance: i16,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrefData {
    #[serde(flatten)]
    pub full: FullBoxHeader,
    pub entry_count: u32,
    pub entries: Vec<DrefEntry>,
}

/// A `url ` / `urn ` data entry. Flag `0x000001` means "media is in this file".
#[derive(Debug, Clone, Serialize)]
pub struct DrefEntry {
    pub size: u64,
    #[serde(rename = "type")]
    pub typ: crate::boxes::FourCC,
    #[serde(flatten)]
    pub full: FullBoxHeader,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryCountData {
    #[serde(flatten)]
    pub full: FullBoxHeader,
    pub entry_count: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SttsData {
    #[serde(flatten)]
    pub full: FullBoxHeader,
    pub entry_count: u32,
    pub entries: Vec<SttsEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SttsEntry {
    pub sample_count: u32,
    pub sample_delta: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CttsData {
    #[serde(flatten)]
    pub full: FullBoxHeader,
    pub entry_count: u32,
    pub entries: Vec<CttsEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CttsEntry {
    pub sample_count: u32,
    pub sample_offset: i64, // signed in version 1
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StscData {
    #[serde(flatten)]
    pub full: FullBoxHeader,
    pub entry_count: u32,
    pub entries: Vec<StscEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StscEntry {
    pub first_chunk: u32,
    pub samples_per_chunk: u32,
    pub sample_description_index: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StssData {
    #[serde(flatten)]
    pub full: FullBoxHeader,
    pub entry_count: u32,
    /// 1-based sample numbers of sync samples.
    pub entries: Vec<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StszData {
    #[serde(flatten)]
    pub full: FullBoxHeader,
    pub sample_size: u32,
    pub sample_count: u32,
    pub sample_total: u64,
    /// Empty when every sample shares `sample_size`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entry_sizes: Vec<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stz2Data {
    #[serde(flatten)]
    pub full: FullBoxHeader,
    pub reserved: u32,
    pub field_size: u8,
    pub sample_count: u32,
    pub entry_sizes: Vec<u16>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkOffsetData {
    #[serde(flatten)]
    pub full: FullBoxHeader,
    pub entry_count: u32,
    pub entries: Vec<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SdtpData {
    #[serde(flatten)]
    pub full: FullBoxHeader,
    /// Only populated when the sample count is known from a sibling size box.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<Vec<SdtpRecord>>,
}

/// One byte of `sdtp`, split into its four 2-bit fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SdtpRecord {
    pub is_leading: u8,
    pub sample_depends_on: u8,
    pub sample_is_depended_on: u8,
    pub sample_has_redundancy: u8,
}

impl From<u8> for SdtpRecord {
    fn from(b: u8) -> Self {
        Self {
            is_leading: (b >> 6) & 0b11,
            sample_depends_on: (b >> 4) & 0b11,
            sample_is_depended_on: (b >> 2) & 0b11,
            sample_has_redundancy: b & 0b11,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TextData {
    pub data: String,
}
