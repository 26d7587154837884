use crate::{
    parser::{Result, walk},
    registry::{Registry, default_registry},
    tree::BoxTree,
    util::{ByteSource, SeekSource},
};
use std::{
    fs::File,
    io::{Read, Seek},
    path::Path,
};

/// Parse an MP4/ISOBMFF file into its box tree.
///
/// The file is opened for the duration of this call only; it is closed on
/// every return path, including decode failures.
///
/// # Example
/// ```no_run
/// let tree = mp4tree::parse("video.mp4")?;
/// println!("{}", serde_json::to_string_pretty(&tree)?);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn parse(path: impl AsRef<Path>) -> Result<BoxTree> {
    let f = File::open(path)?;
    parse_reader(f)
}

/// Parse from any seekable reader (`File`, `Cursor<Vec<u8>>`, ...).
pub fn parse_reader<R: Read + Seek>(reader: R) -> Result<BoxTree> {
    parse_with_registry(reader, default_registry())
}

/// Parse with a caller-supplied set of leaf decoders.
///
/// ```no_run
/// use mp4tree::{FourCC, Registry};
/// # use mp4tree::registry::BoxDecoder;
/// # fn my_decoder() -> Box<dyn BoxDecoder> { unimplemented!() }
///
/// let reg = Registry::standard().with_decoder(FourCC(*b"pasp"), "pasp", my_decoder());
/// let tree = mp4tree::parse_with_registry(std::fs::File::open("video.mp4")?, &reg)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn parse_with_registry<R: Read + Seek>(reader: R, reg: &Registry) -> Result<BoxTree> {
    let mut src = SeekSource::new(reader)?;
    let len = src.len();
    walk(&mut src, reg, 0, len)
}
