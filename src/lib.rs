pub mod api;
pub mod boxes;
pub mod codec;
pub mod decoders;
pub mod fields;
pub mod known_boxes;
pub mod parser;
pub mod registry;
pub mod tree;
pub mod util;

pub use api::{parse, parse_reader, parse_with_registry};
pub use boxes::{BoxHeader, FourCC, Mp4Box};
pub use fields::BoxFields;
pub use known_boxes::BoxPolicy;
pub use parser::{ParseError, read_box_header, walk};
pub use registry::{Registry, default_registry};
pub use tree::{BoxTree, Entry};
pub use util::{ByteSource, SeekSource};
