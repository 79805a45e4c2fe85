//! Binary parameter files (`.emb`).

mod file;

pub use file::{
    decode, encode, encode_with_layout, read_heightmap_file, write_heightmap_file,
    CellularLayout, CodecError, HeightmapFile,
};
