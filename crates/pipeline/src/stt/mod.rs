//! Speech recognition

mod http;

pub use http::{ChunkBuffer, HttpTranscriber};
