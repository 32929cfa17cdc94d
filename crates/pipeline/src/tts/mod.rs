//! Speech synthesis

mod http;

pub use http::HttpSynthesizer;
