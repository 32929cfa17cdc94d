//! Audio payload types
//!
//! The engine never transcodes. Synthesized audio is requested in the
//! carrier's wire encoding and forwarded as opaque frames.

use serde::{Deserialize, Serialize};

/// Wire encoding requested from the synthesis provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AudioEncoding {
    /// G.711 mu-law, 8 kHz mono (telephony default)
    #[default]
    Mulaw8k,
    /// 16-bit little-endian PCM, 8 kHz mono
    Linear16,
}

impl AudioEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioEncoding::Mulaw8k => "mulaw_8000",
            AudioEncoding::Linear16 => "pcm_8000",
        }
    }

    /// Bytes for one 20ms frame
    pub fn frame_bytes(&self) -> usize {
        match self {
            AudioEncoding::Mulaw8k => 160,
            AudioEncoding::Linear16 => 320,
        }
    }
}

/// Audio returned by the synthesis provider
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub bytes: Vec<u8>,
    pub encoding: AudioEncoding,
}

impl SynthesizedAudio {
    pub fn new(bytes: Vec<u8>, encoding: AudioEncoding) -> Self {
        Self { bytes, encoding }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Split into 20ms frames for the outbound stream
    pub fn frames(&self) -> impl Iterator<Item = &[u8]> {
        self.bytes.chunks(self.encoding.frame_bytes())
    }
}
