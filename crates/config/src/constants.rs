//! Centralized constants for the intake agent
//!
//! Single source of truth for timing defaults and endpoints. Settings
//! fall back to these when a value is absent from config files and env.

/// Turn-taking timing (milliseconds)
pub mod timing {
    /// Quiet period after the agent stops speaking before caller input is dispatched
    pub const POST_SPEECH_GRACE_MS: u64 = 800;

    /// Identical final transcripts within this window are duplicates
    pub const DUPLICATE_WINDOW_MS: u64 = 1500;

    /// A pending final transcript must sit unsuperseded this long
    pub const SETTLE_WINDOW_MS: u64 = 250;

    /// Estimated speaking rate used to size the speaking window
    pub const SPEECH_MS_PER_CHAR: u64 = 65;
    pub const SPEECH_MIN_MS: u64 = 1200;
    pub const SPEECH_MAX_MS: u64 = 15000;

    /// Delay between the closing line finishing and hangup
    pub const CLOSING_DELAY_MS: u64 = 1500;
}

/// Synthesis provider defaults
pub mod synthesis {
    pub const TIMEOUT_MS: u64 = 4000;
    pub const MAX_RETRIES: u32 = 2;
    pub const RETRY_BACKOFF_MS: u64 = 250;
    /// Speaking window held after a total synthesis failure
    pub const FAILURE_RELEASE_MS: u64 = 300;
}

/// Transcription provider defaults
pub mod transcription {
    pub const TIMEOUT_MS: u64 = 5000;
    /// About 1.5s of 8 kHz mu-law audio
    pub const CHUNK_BYTES: usize = 12000;
}

/// Default endpoints (overridable by config)
pub mod endpoints {
    pub const SYNTHESIS_DEFAULT: &str = "http://127.0.0.1:8091/synthesize";
    pub const TRANSCRIPTION_DEFAULT: &str = "http://127.0.0.1:8090/transcribe";
}

/// Dialogue policy bounds
pub mod dialogue {
    pub const MAX_CONFIRMATION_REPROMPTS: u32 = 3;
    pub const MIN_ISSUE_CHARS: usize = 6;
}
