//! Telephony traits owned by the carrier collaborator

use async_trait::async_trait;

use crate::Result;

/// Outbound audio for a live call
#[async_trait]
pub trait AudioEgress: Send + Sync + 'static {
    /// Queue one audio frame for playback
    async fn send_audio(&self, call_id: &str, frame: &[u8]) -> Result<()>;

    /// Drop everything queued for playback (barge-in)
    async fn clear_playback(&self, call_id: &str) -> Result<()>;
}

/// Fire-and-confirm call control operations
#[async_trait]
pub trait CallControl: Send + Sync + 'static {
    /// Hand the live call to a human operator
    async fn transfer_to_human(&self, call_id: &str) -> Result<()>;

    /// Terminate the call
    async fn hangup(&self, call_id: &str) -> Result<()>;
}
