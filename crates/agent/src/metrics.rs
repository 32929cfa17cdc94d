//! Dialogue engine metrics
//!
//! Recorded through the `metrics` facade; the server binary installs the
//! Prometheus recorder. Without a recorder these calls are no-ops.

use metrics::{counter, histogram};

/// Turn processed, labelled by the policy action taken
pub fn record_turn(action: &'static str) {
    counter!("voice_intake_turns_total", "action" => action).increment(1);
}

pub fn record_barge_in() {
    counter!("voice_intake_barge_ins_total").increment(1);
}

pub fn record_duplicate_transcript() {
    counter!("voice_intake_duplicate_transcripts_total").increment(1);
}

/// Synthesis failure; `degraded` when the apology line still played
pub fn record_speech_failure(degraded: bool) {
    let outcome = if degraded { "degraded" } else { "failed" };
    counter!("voice_intake_speech_failures_total", "outcome" => outcome).increment(1);
}

pub fn record_synthesis_latency(duration_secs: f64) {
    histogram!("voice_intake_synthesis_duration_seconds").record(duration_secs);
}

pub fn record_sink_failure(operation: &'static str) {
    counter!("voice_intake_sink_failures_total", "operation" => operation).increment(1);
}

pub fn record_disposition(disposition: &'static str) {
    counter!("voice_intake_dispositions_total", "disposition" => disposition).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_helpers() {
        // No recorder installed; these should not panic
        record_turn("ask");
        record_barge_in();
        record_duplicate_transcript();
        record_speech_failure(true);
        record_synthesis_latency(0.2);
        record_sink_failure("upsert");
        record_disposition("confirmed");
    }
}
