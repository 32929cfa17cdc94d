//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use voice_intake_core::AudioEncoding;

use crate::constants::{dialogue, endpoints, synthesis, timing, transcription};
use crate::{ConfigError, PromptsConfig};

/// Runtime environment enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Turn-taking and policy timing
    #[serde(default)]
    pub dialogue: DialogueConfig,

    /// Synthesis provider
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Transcription provider
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Carrier call control
    #[serde(default)]
    pub telephony: TelephonyConfig,

    /// Outcome persistence (ScyllaDB)
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Every line the agent speaks
    #[serde(default)]
    pub prompts: PromptsConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_dialogue()?;
        self.validate_speech()?;
        self.validate_server()?;

        if self.environment.is_strict() && self.telephony.call_control_url.is_none() {
            return Err(ConfigError::MissingField(
                "telephony.call_control_url".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_dialogue(&self) -> Result<(), ConfigError> {
        let d = &self.dialogue;

        if d.speech_min_ms > d.speech_max_ms {
            return Err(ConfigError::InvalidValue {
                field: "dialogue.speech_min_ms".to_string(),
                message: format!(
                    "Must not exceed speech_max_ms ({} > {})",
                    d.speech_min_ms, d.speech_max_ms
                ),
            });
        }

        if d.post_speech_grace_ms > 5000 {
            return Err(ConfigError::InvalidValue {
                field: "dialogue.post_speech_grace_ms".to_string(),
                message: "Grace period too long (maximum 5000ms)".to_string(),
            });
        }

        if d.duplicate_window_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dialogue.duplicate_window_ms".to_string(),
                message: "Must be positive".to_string(),
            });
        }

        if d.max_confirmation_reprompts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dialogue.max_confirmation_reprompts".to_string(),
                message: "At least one re-prompt is required".to_string(),
            });
        }

        Ok(())
    }

    fn validate_speech(&self) -> Result<(), ConfigError> {
        if self.speech.timeout_ms < 100 {
            return Err(ConfigError::InvalidValue {
                field: "speech.timeout_ms".to_string(),
                message: "Timeout too low (minimum 100ms)".to_string(),
            });
        }

        if self.speech.max_retries > 5 {
            return Err(ConfigError::InvalidValue {
                field: "speech.max_retries".to_string(),
                message: format!("At most 5 retries allowed, got {}", self.speech.max_retries),
            });
        }

        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port must be non-zero".to_string(),
            });
        }

        if !self.server.media_path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "server.media_path".to_string(),
                message: "Must start with '/'".to_string(),
            });
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Carrier media-stream websocket path
    #[serde(default = "default_media_path")]
    pub media_path: String,

    /// Maximum concurrent calls
    #[serde(default = "default_max_calls")]
    pub max_calls: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_media_path() -> String {
    "/media".to_string()
}
fn default_max_calls() -> usize {
    200
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            media_path: default_media_path(),
            max_calls: default_max_calls(),
        }
    }
}

/// Turn-taking timing and policy bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    #[serde(default = "default_grace_ms")]
    pub post_speech_grace_ms: u64,

    #[serde(default = "default_duplicate_window_ms")]
    pub duplicate_window_ms: u64,

    #[serde(default = "default_settle_window_ms")]
    pub settle_window_ms: u64,

    #[serde(default = "default_ms_per_char")]
    pub speech_ms_per_char: u64,

    #[serde(default = "default_speech_min_ms")]
    pub speech_min_ms: u64,

    #[serde(default = "default_speech_max_ms")]
    pub speech_max_ms: u64,

    #[serde(default = "default_closing_delay_ms")]
    pub closing_delay_ms: u64,

    #[serde(default = "default_max_reprompts")]
    pub max_confirmation_reprompts: u32,

    #[serde(default = "default_min_issue_chars")]
    pub min_issue_chars: usize,
}

fn default_grace_ms() -> u64 {
    timing::POST_SPEECH_GRACE_MS
}
fn default_duplicate_window_ms() -> u64 {
    timing::DUPLICATE_WINDOW_MS
}
fn default_settle_window_ms() -> u64 {
    timing::SETTLE_WINDOW_MS
}
fn default_ms_per_char() -> u64 {
    timing::SPEECH_MS_PER_CHAR
}
fn default_speech_min_ms() -> u64 {
    timing::SPEECH_MIN_MS
}
fn default_speech_max_ms() -> u64 {
    timing::SPEECH_MAX_MS
}
fn default_closing_delay_ms() -> u64 {
    timing::CLOSING_DELAY_MS
}
fn default_max_reprompts() -> u32 {
    dialogue::MAX_CONFIRMATION_REPROMPTS
}
fn default_min_issue_chars() -> usize {
    dialogue::MIN_ISSUE_CHARS
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            post_speech_grace_ms: default_grace_ms(),
            duplicate_window_ms: default_duplicate_window_ms(),
            settle_window_ms: default_settle_window_ms(),
            speech_ms_per_char: default_ms_per_char(),
            speech_min_ms: default_speech_min_ms(),
            speech_max_ms: default_speech_max_ms(),
            closing_delay_ms: default_closing_delay_ms(),
            max_confirmation_reprompts: default_max_reprompts(),
            min_issue_chars: default_min_issue_chars(),
        }
    }
}

impl DialogueConfig {
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.post_speech_grace_ms)
    }

    pub fn duplicate_window(&self) -> Duration {
        Duration::from_millis(self.duplicate_window_ms)
    }

    pub fn settle_window(&self) -> Duration {
        Duration::from_millis(self.settle_window_ms)
    }

    pub fn closing_delay(&self) -> Duration {
        Duration::from_millis(self.closing_delay_ms)
    }

    /// Estimated time to speak `text`, clamped to [min, max]
    pub fn estimate_speech(&self, text: &str) -> Duration {
        let chars = text.chars().count() as u64;
        let ms = (chars * self.speech_ms_per_char).clamp(self.speech_min_ms, self.speech_max_ms);
        Duration::from_millis(ms)
    }
}

/// Synthesis provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_synthesis_url")]
    pub url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_voice")]
    pub voice: String,

    #[serde(default)]
    pub encoding: AudioEncoding,

    #[serde(default = "default_synthesis_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_synthesis_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    #[serde(default = "default_failure_release_ms")]
    pub failure_release_ms: u64,
}

fn default_synthesis_url() -> String {
    endpoints::SYNTHESIS_DEFAULT.to_string()
}
fn default_voice() -> String {
    "en-US-standard".to_string()
}
fn default_synthesis_timeout_ms() -> u64 {
    synthesis::TIMEOUT_MS
}
fn default_synthesis_retries() -> u32 {
    synthesis::MAX_RETRIES
}
fn default_retry_backoff_ms() -> u64 {
    synthesis::RETRY_BACKOFF_MS
}
fn default_failure_release_ms() -> u64 {
    synthesis::FAILURE_RELEASE_MS
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            url: default_synthesis_url(),
            api_key: None,
            voice: default_voice(),
            encoding: AudioEncoding::default(),
            timeout_ms: default_synthesis_timeout_ms(),
            max_retries: default_synthesis_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            failure_release_ms: default_failure_release_ms(),
        }
    }
}

impl SpeechConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Backoff before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms * attempt as u64)
    }
}

/// Transcription provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    #[serde(default = "default_transcription_url")]
    pub url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub encoding: AudioEncoding,

    #[serde(default = "default_transcription_timeout_ms")]
    pub timeout_ms: u64,

    /// Audio bytes buffered before a recognition request is sent
    #[serde(default = "default_chunk_bytes")]
    pub chunk_bytes: usize,
}

fn default_transcription_url() -> String {
    endpoints::TRANSCRIPTION_DEFAULT.to_string()
}
fn default_language() -> String {
    "en-US".to_string()
}
fn default_transcription_timeout_ms() -> u64 {
    transcription::TIMEOUT_MS
}
fn default_chunk_bytes() -> usize {
    transcription::CHUNK_BYTES
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            url: default_transcription_url(),
            api_key: None,
            language: default_language(),
            encoding: AudioEncoding::default(),
            timeout_ms: default_transcription_timeout_ms(),
            chunk_bytes: default_chunk_bytes(),
        }
    }
}

/// Carrier call-control configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelephonyConfig {
    /// Base URL of the carrier call-control API; unset disables transfer/hangup
    #[serde(default)]
    pub call_control_url: Option<String>,

    #[serde(default)]
    pub auth_token: Option<String>,

    /// Number calls are transferred to
    #[serde(default)]
    pub transfer_number: Option<String>,

    /// Spoken in the apology when synthesis keeps failing
    #[serde(default = "default_alternate_contact")]
    pub alternate_contact: String,
}

fn default_alternate_contact() -> String {
    "You can also reach the shop directly during business hours".to_string()
}

impl Default for TelephonyConfig {
    fn default() -> Self {
        Self {
            call_control_url: None,
            auth_token: None,
            transfer_number: None,
            alternate_contact: default_alternate_contact(),
        }
    }
}

/// Persistence configuration for ScyllaDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Enable ScyllaDB persistence (false = in-memory only)
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_scylla_hosts")]
    pub scylla_hosts: Vec<String>,

    #[serde(default = "default_scylla_keyspace")]
    pub keyspace: String,

    #[serde(default = "default_replication_factor")]
    pub replication_factor: u8,
}

fn default_scylla_hosts() -> Vec<String> {
    std::env::var("SCYLLA_HOSTS")
        .map(|s| s.split(',').map(|h| h.trim().to_string()).collect())
        .unwrap_or_else(|_| vec!["127.0.0.1:9042".to_string()])
}

fn default_scylla_keyspace() -> String {
    std::env::var("SCYLLA_KEYSPACE").unwrap_or_else(|_| "voice_intake".to_string())
}

fn default_replication_factor() -> u8 {
    1
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            scylla_hosts: default_scylla_hosts(),
            keyspace: default_scylla_keyspace(),
            replication_factor: default_replication_factor(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Priority: env vars > config/{env}.* > config/default.* > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from("config", env)
}

/// Load settings rooted at an explicit config directory
pub fn load_settings_from(dir: &str, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name(&format!("{}/default", dir)).required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("{}/{}", dir, env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("VOICE_INTAKE")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    tracing::debug!(
        environment = ?settings.environment,
        port = settings.server.port,
        persistence = settings.persistence.enabled,
        "Settings loaded"
    );

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.dialogue.post_speech_grace_ms, 800);
        assert_eq!(settings.dialogue.duplicate_window_ms, 1500);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_dialogue_validation() {
        let mut settings = Settings::default();
        settings.dialogue.speech_min_ms = 20_000;
        assert!(settings.validate().is_err());

        settings.dialogue.speech_min_ms = 1000;
        settings.dialogue.max_confirmation_reprompts = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_strict_env_requires_call_control() {
        let mut settings = Settings::default();
        settings.environment = RuntimeEnvironment::Production;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::MissingField(_))
        ));

        settings.telephony.call_control_url = Some("https://carrier.example/api".to_string());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_speech_estimate_is_clamped() {
        let d = DialogueConfig::default();
        assert_eq!(d.estimate_speech("Hi"), Duration::from_millis(d.speech_min_ms));
        let long = "a".repeat(10_000);
        assert_eq!(d.estimate_speech(&long), Duration::from_millis(d.speech_max_ms));
        let mid = "a".repeat(100);
        assert_eq!(d.estimate_speech(&mid), Duration::from_millis(6500));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("default.json");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"{{"server": {{"port": 9000}}, "dialogue": {{"post_speech_grace_ms": 600}}}}"#
        )
        .unwrap();

        let settings = load_settings_from(dir.path().to_str().unwrap(), None).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.dialogue.post_speech_grace_ms, 600);
        assert_eq!(settings.dialogue.duplicate_window_ms, 1500);
    }
}
