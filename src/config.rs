//! Gateway configuration

use crate::error::{Error, Result};

/// Default room name prefix, producing names like `call_<callId>`.
pub const DEFAULT_ROOM_PREFIX: &str = "call_";

/// Default participant cap per room: driver + bot + one human.
pub const DEFAULT_MAX_PARTICIPANTS: u32 = 3;

/// Gateway configuration options
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Platform server URL
    pub server_url: String,

    /// Platform API key
    pub api_key: String,

    /// Platform API secret
    pub api_secret: String,

    /// Prefix prepended to callId to form the room name
    pub room_prefix: String,

    /// Maximum participants per room
    pub max_participants: u32,

    /// Call event bus channel capacity
    pub event_bus_capacity: usize,

    /// Admitted-frame forwarding channel capacity
    pub forward_capacity: usize,

    /// Directory for recording output files
    pub recording_dir: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:7880".to_string(),
            api_key: String::new(),
            api_secret: String::new(),
            room_prefix: DEFAULT_ROOM_PREFIX.to_string(),
            max_participants: DEFAULT_MAX_PARTICIPANTS,
            event_bus_capacity: 256,
            forward_capacity: 1024,
            recording_dir: "recordings".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Create a config with the given platform credentials
    pub fn new(
        server_url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            ..Default::default()
        }
    }

    /// Load platform credentials from the environment
    ///
    /// Reads `VOICEGATE_SERVER_URL`, `VOICEGATE_API_KEY` and
    /// `VOICEGATE_API_SECRET`; all three are required.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            std::env::var(name).map_err(|_| Error::Config(format!("{} is not set", name)))
        };

        Ok(Self::new(
            var("VOICEGATE_SERVER_URL")?,
            var("VOICEGATE_API_KEY")?,
            var("VOICEGATE_API_SECRET")?,
        ))
    }

    /// Set the room name prefix
    pub fn room_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.room_prefix = prefix.into();
        self
    }

    /// Set the per-room participant cap
    pub fn max_participants(mut self, max: u32) -> Self {
        self.max_participants = max;
        self
    }

    /// Set the call event bus capacity
    pub fn event_bus_capacity(mut self, capacity: usize) -> Self {
        self.event_bus_capacity = capacity;
        self
    }

    /// Set the forwarding channel capacity
    pub fn forward_capacity(mut self, capacity: usize) -> Self {
        self.forward_capacity = capacity;
        self
    }

    /// Set the recording output directory
    pub fn recording_dir(mut self, dir: impl Into<String>) -> Self {
        self.recording_dir = dir.into();
        self
    }

    /// Room name for a callId under this config
    pub fn room_name(&self, call_id: &str) -> String {
        format!("{}{}", self.room_prefix, call_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();

        assert_eq!(config.room_prefix, "call_");
        assert_eq!(config.max_participants, 3);
        assert_eq!(config.event_bus_capacity, 256);
        assert_eq!(config.forward_capacity, 1024);
        assert_eq!(config.recording_dir, "recordings");
    }

    #[test]
    fn test_room_name() {
        let config = GatewayConfig::default();

        assert_eq!(config.room_name("42"), "call_42");
    }

    #[test]
    fn test_builder_chaining() {
        let config = GatewayConfig::new("http://localhost:7880", "key", "secret")
            .room_prefix("voice_")
            .max_participants(4)
            .event_bus_capacity(64)
            .forward_capacity(128)
            .recording_dir("/tmp/recordings");

        assert_eq!(config.api_key, "key");
        assert_eq!(config.room_prefix, "voice_");
        assert_eq!(config.max_participants, 4);
        assert_eq!(config.event_bus_capacity, 64);
        assert_eq!(config.forward_capacity, 128);
        assert_eq!(config.recording_dir, "/tmp/recordings");
        assert_eq!(config.room_name("abc"), "voice_abc");
    }

    #[test]
    fn test_from_env_missing() {
        // Only asserts the error shape; the success path would race other
        // tests mutating the process environment.
        std::env::remove_var("VOICEGATE_SERVER_URL");
        let result = GatewayConfig::from_env();
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
