//! Client configuration loaded from environment variables.
//!
//! Every setting has a default pointing at the public testnet endpoints,
//! so the client works without any configuration during development.

use std::time::Duration;

use suivote_media::MediaPolicy;
use suivote_shared::constants::{
    DEFAULT_AGGREGATOR_URL, DEFAULT_DEBOUNCE_MS, DEFAULT_MAX_MEDIA_BYTES, DEFAULT_MAX_TRACKED_VOTES,
    DEFAULT_MEDIA_TYPES, DEFAULT_PUBLISHER_URL, DEFAULT_RPC_URL, DEFAULT_STORAGE_EPOCHS,
};
use suivote_sync::ReconcilerConfig;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Blob store endpoint that accepts uploads.
    /// Env: `BLOB_PUBLISHER_URL`
    pub publisher_url: String,

    /// Blob store endpoint that serves uploaded media.
    /// Env: `BLOB_AGGREGATOR_URL`
    pub aggregator_url: String,

    /// Storage epochs requested per blob.
    /// Env: `BLOB_EPOCHS`
    /// Default: `5`
    pub storage_epochs: u32,

    /// Env: `MAX_MEDIA_BYTES`
    /// Default: 10 MiB
    pub max_media_bytes: usize,

    /// Env: `ALLOWED_MEDIA_TYPES` (comma separated)
    pub allowed_media_types: Vec<String>,

    /// Ledger full node JSON-RPC endpoint.
    /// Env: `SUI_RPC_URL`
    pub rpc_url: String,

    /// Package that hosts the voting module.
    /// Env: `VOTING_PACKAGE_ID`
    /// Default: the zero address (development only).
    pub package_id: String,

    /// Address of the connected account, used to recognise its own ballots
    /// in the event stream.
    /// Env: `SUI_ADDRESS`
    pub viewer_address: Option<String>,

    /// Env: `MAX_TRACKED_VOTES`
    /// Default: `10`
    pub max_tracked_votes: usize,

    /// Env: `SYNC_DEBOUNCE_MS`
    /// Default: `500`
    pub debounce_ms: u64,

    /// Env: `EVENT_POLL_MS`
    /// Default: `2000`
    pub event_poll_ms: u64,

    /// Attempts per media upload; retries only cover transient failures.
    /// Env: `UPLOAD_ATTEMPTS`
    /// Default: `1` (no retry)
    pub upload_attempts: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            publisher_url: DEFAULT_PUBLISHER_URL.to_string(),
            aggregator_url: DEFAULT_AGGREGATOR_URL.to_string(),
            storage_epochs: DEFAULT_STORAGE_EPOCHS,
            max_media_bytes: DEFAULT_MAX_MEDIA_BYTES,
            allowed_media_types: DEFAULT_MEDIA_TYPES.iter().map(|t| t.to_string()).collect(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            package_id: format!("0x{}", "0".repeat(64)),
            viewer_address: None,
            max_tracked_votes: DEFAULT_MAX_TRACKED_VOTES,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            event_poll_ms: 2_000,
            upload_attempts: 1,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = var("BLOB_PUBLISHER_URL") {
            config.publisher_url = url;
        }
        if let Some(url) = var("BLOB_AGGREGATOR_URL") {
            config.aggregator_url = url;
        }
        if let Some(n) = parse_var(&var, "BLOB_EPOCHS") {
            config.storage_epochs = n;
        }
        if let Some(n) = parse_var(&var, "MAX_MEDIA_BYTES") {
            config.max_media_bytes = n;
        }
        if let Some(types) = var("ALLOWED_MEDIA_TYPES") {
            config.allowed_media_types = types
                .split(',')
                .map(|t| t.trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty())
                .collect();
        }

        if let Some(url) = var("SUI_RPC_URL") {
            config.rpc_url = url;
        }
        if let Some(id) = var("VOTING_PACKAGE_ID") {
            config.package_id = id;
        }
        if let Some(address) = var("SUI_ADDRESS") {
            if !address.is_empty() {
                config.viewer_address = Some(address);
            }
        }

        if let Some(n) = parse_var(&var, "MAX_TRACKED_VOTES") {
            config.max_tracked_votes = n;
        }
        if let Some(n) = parse_var(&var, "SYNC_DEBOUNCE_MS") {
            config.debounce_ms = n;
        }
        if let Some(n) = parse_var(&var, "EVENT_POLL_MS") {
            config.event_poll_ms = n;
        }
        if let Some(n) = parse_var::<u32>(&var, "UPLOAD_ATTEMPTS") {
            config.upload_attempts = n.max(1);
        }

        config
    }

    pub fn media_policy(&self) -> MediaPolicy {
        MediaPolicy {
            max_bytes: self.max_media_bytes,
            allowed_types: self.allowed_media_types.clone(),
        }
    }

    pub fn reconciler_config(&self) -> ReconcilerConfig {
        let debounce = Duration::from_millis(self.debounce_ms);
        ReconcilerConfig {
            max_tracked: self.max_tracked_votes,
            debounce,
            max_wait: debounce * 4,
        }
    }

    pub fn event_poll_interval(&self) -> Duration {
        Duration::from_millis(self.event_poll_ms.max(1))
    }
}

fn parse_var<T: std::str::FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let value = var(key)?;
    match value.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!(key, value = %value, "Invalid value, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> ClientConfig {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ClientConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.storage_epochs, 5);
        assert_eq!(config.max_tracked_votes, 10);
        assert_eq!(config.upload_attempts, 1);
        assert_eq!(config.package_id.len(), 66);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("BLOB_EPOCHS", "12"),
            ("ALLOWED_MEDIA_TYPES", "image/PNG, video/mp4,"),
            ("SYNC_DEBOUNCE_MS", "250"),
            ("UPLOAD_ATTEMPTS", "0"),
            ("VOTING_PACKAGE_ID", "0xab"),
        ]);

        assert_eq!(config.storage_epochs, 12);
        assert_eq!(config.allowed_media_types, vec!["image/png", "video/mp4"]);
        assert_eq!(config.reconciler_config().max_wait, Duration::from_secs(1));
        assert_eq!(config.upload_attempts, 1);
        assert_eq!(config.package_id, "0xab");
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = load(&[("MAX_TRACKED_VOTES", "lots"), ("EVENT_POLL_MS", "-5")]);
        assert_eq!(config.max_tracked_votes, 10);
        assert_eq!(config.event_poll_ms, 2_000);
    }
}
