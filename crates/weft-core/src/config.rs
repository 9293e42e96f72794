//! Configuration module for weft clients

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Default number of history shards
pub const DEFAULT_NUM_SHARDS: u32 = 16;

/// Default per-attempt timeout for history calls
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Default visibility write quota per domain (records per second)
pub const DEFAULT_VISIBILITY_MAX_QPS: u32 = 300;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("number_of_shards must be greater than zero")]
    ZeroShards,

    #[error("rpc_timeout must be greater than zero")]
    ZeroTimeout,

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// History client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Client identity, used in logs
    pub client_id: String,

    /// Cluster-wide shard count; must match the servers
    pub number_of_shards: u32,

    /// Upper bound on each attempt, layered under the caller's deadline
    #[serde(with = "duration_ms")]
    pub rpc_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: uuid::Uuid::new_v4().to_string(),
            number_of_shards: DEFAULT_NUM_SHARDS,
            rpc_timeout: DEFAULT_RPC_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Create a config for the given shard count
    pub fn with_shards(number_of_shards: u32) -> Self {
        Self {
            number_of_shards,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = ClientConfig::default();

        if let Ok(client_id) = std::env::var("WEFT_CLIENT_ID") {
            config.client_id = client_id;
        }

        if let Some(shards) = parse_env::<u32>("WEFT_NUM_SHARDS")? {
            config.number_of_shards = shards;
        }

        if let Some(ms) = parse_env::<u64>("WEFT_RPC_TIMEOUT_MS")? {
            config.rpc_timeout = Duration::from_millis(ms);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the client cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.number_of_shards == 0 {
            return Err(ConfigError::ZeroShards);
        }
        if self.rpc_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

/// Per-domain quota: a default plus named overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainQps {
    pub default_qps: u32,

    #[serde(default)]
    pub overrides: HashMap<String, u32>,
}

impl DomainQps {
    pub fn new(default_qps: u32) -> Self {
        Self {
            default_qps,
            overrides: HashMap::new(),
        }
    }

    pub fn with_override(mut self, domain: impl Into<String>, qps: u32) -> Self {
        self.overrides.insert(domain.into(), qps);
        self
    }

    /// Quota for a domain
    pub fn for_domain(&self, domain: &str) -> u32 {
        self.overrides.get(domain).copied().unwrap_or(self.default_qps)
    }
}

/// Visibility sampling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Quota for open-lifecycle records
    pub open_max_qps: DomainQps,

    /// Quota for closed-lifecycle records
    pub closed_max_qps: DomainQps,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            open_max_qps: DomainQps::new(DEFAULT_VISIBILITY_MAX_QPS),
            closed_max_qps: DomainQps::new(DEFAULT_VISIBILITY_MAX_QPS),
        }
    }
}

impl SamplingConfig {
    /// Load configuration from environment variables.
    ///
    /// `WEFT_VISIBILITY_{OPEN,CLOSED}_MAX_QPS` set the defaults and
    /// `WEFT_VISIBILITY_{OPEN,CLOSED}_MAX_QPS_OVERRIDES` take a JSON object
    /// of domain name to quota.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = SamplingConfig::default();

        if let Some(qps) = parse_env::<u32>("WEFT_VISIBILITY_OPEN_MAX_QPS")? {
            config.open_max_qps.default_qps = qps;
        }
        if let Some(qps) = parse_env::<u32>("WEFT_VISIBILITY_CLOSED_MAX_QPS")? {
            config.closed_max_qps.default_qps = qps;
        }
        if let Some(overrides) = parse_overrides("WEFT_VISIBILITY_OPEN_MAX_QPS_OVERRIDES")? {
            config.open_max_qps.overrides = overrides;
        }
        if let Some(overrides) = parse_overrides("WEFT_VISIBILITY_CLOSED_MAX_QPS_OVERRIDES")? {
            config.closed_max_qps.overrides = overrides;
        }

        Ok(config)
    }

    pub fn open_qps(&self, domain: &str) -> u32 {
        self.open_max_qps.for_domain(domain)
    }

    pub fn closed_qps(&self, domain: &str) -> u32 {
        self.closed_max_qps.for_domain(domain)
    }
}

fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

fn parse_overrides(key: &str) -> Result<Option<HashMap<String, u32>>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    const ENV_KEYS: &[&str] = &[
        "WEFT_CLIENT_ID",
        "WEFT_NUM_SHARDS",
        "WEFT_RPC_TIMEOUT_MS",
        "WEFT_VISIBILITY_OPEN_MAX_QPS",
        "WEFT_VISIBILITY_CLOSED_MAX_QPS",
        "WEFT_VISIBILITY_OPEN_MAX_QPS_OVERRIDES",
        "WEFT_VISIBILITY_CLOSED_MAX_QPS_OVERRIDES",
    ];

    // Env vars are process-global; tests that touch them hold this lock
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Run `f` with exactly `vars` set among the weft keys
    fn with_env<R>(vars: &[(&str, &str)], f: impl FnOnce() -> R) -> R {
        let _guard = ENV_LOCK.lock();
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
        let result = f();
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
        result
    }

    #[test]
    fn test_client_from_env_defaults() {
        let config = with_env(&[], ClientConfig::from_env).unwrap();
        assert_eq!(config.number_of_shards, DEFAULT_NUM_SHARDS);
        assert_eq!(config.rpc_timeout, DEFAULT_RPC_TIMEOUT);
    }

    #[test]
    fn test_client_from_env_reads_values() {
        let config = with_env(
            &[
                ("WEFT_CLIENT_ID", "frontend-7"),
                ("WEFT_NUM_SHARDS", " 256 "),
                ("WEFT_RPC_TIMEOUT_MS", "2500"),
            ],
            ClientConfig::from_env,
        )
        .unwrap();

        assert_eq!(config.client_id, "frontend-7");
        assert_eq!(config.number_of_shards, 256);
        assert_eq!(config.rpc_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn test_client_from_env_rejects_non_numeric() {
        let result = with_env(&[("WEFT_NUM_SHARDS", "many")], ClientConfig::from_env);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "WEFT_NUM_SHARDS"
        ));

        let result = with_env(&[("WEFT_RPC_TIMEOUT_MS", "-5")], ClientConfig::from_env);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "WEFT_RPC_TIMEOUT_MS"
        ));
    }

    #[test]
    fn test_client_from_env_rejects_zero_shards() {
        let result = with_env(&[("WEFT_NUM_SHARDS", "0")], ClientConfig::from_env);
        assert!(matches!(result, Err(ConfigError::ZeroShards)));
    }

    #[test]
    fn test_client_from_env_rejects_zero_timeout() {
        let result = with_env(&[("WEFT_RPC_TIMEOUT_MS", "0")], ClientConfig::from_env);
        assert!(matches!(result, Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn test_sampling_from_env_reads_quotas_and_overrides() {
        let config = with_env(
            &[
                ("WEFT_VISIBILITY_OPEN_MAX_QPS", "50"),
                ("WEFT_VISIBILITY_CLOSED_MAX_QPS", "80"),
                ("WEFT_VISIBILITY_OPEN_MAX_QPS_OVERRIDES", r#"{"payments": 5}"#),
                ("WEFT_VISIBILITY_CLOSED_MAX_QPS_OVERRIDES", r#"{"payments": 9, "search": 1}"#),
            ],
            SamplingConfig::from_env,
        )
        .unwrap();

        assert_eq!(config.open_qps("payments"), 5);
        assert_eq!(config.open_qps("search"), 50);
        assert_eq!(config.closed_qps("payments"), 9);
        assert_eq!(config.closed_qps("search"), 1);
        assert_eq!(config.closed_qps("shipping"), 80);
    }

    #[test]
    fn test_sampling_from_env_defaults() {
        let config = with_env(&[], SamplingConfig::from_env).unwrap();
        assert_eq!(config, SamplingConfig::default());
    }

    #[test]
    fn test_sampling_from_env_rejects_non_numeric() {
        let result = with_env(
            &[("WEFT_VISIBILITY_CLOSED_MAX_QPS", "fast")],
            SamplingConfig::from_env,
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, .. })
                if key == "WEFT_VISIBILITY_CLOSED_MAX_QPS"
        ));
    }

    #[test]
    fn test_sampling_from_env_rejects_malformed_overrides() {
        let result = with_env(
            &[("WEFT_VISIBILITY_OPEN_MAX_QPS_OVERRIDES", "payments=5")],
            SamplingConfig::from_env,
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, .. })
                if key == "WEFT_VISIBILITY_OPEN_MAX_QPS_OVERRIDES"
        ));

        let result = with_env(
            &[("WEFT_VISIBILITY_CLOSED_MAX_QPS_OVERRIDES", r#"{"payments": -1}"#)],
            SamplingConfig::from_env,
        );
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(!config.client_id.is_empty());
        assert_eq!(config.number_of_shards, DEFAULT_NUM_SHARDS);
        assert_eq!(config.rpc_timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_shards_rejected() {
        let config = ClientConfig::with_shards(0);
        assert!(matches!(config.validate(), Err(ConfigError::ZeroShards)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = ClientConfig {
            rpc_timeout: Duration::ZERO,
            ..ClientConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn test_domain_override() {
        let qps = DomainQps::new(100).with_override("billing", 5);
        assert_eq!(qps.for_domain("billing"), 5);
        assert_eq!(qps.for_domain("search"), 100);
    }

    #[test]
    fn test_config_json_shape() {
        let json = r#"{
            "client_id": "frontend-1",
            "number_of_shards": 512,
            "rpc_timeout": 1500
        }"#;
        let config: ClientConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.number_of_shards, 512);
        assert_eq!(config.rpc_timeout, Duration::from_millis(1500));

        let sampling: SamplingConfig = serde_json::from_str(
            r#"{
                "open_max_qps": { "default_qps": 10, "overrides": { "hot": 1 } },
                "closed_max_qps": { "default_qps": 20 }
            }"#,
        )
        .unwrap();
        assert_eq!(sampling.open_qps("hot"), 1);
        assert_eq!(sampling.open_qps("cold"), 10);
        assert_eq!(sampling.closed_qps("hot"), 20);
    }
}
