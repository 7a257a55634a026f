//! Configuration for the vote-relay function.
//!
//! Settings are read from the environment as raw strings and validated into
//! a [`RelayConfig`] at the start of every invocation, so a broken
//! deployment fails with a `ConfigurationError` before any store query or
//! socket is attempted.

use std::time::Duration;

use vote_relay_core::validate_topic;
use vote_relay_publisher::{GatewayEndpoint, PublishError, DEFAULT_TIMEOUT};
use vote_relay_store::StoreLocation;

use crate::error::ConfigError;

/// Environment variable names.
pub mod env {
    /// Document store base URL.
    pub const STORE_ENDPOINT: &str = "STORE_ENDPOINT";
    /// Store project id.
    pub const STORE_PROJECT_ID: &str = "STORE_PROJECT_ID";
    /// Store API key.
    pub const STORE_API_KEY: &str = "STORE_API_KEY";
    /// Database holding the votes collection.
    pub const DATABASE_ID: &str = "DATABASE_ID";
    /// Votes collection.
    pub const VOTES_COLLECTION_ID: &str = "VOTES_COLLECTION_ID";
    /// Gateway `ws://`/`wss://` URL.
    pub const GATEWAY_URL: &str = "GATEWAY_URL";
    /// Gateway credential.
    pub const GATEWAY_ACCESS_KEY: &str = "GATEWAY_ACCESS_KEY";
    /// Publish topic.
    pub const GATEWAY_TOPIC: &str = "GATEWAY_TOPIC";
    /// Socket open bound in whole seconds.
    pub const GATEWAY_TIMEOUT_SECONDS: &str = "GATEWAY_TIMEOUT_SECONDS";
}

/// Topic used when `GATEWAY_TOPIC` is unset.
pub const DEFAULT_TOPIC: &str = "forum-votes";

/// Raw, unvalidated settings.
///
/// Blank values are normalized to `None` on load.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RelaySettings {
    /// `STORE_ENDPOINT`
    pub store_endpoint: Option<String>,
    /// `STORE_PROJECT_ID`
    pub store_project_id: Option<String>,
    /// `STORE_API_KEY`
    pub store_api_key: Option<String>,
    /// `DATABASE_ID`
    pub database_id: Option<String>,
    /// `VOTES_COLLECTION_ID`
    pub votes_collection_id: Option<String>,
    /// `GATEWAY_URL`
    pub gateway_url: Option<String>,
    /// `GATEWAY_ACCESS_KEY`
    pub gateway_access_key: Option<String>,
    /// `GATEWAY_TOPIC`
    pub gateway_topic: Option<String>,
    /// `GATEWAY_TIMEOUT_SECONDS`
    pub gateway_timeout_seconds: Option<String>,
}

impl RelaySettings {
    /// Load settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            store_endpoint: get(env::STORE_ENDPOINT),
            store_project_id: get(env::STORE_PROJECT_ID),
            store_api_key: get(env::STORE_API_KEY),
            database_id: get(env::DATABASE_ID),
            votes_collection_id: get(env::VOTES_COLLECTION_ID),
            gateway_url: get(env::GATEWAY_URL),
            gateway_access_key: get(env::GATEWAY_ACCESS_KEY),
            gateway_topic: get(env::GATEWAY_TOPIC),
            gateway_timeout_seconds: get(env::GATEWAY_TIMEOUT_SECONDS),
        }
    }

    /// Validate the settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` naming every absent required variable,
    /// or `ConfigError::Invalid` for the first malformed one.
    pub fn validate(&self) -> Result<RelayConfig, ConfigError> {
        let required = [
            (env::STORE_ENDPOINT, &self.store_endpoint),
            (env::STORE_PROJECT_ID, &self.store_project_id),
            (env::STORE_API_KEY, &self.store_api_key),
            (env::DATABASE_ID, &self.database_id),
            (env::VOTES_COLLECTION_ID, &self.votes_collection_id),
            (env::GATEWAY_URL, &self.gateway_url),
            (env::GATEWAY_ACCESS_KEY, &self.gateway_access_key),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let value = |v: &Option<String>| v.clone().unwrap_or_default();

        let topic = self
            .gateway_topic
            .clone()
            .unwrap_or_else(|| DEFAULT_TOPIC.to_string());
        validate_topic(&topic).map_err(|e| ConfigError::Invalid {
            variable: env::GATEWAY_TOPIC,
            reason: e.to_string(),
        })?;

        let timeout = match &self.gateway_timeout_seconds {
            None => DEFAULT_TIMEOUT,
            Some(raw) => parse_timeout(raw)?,
        };

        let gateway = GatewayEndpoint::new(
            &value(&self.gateway_url),
            &value(&self.gateway_access_key),
            timeout,
        )
        .map_err(|e| ConfigError::Invalid {
            variable: env::GATEWAY_URL,
            reason: match e {
                PublishError::InvalidEndpoint(reason) => reason,
                other => other.to_string(),
            },
        })?;

        let endpoint = value(&self.store_endpoint);
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                variable: env::STORE_ENDPOINT,
                reason: format!("{endpoint:?} is not an http(s) URL"),
            });
        }

        Ok(RelayConfig {
            store: StoreLocation {
                endpoint,
                project_id: value(&self.store_project_id),
                api_key: value(&self.store_api_key),
                database_id: value(&self.database_id),
                collection_id: value(&self.votes_collection_id),
            },
            gateway,
            topic,
        })
    }
}

impl std::fmt::Debug for RelaySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let secret = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("RelaySettings")
            .field("store_endpoint", &self.store_endpoint)
            .field("store_project_id", &self.store_project_id)
            .field("store_api_key", &secret(&self.store_api_key))
            .field("database_id", &self.database_id)
            .field("votes_collection_id", &self.votes_collection_id)
            .field("gateway_url", &self.gateway_url)
            .field("gateway_access_key", &secret(&self.gateway_access_key))
            .field("gateway_topic", &self.gateway_topic)
            .field("gateway_timeout_seconds", &self.gateway_timeout_seconds)
            .finish()
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::Invalid {
            variable: env::GATEWAY_TIMEOUT_SECONDS,
            reason: format!("{raw:?} is not a positive number of seconds"),
        }),
    }
}

/// Validated configuration for one invocation.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Where the votes collection lives.
    pub store: StoreLocation,
    /// Where update events are published.
    pub gateway: GatewayEndpoint,
    /// Topic placed in front of every frame.
    pub topic: String,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn full() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            (env::STORE_ENDPOINT, "https://cloud.example.com/v1"),
            (env::STORE_PROJECT_ID, "forum"),
            (env::STORE_API_KEY, "store-secret"),
            (env::DATABASE_ID, "main"),
            (env::VOTES_COLLECTION_ID, "votes"),
            (env::GATEWAY_URL, "wss://gw.example.com/v0/events"),
            (env::GATEWAY_ACCESS_KEY, "gw-secret"),
        ])
    }

    fn settings(vars: &HashMap<&'static str, &'static str>) -> RelaySettings {
        RelaySettings::from_lookup(|name| vars.get(name).map(ToString::to_string))
    }

    #[test]
    fn defaults_apply() {
        let config = settings(&full()).validate().unwrap();

        assert_eq!(config.topic, "forum-votes");
        assert_eq!(config.gateway.timeout(), Duration::from_secs(10));
        assert_eq!(
            config.gateway.url().as_str(),
            "wss://gw.example.com/v0/events?access_key=gw-secret"
        );
        assert_eq!(
            config.store.documents_url(),
            "https://cloud.example.com/v1/databases/main/collections/votes/documents"
        );
    }

    #[test]
    fn overrides_apply() {
        let mut vars = full();
        vars.insert(env::GATEWAY_TOPIC, "votes-staging");
        vars.insert(env::GATEWAY_TIMEOUT_SECONDS, "3");

        let config = settings(&vars).validate().unwrap();
        assert_eq!(config.topic, "votes-staging");
        assert_eq!(config.gateway.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn lists_every_missing_variable() {
        let mut vars = full();
        vars.remove(env::STORE_API_KEY);
        vars.insert(env::GATEWAY_URL, "   ");

        let err = settings(&vars).validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::Missing(vec![env::STORE_API_KEY, env::GATEWAY_URL])
        );
    }

    #[test]
    fn empty_environment_is_all_missing() {
        let err = RelaySettings::default().validate().unwrap_err();
        let ConfigError::Missing(missing) = err else {
            panic!("expected missing variables, got {err:?}");
        };
        assert_eq!(missing.len(), 7);
    }

    #[test]
    fn rejects_bad_timeout() {
        for raw in ["0", "-5", "ten", "1.5"] {
            let mut vars = full();
            vars.insert(env::GATEWAY_TIMEOUT_SECONDS, raw);
            let err = settings(&vars).validate().unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { variable, .. } if variable == env::GATEWAY_TIMEOUT_SECONDS),
                "{raw} accepted"
            );
        }
    }

    #[test]
    fn rejects_non_websocket_gateway() {
        let mut vars = full();
        vars.insert(env::GATEWAY_URL, "https://gw.example.com/v0/events");
        let err = settings(&vars).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { variable, .. } if variable == env::GATEWAY_URL));
    }

    #[test]
    fn rejects_non_http_store() {
        let mut vars = full();
        vars.insert(env::STORE_ENDPOINT, "cloud.example.com");
        let err = settings(&vars).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { variable, .. } if variable == env::STORE_ENDPOINT));
    }

    #[test]
    fn debug_redacts_keys() {
        let debug = format!("{:?}", settings(&full()));
        assert!(!debug.contains("store-secret"));
        assert!(!debug.contains("gw-secret"));
    }
}
