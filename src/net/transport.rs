//! Upstream transport policy.
//!
//! # Responsibilities
//! - Convert configured timeouts (seconds) into the units the client uses
//! - Carry the insecure-trust flag to the upstream client
//! - Build the forwarding `reqwest::Client`
//!
//! # Design Decisions
//! - Connect timeout is held in milliseconds; response timeout as a Duration
//! - A zero timeout means "no timeout", not "fail immediately"

use std::time::Duration;

use crate::config::validation::ConfigurationError;
use crate::config::GatewayConfig;
use crate::net::cors::CorsPolicy;

/// Derived transport settings. Pure function of configuration scalars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportPolicy {
    connect_timeout_ms: Option<u64>,
    response_timeout: Option<Duration>,
    trust_insecure_certs: bool,
    cors: CorsPolicy,
}

impl TransportPolicy {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigurationError> {
        let cors = CorsPolicy::from_config(config)?;
        let connect_timeout_ms = match config.connection_timeout {
            0 => None,
            secs => Some(secs.saturating_mul(1000)),
        };
        let response_timeout = match config.response_timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        tracing::info!(
            connection_timeout_secs = config.connection_timeout,
            response_timeout_secs = config.response_timeout,
            trust_insecure_ssl = config.trust_insecure_ssl,
            "Transport policy derived"
        );

        Ok(Self {
            connect_timeout_ms,
            response_timeout,
            trust_insecure_certs: config.trust_insecure_ssl,
            cors,
        })
    }

    /// Connect timeout in milliseconds.
    pub fn connect_timeout_millis(&self) -> Option<u64> {
        self.connect_timeout_ms
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    pub fn response_timeout(&self) -> Option<Duration> {
        self.response_timeout
    }

    pub fn trust_insecure_certs(&self) -> bool {
        self.trust_insecure_certs
    }

    pub fn cors(&self) -> &CorsPolicy {
        &self.cors
    }

    /// Build the upstream HTTP client.
    pub fn build_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(self.trust_insecure_certs)
            .redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = self.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = self.response_timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversion() {
        let config = GatewayConfig {
            connection_timeout: 5,
            response_timeout: 10,
            trust_insecure_ssl: false,
            ..Default::default()
        };
        let policy = TransportPolicy::from_config(&config).unwrap();
        assert_eq!(policy.connect_timeout_millis(), Some(5000));
        assert_eq!(policy.connect_timeout(), Some(Duration::from_millis(5000)));
        assert_eq!(policy.response_timeout(), Some(Duration::from_secs(10)));
        assert!(!policy.trust_insecure_certs());
    }

    #[test]
    fn test_zero_means_unset() {
        let policy = TransportPolicy::from_config(&GatewayConfig::default()).unwrap();
        assert_eq!(policy.connect_timeout_millis(), None);
        assert_eq!(policy.response_timeout(), None);
        assert!(policy.trust_insecure_certs());
    }

    #[test]
    fn test_huge_timeout_saturates() {
        let config = GatewayConfig {
            connection_timeout: u64::MAX,
            ..Default::default()
        };
        let policy = TransportPolicy::from_config(&config).unwrap();
        assert_eq!(policy.connect_timeout_millis(), Some(u64::MAX));
    }

    #[test]
    fn test_build_client() {
        let config = GatewayConfig {
            connection_timeout: 1,
            response_timeout: 2,
            ..Default::default()
        };
        assert!(TransportPolicy::from_config(&config).unwrap().build_client().is_ok());
    }
}
