//! HTTP transport settings for the CloudStack API client

use std::time::Duration;

/// Connection pool and timeout settings for the shared HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub max_idle_connections: usize,
    pub idle_timeout: Duration,
    pub connection_timeout: Duration,
    pub request_timeout: Duration,
    pub tcp_keepalive: Option<Duration>,
    pub cookie_store: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_idle_connections: 10,
            idle_timeout: Duration::from_secs(90),
            connection_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(60),
            tcp_keepalive: Some(Duration::from_secs(30)),
            cookie_store: true,
        }
    }
}

impl TransportConfig {
    pub fn build_client(&self, verify_ssl: bool) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(!verify_ssl)
            .cookie_store(self.cookie_store)
            .timeout(self.request_timeout)
            .connect_timeout(self.connection_timeout)
            .pool_idle_timeout(self.idle_timeout)
            .pool_max_idle_per_host(self.max_idle_connections);

        if let Some(keepalive) = self.tcp_keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_transport_config() {
        let config = TransportConfig::default();
        assert_eq!(config.max_idle_connections, 10);
        assert_eq!(config.idle_timeout.as_secs(), 90);
        assert_eq!(config.connection_timeout.as_secs(), 30);
        assert_eq!(config.request_timeout.as_secs(), 60);
        assert_eq!(config.tcp_keepalive.unwrap().as_secs(), 30);
        assert!(config.cookie_store);
    }

    #[test]
    fn builds_clients_with_and_without_verification() {
        let config = TransportConfig {
            tcp_keepalive: None,
            ..Default::default()
        };
        assert!(config.build_client(true).is_ok());
        assert!(config.build_client(false).is_ok());
    }
}
