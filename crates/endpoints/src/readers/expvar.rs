//! ExpvarReader - polls an expvar-style JSON endpoint over HTTP

use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tracing::debug;

use contracts::{ContractError, CorrelationToken, ReadResult, Reader, ReaderConfig};

use crate::backoff::BackoffGate;

/// HTTP reader for expvar-style endpoints (e.g. Go's `/debug/vars`)
///
/// Connection-class failures (refused, reset, timed out) count strikes
/// against the backoff gate; any success clears them. HTTP error statuses are
/// plain read errors and do not count.
pub struct ExpvarReader {
    name: String,
    url: String,
    interval: Duration,
    timeout: Duration,
    backoff: BackoffGate,
    client: reqwest::Client,
}

impl ExpvarReader {
    pub fn new(config: &ReaderConfig) -> Result<Self, ContractError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ContractError::config_validation(&config.name, e.to_string()))?;

        Ok(Self {
            name: config.name.clone(),
            url: config.url.clone(),
            interval: config.interval(),
            timeout: config.timeout(),
            backoff: BackoffGate::new(&config.name, config.backoff_threshold),
            client,
        })
    }

    fn is_connection_class(e: &reqwest::Error) -> bool {
        e.is_connect() || e.is_timeout()
    }

    async fn fetch(&self) -> Result<bytes::Bytes, ContractError> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if Self::is_connection_class(&e) {
                let strikes = self.backoff.strike();
                debug!(reader = %self.name, strikes, "connection failure");
            }
            ContractError::read(&self.name, e.to_string())
        })?;

        let response = response
            .error_for_status()
            .map_err(|e| ContractError::read(&self.name, e.to_string()))?;

        let payload = response
            .bytes()
            .await
            .map_err(|e| ContractError::read(&self.name, e.to_string()))?;

        self.backoff.reset();
        Ok(payload)
    }
}

#[async_trait]
impl Reader for ExpvarReader {
    async fn ping(&self) -> Result<(), ContractError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ContractError::ping(&self.name, e.to_string()))?;

        response
            .error_for_status()
            .map_err(|e| ContractError::ping(&self.name, e.to_string()))?;
        Ok(())
    }

    async fn read(&self, token: CorrelationToken) -> Result<ReadResult, ContractError> {
        self.backoff.check()?;

        let payload = self.fetch().await?;

        Ok(ReadResult {
            token,
            reader: self.name.clone(),
            payload,
            issued_at: SystemTime::now(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> ReaderConfig {
        ReaderConfig {
            name: "app".to_string(),
            url: url.to_string(),
            interval_secs: 0.01,
            timeout_secs: 0.2,
            backoff_threshold: 2,
        }
    }

    #[tokio::test]
    async fn test_connection_refused_strikes_until_retirement() {
        // Port 1 is never listening.
        let reader = ExpvarReader::new(&config("http://127.0.0.1:1/debug/vars")).unwrap();

        for _ in 0..2 {
            let err = reader
                .read(CorrelationToken::mint(Duration::from_secs(1)))
                .await
                .unwrap_err();
            assert!(matches!(err, ContractError::Read { .. }));
        }

        let err = reader
            .read(CorrelationToken::mint(Duration::from_secs(1)))
            .await
            .unwrap_err();
        assert!(err.is_backoff_exceeded());
    }

    #[tokio::test]
    async fn test_ping_failure_names_endpoint() {
        let reader = ExpvarReader::new(&config("http://127.0.0.1:1/debug/vars")).unwrap();
        let err = reader.ping().await.unwrap_err();
        assert!(matches!(err, ContractError::Ping { endpoint, .. } if endpoint == "app"));
    }
}
