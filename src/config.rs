//! Configuration loading for robot streaming sessions

use serde::{Deserialize, Serialize};
use std::fs;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    Abb,
    Ur,
    Kuka,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RobotConfig {
    pub host: String,
    pub port: u16,
    pub vendor: Vendor,
    pub buffer: Option<BufferConfig>,
    pub connection: Option<ConnectionConfig>,
}

/// Credit window for the streaming sender.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BufferConfig {
    pub max_stream_count: Option<usize>,
    pub send_new_batch_on: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionConfig {
    pub poll_interval_ms: Option<u64>,
    pub handshake_timeout_seconds: Option<u64>,
}

impl RobotConfig {
    pub fn load(config_path: &str) -> Result<Self> {
        let contents = fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", config_path, e)))?;

        let config: RobotConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn new(host: &str, port: u16, vendor: Vendor) -> Self {
        Self {
            host: host.to_string(),
            port,
            vendor,
            buffer: None,
            connection: None,
        }
    }

    /// Both window thresholds must be positive and the refill mark must
    /// sit strictly below the window size, or the sender could deadlock.
    pub fn validate(&self) -> Result<()> {
        let buffer = self.buffer();
        let max = buffer.max_stream_count();
        let refill = buffer.send_new_batch_on();
        if max == 0 {
            return Err(Error::Config("max_stream_count must be at least 1".into()));
        }
        if refill == 0 || refill >= max {
            return Err(Error::Config(format!(
                "send_new_batch_on must be in 1..{} (got {})",
                max, refill
            )));
        }
        Ok(())
    }

    /// Get buffer configuration with defaults
    pub fn buffer(&self) -> BufferConfig {
        self.buffer.clone().unwrap_or_default()
    }

    /// Get connection configuration with defaults
    pub fn connection(&self) -> ConnectionConfig {
        self.connection.clone().unwrap_or_default()
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            max_stream_count: Some(10),
            send_new_batch_on: Some(2),
        }
    }
}

impl BufferConfig {
    /// Get maximum unacknowledged actions with default fallback
    pub fn max_stream_count(&self) -> usize {
        self.max_stream_count.unwrap_or(10)
    }

    /// Get refill threshold with default fallback
    pub fn send_new_batch_on(&self) -> usize {
        self.send_new_batch_on.unwrap_or(2)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: Some(30),
            handshake_timeout_seconds: Some(10),
        }
    }
}

impl ConnectionConfig {
    /// Get worker poll interval with default fallback
    pub fn poll_interval_ms(&self) -> u64 {
        self.poll_interval_ms.unwrap_or(30)
    }

    /// Get handshake timeout with default fallback
    pub fn handshake_timeout(&self) -> u64 {
        self.handshake_timeout_seconds.unwrap_or(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_yaml() {
        let yaml = "host: 192.168.0.10\nport: 7000\nvendor: abb\n";
        let config: RobotConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.vendor, Vendor::Abb);
        assert_eq!(config.buffer().max_stream_count(), 10);
        assert_eq!(config.connection().poll_interval_ms(), 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_window() {
        let mut config = RobotConfig::new("localhost", 7000, Vendor::Ur);
        config.buffer = Some(BufferConfig {
            max_stream_count: Some(2),
            send_new_batch_on: Some(5),
        });
        assert!(config.validate().is_err());
    }
}
