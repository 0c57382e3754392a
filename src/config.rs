//! Service configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::{ProfilingError, Result};

/// Options for the profiling service.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfilingOptions {
    /// Gates entry from `Uninitialised` to `NotConnected`. Default: false.
    #[serde(default)]
    pub enable_profiling: bool,

    /// Send buffer capacity in bytes. Default: 4096.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    /// How long a single inbound read blocks in the ingress loop.
    /// Default: 100ms.
    #[serde(default = "default_read_timeout", with = "humantime_serde")]
    pub read_timeout: Duration,
}

fn default_buffer_capacity() -> usize {
    4096
}

fn default_read_timeout() -> Duration {
    Duration::from_millis(100)
}

impl Default for ProfilingOptions {
    fn default() -> Self {
        Self {
            enable_profiling: false,
            buffer_capacity: default_buffer_capacity(),
            read_timeout: default_read_timeout(),
        }
    }
}

impl ProfilingOptions {
    /// Loads options from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| ProfilingError::Config {
            reason: format!("reading {}: {e}", path.display()),
        })?;

        let options: ProfilingOptions =
            serde_yaml_ng::from_str(&data).map_err(|e| ProfilingError::Config {
                reason: format!("parsing {}: {e}", path.display()),
            })?;

        options.validate()?;
        Ok(options)
    }

    /// Validates field consistency.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(ProfilingError::Config {
                reason: "buffer_capacity must be positive".to_string(),
            });
        }
        if self.read_timeout.is_zero() {
            return Err(ProfilingError::Config {
                reason: "read_timeout must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ProfilingOptions::default();
        assert!(!options.enable_profiling);
        assert_eq!(options.buffer_capacity, 4096);
        assert_eq!(options.read_timeout, Duration::from_millis(100));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn yaml_fields_override_defaults() {
        let options: ProfilingOptions = serde_yaml_ng::from_str(
            "enable_profiling: true\nbuffer_capacity: 512\nread_timeout: 250ms\n",
        )
        .expect("valid yaml");

        assert!(options.enable_profiling);
        assert_eq!(options.buffer_capacity, 512);
        assert_eq!(options.read_timeout, Duration::from_millis(250));
    }

    #[test]
    fn empty_yaml_yields_defaults() {
        let options: ProfilingOptions = serde_yaml_ng::from_str("{}").expect("valid yaml");
        assert!(!options.enable_profiling);
        assert_eq!(options.buffer_capacity, 4096);
    }

    #[test]
    fn zero_capacity_fails_validation() {
        let options = ProfilingOptions {
            buffer_capacity: 0,
            ..Default::default()
        };
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("buffer_capacity"));
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let options = ProfilingOptions {
            read_timeout: Duration::ZERO,
            ..Default::default()
        };
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("read_timeout"));
    }
}
