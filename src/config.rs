//! Runtime configuration for the playground library and its HTTP server.

use crate::error::{PlaygroundError, Result};
use crate::points::BaseFunction;
use crate::trainer::PredictionGrid;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TRAIN_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_BODY_BYTES: usize = 1 << 20;
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Settings of the `playground-server` binary, read from the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub train_timeout: Duration,
    /// Seeds the RNG when set, so sessions are reproducible.
    pub seed: Option<u64>,
    pub max_body_bytes: usize,
    /// Budget for receiving one request head and body.
    pub read_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            train_timeout: Duration::from_secs(DEFAULT_TRAIN_TIMEOUT_SECS),
            seed: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
        }
    }
}

impl ServerConfig {
    /// Reads `HOST`, `PORT`, `PLAYGROUND_TRAIN_TIMEOUT_SECS`, `PLAYGROUND_SEED`,
    /// `PLAYGROUND_MAX_BODY_BYTES` and `PLAYGROUND_READ_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let timeout_secs: u64 = parse_var(&lookup, "PLAYGROUND_TRAIN_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_TRAIN_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(PlaygroundError::Configuration(
                "PLAYGROUND_TRAIN_TIMEOUT_SECS must be positive".to_string(),
            ));
        }
        let read_timeout_secs: u64 = parse_var(&lookup, "PLAYGROUND_READ_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_READ_TIMEOUT_SECS);
        if read_timeout_secs == 0 {
            return Err(PlaygroundError::Configuration(
                "PLAYGROUND_READ_TIMEOUT_SECS must be positive".to_string(),
            ));
        }

        Ok(Self {
            host: lookup("HOST")
                .filter(|h| !h.trim().is_empty())
                .unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT")?.unwrap_or(defaults.port),
            train_timeout: Duration::from_secs(timeout_secs),
            seed: parse_var(&lookup, "PLAYGROUND_SEED")?,
            max_body_bytes: parse_var(&lookup, "PLAYGROUND_MAX_BODY_BYTES")?
                .unwrap_or(defaults.max_body_bytes),
            read_timeout: Duration::from_secs(read_timeout_secs),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|e| {
            PlaygroundError::Configuration(format!("{key}={raw:?} is not valid: {e}"))
        }),
    }
}

/// Library-level knobs of a [`Playground`](crate::service::Playground).
#[derive(Clone, Debug, PartialEq)]
pub struct PlaygroundConfig {
    pub initial_points: usize,
    pub initial_noise: f64,
    pub base_function: BaseFunction,
    pub grid: PredictionGrid,
    /// Lambda of the L1/L2 penalty.
    pub regularization_strength: f64,
    pub validation_fraction: f64,
    pub max_degree: usize,
    pub max_points: usize,
    /// `None` lets training run to completion.
    pub train_timeout: Option<Duration>,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            initial_points: 100,
            initial_noise: 0.5,
            base_function: BaseFunction::default(),
            grid: PredictionGrid::default(),
            regularization_strength: 0.1,
            validation_fraction: 0.2,
            max_degree: 20,
            max_points: 100_000,
            train_timeout: Some(Duration::from_secs(DEFAULT_TRAIN_TIMEOUT_SECS)),
        }
    }
}

impl PlaygroundConfig {
    pub fn with_train_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.train_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let cfg = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, ServerConfig::default());
        assert_eq!(cfg.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_reads_all_variables() {
        let cfg = ServerConfig::from_lookup(lookup(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("PLAYGROUND_TRAIN_TIMEOUT_SECS", "5"),
            ("PLAYGROUND_SEED", "42"),
            ("PLAYGROUND_MAX_BODY_BYTES", "2048"),
            ("PLAYGROUND_READ_TIMEOUT_SECS", "7"),
        ]))
        .unwrap();
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8080");
        assert_eq!(cfg.train_timeout, Duration::from_secs(5));
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.max_body_bytes, 2048);
        assert_eq!(cfg.read_timeout, Duration::from_secs(7));
    }

    #[test]
    fn test_malformed_values_are_configuration_errors() {
        for vars in [
            [("PORT", "http")],
            [("PORT", "70000")],
            [("PLAYGROUND_SEED", "-1")],
            [("PLAYGROUND_TRAIN_TIMEOUT_SECS", "0")],
            [("PLAYGROUND_READ_TIMEOUT_SECS", "0")],
        ] {
            let err = ServerConfig::from_lookup(lookup(&vars)).unwrap_err();
            assert!(matches!(err, PlaygroundError::Configuration(_)), "{vars:?}");
        }
    }

    #[test]
    fn test_playground_defaults() {
        let cfg = PlaygroundConfig::default();
        assert_eq!(cfg.initial_points, 100);
        assert_eq!(cfg.initial_noise, 0.5);
        assert_eq!(cfg.regularization_strength, 0.1);
        assert_eq!(cfg.max_degree, 20);
        assert!(cfg.with_train_timeout(None).train_timeout.is_none());
    }
}
