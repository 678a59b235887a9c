//! Description of one reconciliation run

use crate::config::{EngineConfig, TallyConfig};
use crate::domain::{Location, Result, TallyError};
use std::time::Duration;

/// Default rows per batch
pub const DEFAULT_BATCH_SIZE: usize = 100_000;

/// Default comparison worker pool size
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Default source field delimiter
pub const DEFAULT_DELIMITER: u8 = b'|';

/// Inputs and tuning for a single run
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonJob {
    source: Location,
    target: Location,
    delimiter: u8,
    batch_size: usize,
    worker_count: usize,
    run_timeout: Option<Duration>,
}

impl ComparisonJob {
    /// Create a job with default tuning
    pub fn new(source: Location, target: Location) -> Self {
        Self {
            source,
            target,
            delimiter: DEFAULT_DELIMITER,
            batch_size: DEFAULT_BATCH_SIZE,
            worker_count: DEFAULT_WORKER_COUNT,
            run_timeout: None,
        }
    }

    /// Create a job for two locations with tuning from `[engine]`
    pub fn with_engine(source: Location, target: Location, engine: &EngineConfig) -> Result<Self> {
        let delimiter = engine
            .delimiter_byte()
            .map_err(TallyError::Configuration)?;
        Ok(Self::new(source, target)
            .with_delimiter(delimiter)
            .with_batch_size(engine.batch_size)
            .with_worker_count(engine.worker_count)
            .with_run_timeout(engine.run_timeout_secs.map(Duration::from_secs)))
    }

    /// Create a job from the `[source]`, `[target]` and `[engine]` sections
    ///
    /// # Errors
    ///
    /// Returns [`TallyError::Configuration`] when either input is not configured.
    pub fn from_config(config: &TallyConfig) -> Result<Self> {
        let source = config
            .source
            .as_ref()
            .ok_or_else(|| TallyError::Configuration("No [source] configured".to_string()))?
            .location()
            .map_err(TallyError::Configuration)?;
        let target = config
            .target
            .as_ref()
            .ok_or_else(|| TallyError::Configuration("No [target] configured".to_string()))?
            .location()
            .map_err(TallyError::Configuration)?;
        Self::with_engine(source, target, &config.engine)
    }

    /// Set the source field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set rows per batch; zero is raised to one
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set the worker pool size; zero is raised to one
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count.max(1);
        self
    }

    /// Stop submitting batch pairs once this much time has passed
    pub fn with_run_timeout(mut self, run_timeout: Option<Duration>) -> Self {
        self.run_timeout = run_timeout;
        self
    }

    pub fn source(&self) -> &Location {
        &self.source
    }

    pub fn target(&self) -> &Location {
        &self.target
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputConfig;

    fn location(raw: &str) -> Location {
        raw.parse().unwrap()
    }

    #[test]
    fn test_defaults() {
        let job = ComparisonJob::new(location("b/s.txt"), location("b/t.json"));
        assert_eq!(job.delimiter(), b'|');
        assert_eq!(job.batch_size(), 100_000);
        assert_eq!(job.worker_count(), 4);
        assert!(job.run_timeout().is_none());
    }

    #[test]
    fn test_zero_tuning_is_clamped() {
        let job = ComparisonJob::new(location("b/s.txt"), location("b/t.json"))
            .with_batch_size(0)
            .with_worker_count(0);
        assert_eq!(job.batch_size(), 1);
        assert_eq!(job.worker_count(), 1);
    }

    #[test]
    fn test_from_config() {
        let mut config = TallyConfig {
            source: Some(InputConfig {
                bucket: "landing".to_string(),
                path: "org1/source.txt".to_string(),
            }),
            target: Some(InputConfig {
                bucket: "landing".to_string(),
                path: "org1/target.json".to_string(),
            }),
            ..TallyConfig::default()
        };
        config.engine.batch_size = 10;
        config.engine.delimiter = ",".to_string();
        config.engine.run_timeout_secs = Some(5);

        let job = ComparisonJob::from_config(&config).unwrap();
        assert_eq!(job.source().to_string(), "landing/org1/source.txt");
        assert_eq!(job.target().to_string(), "landing/org1/target.json");
        assert_eq!(job.batch_size(), 10);
        assert_eq!(job.delimiter(), b',');
        assert_eq!(job.run_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_from_config_requires_inputs() {
        let config = TallyConfig::default();
        assert!(matches!(
            ComparisonJob::from_config(&config),
            Err(TallyError::Configuration(_))
        ));
    }
}
