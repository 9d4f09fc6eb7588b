//! Prometheus metrics for schema validation
//!
//! - `redis_schema_validations_total` (counter) - validations by message and result
//! - `redis_schema_violations_total` (counter) - violations by message and reason
//! - `redis_schema_validation_duration_seconds` (histogram) - time spent per message
//!
//! # Example
//!
//! ```rust
//! use redis_schema_core::telemetry::ValidationMetricsRegistry;
//! use redis_schema_core::{InstanceDraft, SchemaValidator};
//!
//! let registry = ValidationMetricsRegistry::new().unwrap();
//! let validator = SchemaValidator::new().with_metrics(registry.validation().clone());
//!
//! let _ = validator.validate_instance(&InstanceDraft::new());
//! assert!(registry.encode_text().unwrap().contains("redis_schema_validations_total"));
//! ```

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry};
use std::sync::Arc;
use thiserror::Error;

use crate::error::FieldViolation;

/// Telemetry errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Metrics error: {0}")]
    MetricsError(#[from] prometheus::Error),

    #[error("Failed to encode metrics: {0}")]
    EncodingFailed(String),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Validation counters
///
/// Cloning is cheap; clones update the same underlying series.
#[derive(Clone)]
pub struct ValidationMetrics {
    /// Validations by message kind and result
    validations_total: CounterVec,

    /// Violations by message kind and reason
    violations_total: CounterVec,

    /// Validation duration by message kind
    duration_seconds: HistogramVec,
}

impl ValidationMetrics {
    /// Create the metrics and register them with `registry`
    pub fn new(registry: &Registry) -> Result<Self> {
        let validations_total = CounterVec::new(
            Opts::new("validations_total", "Total number of schema validations")
                .namespace("redis_schema"),
            &["message", "result"],
        )?;

        let violations_total = CounterVec::new(
            Opts::new("violations_total", "Total number of field violations reported")
                .namespace("redis_schema"),
            &["message", "reason"],
        )?;

        let duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "validation_duration_seconds",
                "Schema validation duration in seconds",
            )
            .namespace("redis_schema")
            .buckets(vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01]),
            &["message"],
        )?;

        registry.register(Box::new(validations_total.clone()))?;
        registry.register(Box::new(violations_total.clone()))?;
        registry.register(Box::new(duration_seconds.clone()))?;

        Ok(Self {
            validations_total,
            violations_total,
            duration_seconds,
        })
    }

    /// Record one validation outcome
    pub fn record_validation(&self, message: &str, valid: bool) {
        let result = if valid { "valid" } else { "invalid" };
        self.validations_total
            .with_label_values(&[message, result])
            .inc();
    }

    /// Record every violation of a rejected value
    pub fn record_violations(&self, message: &str, violations: &[FieldViolation]) {
        for violation in violations {
            self.violations_total
                .with_label_values(&[message, violation.reason.as_str()])
                .inc();
        }
    }

    pub fn observe_duration(&self, message: &str, duration_secs: f64) {
        self.duration_seconds
            .with_label_values(&[message])
            .observe(duration_secs);
    }

    /// Current value of the validation counter
    pub fn validation_count(&self, message: &str, valid: bool) -> u64 {
        let result = if valid { "valid" } else { "invalid" };
        self.validations_total
            .with_label_values(&[message, result])
            .get() as u64
    }

    /// Current value of the violation counter
    pub fn violation_count(&self, message: &str, reason: &str) -> u64 {
        self.violations_total
            .with_label_values(&[message, reason])
            .get() as u64
    }
}

/// Registry owning the validation metrics
pub struct ValidationMetricsRegistry {
    registry: Arc<Registry>,
    validation: ValidationMetrics,
}

impl ValidationMetricsRegistry {
    /// Create a new metrics registry
    pub fn new() -> Result<Self> {
        Self::with_registry(Arc::new(Registry::new()))
    }

    /// Register into an existing Prometheus registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let validation = ValidationMetrics::new(&registry)?;
        Ok(Self {
            registry,
            validation,
        })
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    pub fn validation(&self) -> &ValidationMetrics {
        &self.validation
    }

    /// Gather all metrics in Prometheus format
    pub fn gather(&self) -> Vec<prometheus::proto::MetricFamily> {
        self.registry.gather()
    }

    /// Encode metrics as text for scraping
    pub fn encode_text(&self) -> Result<String> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.gather(), &mut buffer)
            .map_err(|e| TelemetryError::EncodingFailed(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::EncodingFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_metrics() -> ValidationMetrics {
        ValidationMetrics::new(&Registry::new()).unwrap()
    }

    #[test]
    fn test_record_validation() {
        let metrics = create_test_metrics();
        metrics.record_validation("Instance", true);
        metrics.record_validation("Instance", false);
        metrics.record_validation("Instance", false);

        assert_eq!(metrics.validation_count("Instance", true), 1);
        assert_eq!(metrics.validation_count("Instance", false), 2);
        assert_eq!(metrics.validation_count("UpdateMask", true), 0);
    }

    #[test]
    fn test_record_violations_by_reason() {
        let metrics = create_test_metrics();
        metrics.record_violations(
            "Instance",
            &[
                FieldViolation::missing("tier"),
                FieldViolation::missing("memorySizeGb"),
                FieldViolation::constraint("port", "out of range"),
            ],
        );
        assert_eq!(metrics.violation_count("Instance", "MISSING_REQUIRED"), 2);
        assert_eq!(metrics.violation_count("Instance", "CONSTRAINT_VIOLATION"), 1);
    }

    #[test]
    fn test_clones_share_series() {
        let metrics = create_test_metrics();
        let clone = metrics.clone();
        clone.record_validation("ResourceName", true);
        assert_eq!(metrics.validation_count("ResourceName", true), 1);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let registry = Arc::new(Registry::new());
        ValidationMetricsRegistry::with_registry(Arc::clone(&registry)).unwrap();
        assert!(matches!(
            ValidationMetricsRegistry::with_registry(registry),
            Err(TelemetryError::MetricsError(_))
        ));
    }

    #[test]
    fn test_encode_text() {
        let registry = ValidationMetricsRegistry::new().unwrap();
        registry.validation().record_validation("Instance", true);
        registry.validation().observe_duration("Instance", 0.0001);

        let text = registry.encode_text().unwrap();
        assert!(text.contains("redis_schema_validations_total"));
        assert!(text.contains("redis_schema_validation_duration_seconds"));
    }
}
