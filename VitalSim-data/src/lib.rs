// VitalSim Data
// This crate handles delivery of simulated readings to external metrics stores

// Metric records, line protocol and sink implementations
pub mod sink;

// Re-export commonly used types
pub use sink::{FieldValue, InMemorySink, InfluxConfig, InfluxSink, LogSink, MetricPoint, MetricsSink, SinkError};
