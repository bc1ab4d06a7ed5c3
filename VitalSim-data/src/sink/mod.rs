// Metrics sink module structure
pub mod errors;
pub mod point;
mod in_memory;
mod influx;
mod logging;

use async_trait::async_trait;

// Re-export commonly used types
pub use errors::SinkError;
pub use in_memory::InMemorySink;
pub use influx::{InfluxConfig, InfluxSink};
pub use logging::LogSink;
pub use point::{FieldValue, MetricPoint};

/// Destination for batches of tagged, timestamped numeric records
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// Write one batch of points; an empty batch is a no-op
    async fn write(&self, points: &[MetricPoint]) -> Result<(), SinkError>;

    /// Short description of where points end up, for startup logging
    fn describe(&self) -> String;
}

#[async_trait]
impl<S: MetricsSink + ?Sized> MetricsSink for Box<S> {
    async fn write(&self, points: &[MetricPoint]) -> Result<(), SinkError> {
        (**self).write(points).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
