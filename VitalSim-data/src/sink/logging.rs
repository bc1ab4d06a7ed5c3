use async_trait::async_trait;
use tracing::info;

use super::errors::SinkError;
use super::point::MetricPoint;
use super::MetricsSink;

/// Sink that only logs the encoded lines, used for dry runs
#[derive(Debug, Clone, Default)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MetricsSink for LogSink {
    async fn write(&self, points: &[MetricPoint]) -> Result<(), SinkError> {
        for point in points {
            info!(target: "vital_sim::dry_run", "{}", point.to_line_protocol()?);
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "log output (dry run)".to_string()
    }
}
