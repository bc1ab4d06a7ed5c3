use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::errors::SinkError;
use super::point::MetricPoint;
use super::MetricsSink;

/// In-memory sink keeping every written batch
///
/// Clones share the same storage, so a test can hand one clone to the
/// scheduler and inspect the other.
#[derive(Debug, Clone)]
pub struct InMemorySink {
    /// Written batches, in write order
    batches: Arc<Mutex<Vec<Vec<MetricPoint>>>>,
}

impl Default for InMemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySink {
    /// Create a new in-memory sink
    pub fn new() -> Self {
        Self {
            batches: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// All batches written so far
    pub fn batches(&self) -> Result<Vec<Vec<MetricPoint>>, SinkError> {
        let store = self.batches.lock()?;
        Ok(store.clone())
    }

    /// All points written so far, flattened across batches
    pub fn points(&self) -> Result<Vec<MetricPoint>, SinkError> {
        let store = self.batches.lock()?;
        Ok(store.iter().flatten().cloned().collect())
    }

    /// Number of batches written so far
    pub fn batch_count(&self) -> Result<usize, SinkError> {
        let store = self.batches.lock()?;
        Ok(store.len())
    }

    /// Drop everything stored
    pub fn clear(&self) -> Result<(), SinkError> {
        let mut store = self.batches.lock()?;
        store.clear();
        Ok(())
    }
}

#[async_trait]
impl MetricsSink for InMemorySink {
    async fn write(&self, points: &[MetricPoint]) -> Result<(), SinkError> {
        if points.is_empty() {
            return Ok(());
        }

        // Reject what a real store would reject
        for point in points {
            point.to_line_protocol()?;
        }

        let mut store = self.batches.lock()?;
        store.push(points.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory store".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_batches_are_kept_in_order() {
        let sink = InMemorySink::new();
        let handle = sink.clone();

        sink.write(&[MetricPoint::new("m").field("v", 1i64)]).await.unwrap();
        sink.write(&[]).await.unwrap();
        sink.write(&[
            MetricPoint::new("m").field("v", 2i64),
            MetricPoint::new("m").field("v", 3i64),
        ])
        .await
        .unwrap();

        assert_eq!(handle.batch_count().unwrap(), 2);
        let values: Vec<_> = handle
            .points()
            .unwrap()
            .into_iter()
            .map(|p| p.fields["v"].clone())
            .collect();
        assert_eq!(values.len(), 3);

        handle.clear().unwrap();
        assert_eq!(sink.batch_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_point_not_stored() {
        let sink = InMemorySink::new();
        let result = sink.write(&[MetricPoint::new("m")]).await;
        assert!(matches!(result, Err(SinkError::InvalidPoint(_))));
        assert!(sink.batches().unwrap().is_empty());
    }
}
