//! InfluxDB v2 sink
//!
//! Points are posted as line protocol to `/api/v2/write` with nanosecond
//! precision, authenticated with an API token.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use tracing::{debug, info};

use super::errors::SinkError;
use super::point::{encode_batch, MetricPoint};
use super::MetricsSink;

/// InfluxDB connection settings
#[derive(Debug, Clone, PartialEq)]
pub struct InfluxConfig {
    /// Base URL of the InfluxDB server
    pub url: String,
    /// API token with write access to the bucket
    pub token: String,
    /// Organization name or id
    pub org: String,
    /// Bucket the points are written to
    pub bucket: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8086".to_string(),
            token: "mytoken".to_string(),
            org: "myorg".to_string(),
            bucket: "patients".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl InfluxConfig {
    /// Create a configuration from `INFLUXDB_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create a configuration from an arbitrary variable lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let url = lookup("INFLUXDB_URL").unwrap_or(defaults.url);
        let token = lookup("INFLUXDB_TOKEN").unwrap_or(defaults.token);
        let org = lookup("INFLUXDB_ORG").unwrap_or(defaults.org);
        let bucket = lookup("INFLUXDB_BUCKET").unwrap_or(defaults.bucket);

        let timeout_seconds = lookup("INFLUXDB_TIMEOUT_SECONDS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.timeout_seconds);

        Self {
            url,
            token,
            org,
            bucket,
            timeout_seconds,
        }
    }

    /// Full URL of the write endpoint, without query parameters
    pub fn write_endpoint(&self) -> String {
        format!("{}/api/v2/write", self.url.trim_end_matches('/'))
    }

    fn validate(&self) -> Result<(), SinkError> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(SinkError::Config(format!(
                "INFLUXDB_URL must start with http:// or https://, got '{}'",
                self.url
            )));
        }
        if self.org.is_empty() || self.bucket.is_empty() {
            return Err(SinkError::Config("organization and bucket must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Sink writing batches to an InfluxDB v2 bucket
#[derive(Debug, Clone)]
pub struct InfluxSink {
    client: Client,
    config: InfluxConfig,
}

impl InfluxSink {
    /// Create a sink; no connection is made until the first write
    pub fn new(config: InfluxConfig) -> Result<Self, SinkError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        info!(
            "InfluxDB sink configured: url={}, org={}, bucket={}",
            config.url, config.org, config.bucket
        );

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &InfluxConfig {
        &self.config
    }
}

#[async_trait]
impl MetricsSink for InfluxSink {
    async fn write(&self, points: &[MetricPoint]) -> Result<(), SinkError> {
        if points.is_empty() {
            return Ok(());
        }

        let body = encode_batch(points)?;
        debug!("Writing {} points to bucket '{}'", points.len(), self.config.bucket);

        let response = self
            .client
            .post(self.config.write_endpoint())
            .query(&[
                ("org", self.config.org.as_str()),
                ("bucket", self.config.bucket.as_str()),
                ("precision", "ns"),
            ])
            .header(AUTHORIZATION, format!("Token {}", self.config.token))
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("InfluxDB rejected write with status {}: {}", status, body);
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    fn describe(&self) -> String {
        format!(
            "InfluxDB {} (org '{}', bucket '{}')",
            self.config.url, self.config.org, self.config.bucket
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> InfluxConfig {
        InfluxConfig {
            url: server.uri(),
            token: "secret-token".to_string(),
            org: "ward".to_string(),
            bucket: "icu".to_string(),
            timeout_seconds: 5,
        }
    }

    fn sample_points() -> Vec<MetricPoint> {
        vec![
            MetricPoint::new("patient_vitals").tag("patient_id", "P001").field("pulse", 90u16),
            MetricPoint::new("patient_vitals").tag("patient_id", "P002").field("pulse", 60u16),
        ]
    }

    #[test]
    fn test_config_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("INFLUXDB_URL", "https://influx.example.org/"),
            ("INFLUXDB_BUCKET", "ward7"),
            ("INFLUXDB_TIMEOUT_SECONDS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let config = InfluxConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.url, "https://influx.example.org/");
        assert_eq!(config.bucket, "ward7");
        assert_eq!(config.org, "myorg");
        assert_eq!(config.token, "mytoken");
        assert_eq!(config.timeout_seconds, 10);
        assert_eq!(config.write_endpoint(), "https://influx.example.org/api/v2/write");
    }

    #[test]
    fn test_invalid_url_rejected() {
        let config = InfluxConfig {
            url: "localhost:8086".to_string(),
            ..InfluxConfig::default()
        };
        assert!(matches!(InfluxSink::new(config), Err(SinkError::Config(_))));
    }

    #[tokio::test]
    async fn test_write_posts_line_protocol() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v2/write"))
            .and(query_param("org", "ward"))
            .and(query_param("bucket", "icu"))
            .and(query_param("precision", "ns"))
            .and(header("Authorization", "Token secret-token"))
            .and(body_string(
                "patient_vitals,patient_id=P001 pulse=90i\npatient_vitals,patient_id=P002 pulse=60i",
            ))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let sink = InfluxSink::new(config_for(&server)).unwrap();
        sink.write(&sample_points()).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_batch_sends_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let sink = InfluxSink::new(config_for(&server)).unwrap();
        sink.write(&[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_write_reports_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v2/write"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"code":"unauthorized"}"#),
            )
            .mount(&server)
            .await;

        let sink = InfluxSink::new(config_for(&server)).unwrap();
        let result = sink.write(&sample_points()).await;

        match result {
            Err(SinkError::Rejected { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("unauthorized"));
            }
            other => panic!("expected rejected write, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_http_error() {
        let config = InfluxConfig {
            url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 2,
            ..InfluxConfig::default()
        };
        let sink = InfluxSink::new(config).unwrap();
        let result = sink.write(&sample_points()).await;
        assert!(matches!(result, Err(SinkError::Http(_))));
    }
}
