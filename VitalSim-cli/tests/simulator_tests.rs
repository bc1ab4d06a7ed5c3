use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tempfile::NamedTempFile;
use vital_sim::{publish_metadata, RunSummary, Simulator, SimulatorConfig};
use vital_sim_data::sink::MockMetricsSink;
use vital_sim_data::{InMemorySink, SinkError};
use vital_sim_domain::{PatientRoster, RngSource, VitalsGenerator};

fn simulator_with(sink: InMemorySink, seed: u64) -> Simulator<InMemorySink, vital_sim_domain::StdRandomSource> {
    Simulator::new(
        PatientRoster::default(),
        VitalsGenerator::new(),
        sink,
        RngSource::seeded(seed),
    )
}

#[tokio::test]
async fn test_each_tick_writes_one_batch_per_roster() {
    let sink = InMemorySink::new();
    let mut simulator = simulator_with(sink.clone(), 11);

    let summary = simulator
        .run(Duration::from_millis(5), Some(4), std::future::pending())
        .await;

    assert_eq!(summary.ticks, 4);
    assert_eq!(summary.points_written, 20);

    for batch in sink.batches().unwrap() {
        assert_eq!(batch.len(), 5);
        assert!(batch.iter().all(|p| p.measurement == "patient_vitals"));
        // One timestamp per tick
        assert!(batch.iter().all(|p| p.timestamp == batch[0].timestamp));
    }
}

#[tokio::test]
async fn test_failing_sink_keeps_loop_running() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let mut sink = MockMetricsSink::new();
    sink.expect_write().times(3).returning(move |points| {
        assert_eq!(points.len(), 5);
        counter.fetch_add(1, Ordering::SeqCst);
        Err(SinkError::Rejected {
            status: 500,
            body: "internal error".to_string(),
        })
    });
    sink.expect_describe().return_const("failing sink".to_string());

    let mut simulator = Simulator::new(
        PatientRoster::default(),
        VitalsGenerator::new(),
        sink,
        RngSource::seeded(3),
    );

    let summary = simulator
        .run(Duration::from_millis(5), Some(3), std::future::pending())
        .await;

    assert_eq!(
        summary,
        RunSummary {
            ticks: 3,
            points_written: 0,
            failed_ticks: 3
        }
    );
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_shutdown_before_first_tick() {
    let sink = InMemorySink::new();
    let mut simulator = simulator_with(sink.clone(), 1);

    let summary = simulator
        .run(Duration::from_millis(5), None, std::future::ready(()))
        .await;

    assert_eq!(summary, RunSummary::default());
    assert_eq!(sink.batch_count().unwrap(), 0);
}

#[tokio::test]
async fn test_shutdown_ends_unbounded_run() {
    let sink = InMemorySink::new();
    let mut simulator = simulator_with(sink.clone(), 1);

    let summary = simulator
        .run(
            Duration::from_millis(10),
            None,
            tokio::time::sleep(Duration::from_millis(55)),
        )
        .await;

    // The first tick fires immediately, so at least one batch lands
    assert!(summary.ticks >= 1);
    assert_eq!(sink.batch_count().unwrap() as u64, summary.ticks);
}

#[test]
fn test_same_seed_same_points() {
    let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

    let mut first = simulator_with(InMemorySink::new(), 2024);
    let mut second = simulator_with(InMemorySink::new(), 2024);

    for _ in 0..10 {
        assert_eq!(first.sample(now), second.sample(now));
    }
}

#[tokio::test]
async fn test_publish_metadata_from_roster_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"id": "W1", "name": "Ward Patient", "condition": "Hypertonia",
             "bp_range": {{"min": 150, "max": 180}},
             "spo2_range": {{"min": 93.0, "max": 97.0}},
             "pulse_range": {{"min": 85, "max": 110}}}}]"#
    )
    .unwrap();

    let config = SimulatorConfig {
        profiles_path: Some(file.path().to_path_buf()),
        ..SimulatorConfig::default()
    };
    let roster = config.load_roster().unwrap();

    let sink = InMemorySink::new();
    assert_eq!(publish_metadata(&roster, &sink).await.unwrap(), 1);

    let points = sink.points().unwrap();
    assert_eq!(points[0].tags["patient_id"], "W1");
    assert_eq!(points[0].tags["condition"], "Hypertension");
    assert_eq!(
        points[0].to_line_protocol().unwrap(),
        "patient_metadata,condition=Hypertension,patient_id=W1,patient_name=Ward\\ Patient \
         bp_max=180i,bp_min=150i,pulse_max=110i,pulse_min=85i,spo2_max=97,spo2_min=93"
    );
}

#[test]
fn test_missing_roster_file_is_reported() {
    let config = SimulatorConfig {
        profiles_path: Some("/nonexistent/patients.json".into()),
        ..SimulatorConfig::default()
    };
    assert!(config.load_roster().is_err());
}

#[test]
fn test_sample_roster_file_matches_builtin() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/patients.json");
    let from_file = PatientRoster::from_path(path).unwrap();
    let builtin = PatientRoster::default();

    let ids = |roster: &PatientRoster| roster.iter().map(|p| p.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&from_file), ids(&builtin));
}
