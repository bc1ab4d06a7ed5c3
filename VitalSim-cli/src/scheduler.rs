//! Periodic simulation loop
//!
//! Every tick generates one reading per patient, in roster order, and writes
//! them to the sink as a single batch. A failed write is logged and the loop
//! carries on with the next tick.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info, warn};
use vital_sim_data::{MetricPoint, MetricsSink, SinkError};
use vital_sim_domain::{PatientRoster, RandomSource, VitalsGenerator};

use crate::records::{metadata_point, vitals_point};

/// Counters reported when the loop ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks that fired
    pub ticks: u64,
    /// Points the sink accepted
    pub points_written: u64,
    /// Ticks whose batch the sink refused
    pub failed_ticks: u64,
}

/// Drives the generator for a fixed roster and hands the results to a sink
pub struct Simulator<S, R> {
    roster: PatientRoster,
    generator: VitalsGenerator,
    sink: S,
    rng: R,
}

impl<S, R> Simulator<S, R>
where
    S: MetricsSink,
    R: RandomSource,
{
    pub fn new(roster: PatientRoster, generator: VitalsGenerator, sink: S, rng: R) -> Self {
        Self {
            roster,
            generator,
            sink,
            rng,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn roster(&self) -> &PatientRoster {
        &self.roster
    }

    /// Generate one point per patient, all stamped with `now`
    pub fn sample(&mut self, now: DateTime<Utc>) -> Vec<MetricPoint> {
        let mut points = Vec::with_capacity(self.roster.len());

        for profile in &self.roster {
            let reading = self.generator.generate(profile, &mut self.rng);
            info!(
                "{} ({}): Pulse={}, SpO2={}%, BP={}/{} mmHg [{}]",
                profile.name,
                profile.id,
                reading.pulse,
                reading.spo2,
                reading.systolic,
                reading.diastolic,
                reading.blood_pressure_category()
            );
            points.push(vitals_point(profile, &reading, now));
        }

        points
    }

    /// Run a single tick and return the number of points written
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<usize, SinkError> {
        let points = self.sample(now);
        self.sink.write(&points).await?;
        info!("Wrote {} points to {}", points.len(), self.sink.describe());
        Ok(points.len())
    }

    /// Tick every `interval` until `shutdown` resolves or `max_ticks` have fired
    ///
    /// The first tick fires immediately. Shutdown is only observed between
    /// ticks, so a write in progress always completes.
    pub async fn run<F>(&mut self, interval: Duration, max_ticks: Option<u64>, shutdown: F) -> RunSummary
    where
        F: Future<Output = ()>,
    {
        let mut summary = RunSummary::default();
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            "Simulating {} patients every {:?}, writing to {}",
            self.roster.len(),
            interval,
            self.sink.describe()
        );

        loop {
            if max_ticks.is_some_and(|max| summary.ticks >= max) {
                info!("Reached the configured {} ticks", summary.ticks);
                break;
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping the simulation");
                    break;
                }
                _ = ticker.tick() => {}
            }

            summary.ticks += 1;
            match self.tick(Utc::now()).await {
                Ok(written) => summary.points_written += written as u64,
                Err(e) => {
                    summary.failed_ticks += 1;
                    error!("Failed to write tick {}: {}", summary.ticks, e);
                }
            }
        }

        if summary.failed_ticks > 0 {
            warn!("{} of {} ticks failed to write", summary.failed_ticks, summary.ticks);
        }
        summary
    }
}

/// Write one metadata point per patient and return how many were written
pub async fn publish_metadata<S>(roster: &PatientRoster, sink: &S) -> Result<usize, SinkError>
where
    S: MetricsSink + ?Sized,
{
    let points: Vec<MetricPoint> = roster.iter().map(metadata_point).collect();
    sink.write(&points).await?;
    info!("Published metadata for {} patients to {}", points.len(), sink.describe());
    Ok(points.len())
}
