//! Vital-sign generator
//!
//! Maps a patient profile to one plausible instantaneous reading. Each vital
//! is drawn from a normal distribution centred on the profile's band, the
//! diastolic pressure is derived from the systolic one, condition rules may
//! push the values further, and everything is clamped into [`VitalBounds`]
//! at the end.
//!
//! Draw order is fixed so scripted sources stay predictable:
//! normals are pulse, SpO₂, systolic, diastolic noise; uniforms are the
//! diastolic ratio, then per rule a `chance` draw followed by its magnitudes.

use crate::entities::patient::{PatientProfile, ValueRange};
use crate::entities::vitals::{VitalBounds, VitalsReading};
use crate::random::RandomSource;
use crate::services::perturbation::RawVitals;

/// Probability that each condition rule fires on a given reading
pub const DEFAULT_PERTURBATION_PROBABILITY: f64 = 0.10;

/// Band width divided by this gives the pulse standard deviation
const PULSE_SPREAD_DIVISOR: f64 = 6.0;
/// SpO₂ varies less than the other vitals
const SPO2_SPREAD_DIVISOR: f64 = 4.0;
const SYSTOLIC_SPREAD_DIVISOR: f64 = 6.0;

/// Diastolic is this fraction of systolic before noise
const DIASTOLIC_RATIO: ValueRange<f64> = ValueRange::new(0.60, 0.75);
const DIASTOLIC_NOISE_STD_DEV: f64 = 5.0;

/// Stateless generator of simulated readings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VitalsGenerator {
    bounds: VitalBounds,
    perturbation_probability: f64,
}

impl Default for VitalsGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl VitalsGenerator {
    /// Generator with clinical bounds and the default perturbation probability
    pub fn new() -> Self {
        Self {
            bounds: VitalBounds::CLINICAL,
            perturbation_probability: DEFAULT_PERTURBATION_PROBABILITY,
        }
    }

    /// Override the per-rule perturbation probability; `0.0` disables perturbations
    pub fn with_perturbation_probability(mut self, probability: f64) -> Self {
        self.perturbation_probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        self
    }

    pub fn perturbation_probability(&self) -> f64 {
        self.perturbation_probability
    }

    pub fn bounds(&self) -> &VitalBounds {
        &self.bounds
    }

    /// Produce one reading for `profile`
    ///
    /// Never fails: whatever the source returns, the result is clamped into
    /// the generator's bounds and diastolic stays below systolic.
    pub fn generate<R: RandomSource + ?Sized>(
        &self,
        profile: &PatientProfile,
        rng: &mut R,
    ) -> VitalsReading {
        let bounds = &self.bounds;

        let pulse = sample_band(rng, &profile.pulse_range, PULSE_SPREAD_DIVISOR).trunc();
        let pulse = bounds.clamp_pulse(pulse);

        let spo2 = sample_band(rng, &profile.spo2_range, SPO2_SPREAD_DIVISOR);
        let spo2 = bounds.clamp_spo2(spo2);

        let systolic = sample_band(rng, &profile.systolic_range, SYSTOLIC_SPREAD_DIVISOR).trunc();
        let systolic = bounds.clamp_systolic(systolic);

        let ratio = rng.uniform(DIASTOLIC_RATIO.min, DIASTOLIC_RATIO.max);
        let noise = rng.normal(0.0, DIASTOLIC_NOISE_STD_DEV);
        let diastolic = (systolic * ratio + noise).trunc();
        let diastolic = bounds.clamp_diastolic(diastolic, systolic);

        let mut vitals = RawVitals {
            pulse,
            spo2,
            systolic,
            diastolic,
        };

        for rule in profile.condition.perturbations() {
            if rng.chance(self.perturbation_probability) {
                rule.apply(&mut vitals, rng);
            }
        }

        self.finish(vitals, profile)
    }

    /// Final unconditional clamp and conversion to the output types
    fn finish(&self, vitals: RawVitals, profile: &PatientProfile) -> VitalsReading {
        let bounds = &self.bounds;

        let pulse = bounds.clamp_pulse(vitals.pulse.trunc());
        let spo2 = bounds.clamp_spo2((vitals.spo2 * 10.0).round() / 10.0);
        let systolic = bounds.clamp_systolic(vitals.systolic.trunc());
        let diastolic = bounds.clamp_diastolic(vitals.diastolic.trunc(), systolic);

        VitalsReading {
            pulse: pulse as u16,
            spo2,
            systolic: systolic as u16,
            diastolic: diastolic as u16,
            condition: profile.condition,
        }
    }
}

/// Draw from a normal centred on the band with `width / divisor` spread
fn sample_band<T, R>(rng: &mut R, band: &ValueRange<T>, divisor: f64) -> f64
where
    T: Copy + Into<f64>,
    R: RandomSource + ?Sized,
{
    rng.normal(band.midpoint(), band.width() / divisor)
}

/// Generate a reading with the default generator
pub fn generate<R: RandomSource + ?Sized>(profile: &PatientProfile, rng: &mut R) -> VitalsReading {
    VitalsGenerator::default().generate(profile, rng)
}
