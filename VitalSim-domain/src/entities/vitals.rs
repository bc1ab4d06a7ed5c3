use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entities::patient::{Condition, ValueRange};

/// One simulated snapshot of a patient's vital signs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalsReading {
    /// Heart rate in beats per minute
    pub pulse: u16,

    /// Oxygen saturation in percent, one decimal place
    pub spo2: f64,

    /// Systolic blood pressure (the higher number)
    pub systolic: u16,

    /// Diastolic blood pressure (the lower number), always at least 10 below systolic
    pub diastolic: u16,

    /// Condition of the profile the reading was generated for
    pub condition: Condition,
}

/// Clinically sane limits every generated reading is clamped into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VitalBounds {
    pub pulse: ValueRange<f64>,
    pub spo2: ValueRange<f64>,
    pub systolic: ValueRange<f64>,
    pub diastolic: ValueRange<f64>,
    /// Minimum gap kept between systolic and diastolic
    pub pulse_pressure_gap: f64,
}

impl VitalBounds {
    /// Bounds used by the simulator
    pub const CLINICAL: VitalBounds = VitalBounds {
        pulse: ValueRange::new(30.0, 220.0),
        spo2: ValueRange::new(70.0, 100.0),
        systolic: ValueRange::new(70.0, 250.0),
        diastolic: ValueRange::new(40.0, 150.0),
        pulse_pressure_gap: 10.0,
    };

    pub fn clamp_pulse(&self, value: f64) -> f64 {
        value.clamp(self.pulse.min, self.pulse.max)
    }

    pub fn clamp_spo2(&self, value: f64) -> f64 {
        value.clamp(self.spo2.min, self.spo2.max)
    }

    pub fn clamp_systolic(&self, value: f64) -> f64 {
        value.clamp(self.systolic.min, self.systolic.max)
    }

    /// Clamp diastolic into `[min, min(systolic - gap, max)]`
    ///
    /// The upper limit never drops below the lower one as long as the systolic
    /// floor sits at least `gap` above the diastolic floor.
    pub fn clamp_diastolic(&self, value: f64, systolic: f64) -> f64 {
        let upper = (systolic - self.pulse_pressure_gap)
            .min(self.diastolic.max)
            .max(self.diastolic.min);
        value.clamp(self.diastolic.min, upper)
    }
}

impl Default for VitalBounds {
    fn default() -> Self {
        Self::CLINICAL
    }
}

/// Blood pressure category based on measurements
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BloodPressureCategory {
    /// Normal blood pressure (systolic < 120 and diastolic < 80)
    Normal,

    /// Elevated blood pressure (systolic 120-129 and diastolic < 80)
    Elevated,

    /// Stage 1 Hypertension (systolic 130-139 or diastolic 80-89)
    Hypertension1,

    /// Stage 2 Hypertension (systolic ≥ 140 or diastolic ≥ 90)
    Hypertension2,

    /// Hypertensive crisis (systolic ≥ 180 or diastolic ≥ 120)
    HypertensiveCrisis,
}

impl fmt::Display for BloodPressureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BloodPressureCategory::Normal => "Normal",
            BloodPressureCategory::Elevated => "Elevated",
            BloodPressureCategory::Hypertension1 => "Hypertension Stage 1",
            BloodPressureCategory::Hypertension2 => "Hypertension Stage 2",
            BloodPressureCategory::HypertensiveCrisis => "Hypertensive Crisis",
        };
        f.write_str(label)
    }
}
