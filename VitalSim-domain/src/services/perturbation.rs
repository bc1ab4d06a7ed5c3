use crate::entities::patient::ValueRange;
use crate::random::RandomSource;

/// Condition-specific deviation applied on top of a baseline reading
///
/// Rules are plain data; [`Condition::perturbations`](crate::Condition::perturbations)
/// maps each condition to the rules it may fire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Perturbation {
    /// Lower SpO₂ by an amount drawn uniformly from `drop`
    Desaturation { drop: ValueRange<f64> },

    /// Shift both pressures by signed amounts drawn uniformly from the ranges
    PressureShift {
        systolic: ValueRange<f64>,
        diastolic: ValueRange<f64>,
    },
}

/// Desaturation episode seen with pneumonia
pub const DESATURATION: Perturbation = Perturbation::Desaturation {
    drop: ValueRange::new(3.0, 8.0),
};

/// Upward pressure spike seen with hypertension
pub const HYPERTENSIVE_SURGE: Perturbation = Perturbation::PressureShift {
    systolic: ValueRange::new(15.0, 30.0),
    diastolic: ValueRange::new(5.0, 15.0),
};

/// Pressure drop seen with hypotension and rhythm disorders
pub const BP_DROP: Perturbation = Perturbation::PressureShift {
    systolic: ValueRange::new(-25.0, -10.0),
    diastolic: ValueRange::new(-10.0, -5.0),
};

/// Unclamped working values the generator threads through the rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RawVitals {
    pub pulse: f64,
    pub spo2: f64,
    pub systolic: f64,
    pub diastolic: f64,
}

impl Perturbation {
    /// True when the rule can raise blood pressure
    pub fn raises_pressure(&self) -> bool {
        matches!(self, Perturbation::PressureShift { systolic, .. } if systolic.max > 0.0)
    }

    /// True when the rule can lower blood pressure
    pub fn lowers_pressure(&self) -> bool {
        matches!(self, Perturbation::PressureShift { systolic, .. } if systolic.min < 0.0)
    }

    /// Draw the rule's magnitude and shift the affected values
    pub(crate) fn apply<R: RandomSource + ?Sized>(&self, vitals: &mut RawVitals, rng: &mut R) {
        match self {
            Perturbation::Desaturation { drop } => {
                vitals.spo2 -= rng.uniform(drop.min, drop.max);
            }
            Perturbation::PressureShift { systolic, diastolic } => {
                vitals.systolic += rng.uniform(systolic.min, systolic.max);
                vitals.diastolic += rng.uniform(diastolic.min, diastolic.max);
            }
        }
    }
}
