use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::{Validate, ValidationError};

use crate::errors::ProfileError;
use crate::services::perturbation::{Perturbation, BP_DROP, DESATURATION, HYPERTENSIVE_SURGE};

/// Diagnosis tag attached to a patient profile
///
/// The condition decides which perturbation rules the generator may apply
/// on top of the normally distributed baseline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Elevated blood pressure; occasional hypertensive surges
    #[serde(alias = "Hypertonia")]
    Hypertension,

    /// Low blood pressure; occasional further drops
    Hypotension,

    /// Lung infection; occasional desaturation episodes
    Pneumonia,

    /// Slow heart rate; occasional pressure drops
    Bradycardia,

    /// Fast heart rate; occasional pressure drops
    Tachycardia,
}

impl Condition {
    /// Every condition, in declaration order
    pub const ALL: [Condition; 5] = [
        Condition::Hypertension,
        Condition::Hypotension,
        Condition::Pneumonia,
        Condition::Bradycardia,
        Condition::Tachycardia,
    ];

    /// Tag value written alongside every record for this condition
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Hypertension => "Hypertension",
            Condition::Hypotension => "Hypotension",
            Condition::Pneumonia => "Pneumonia",
            Condition::Bradycardia => "Bradycardia",
            Condition::Tachycardia => "Tachycardia",
        }
    }

    /// Perturbation rules the generator may fire for this condition
    pub fn perturbations(&self) -> &'static [Perturbation] {
        match self {
            Condition::Pneumonia => &[DESATURATION],
            Condition::Hypertension => &[HYPERTENSIVE_SURGE],
            Condition::Hypotension | Condition::Bradycardia | Condition::Tachycardia => &[BP_DROP],
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive `min..=max` band for one vital sign
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange<T> {
    /// Lower bound (inclusive)
    pub min: T,
    /// Upper bound (inclusive)
    pub max: T,
}

impl<T> ValueRange<T> {
    /// Create a new range; ordering is checked by profile validation, not here
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: PartialOrd> ValueRange<T> {
    /// True when the range has a positive width
    pub fn is_ordered(&self) -> bool {
        self.min < self.max
    }
}

impl<T: Copy + Into<f64>> ValueRange<T> {
    /// Centre of the band, used as the mean of the sampling distribution
    pub fn midpoint(&self) -> f64 {
        (self.min.into() + self.max.into()) / 2.0
    }

    /// Width of the band, divided down into a standard deviation by the generator
    pub fn width(&self) -> f64 {
        self.max.into() - self.min.into()
    }
}

/// Static configuration for one simulated patient
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_profile_ranges"))]
pub struct PatientProfile {
    /// Unique identifier, used as the `patient_id` tag
    #[validate(
        length(min = 1, message = "Patient id cannot be empty"),
        custom = "validate_printable"
    )]
    pub id: String,

    /// Display name, used as the `patient_name` tag
    #[validate(
        length(min = 1, message = "Patient name cannot be empty"),
        custom = "validate_printable"
    )]
    pub name: String,

    /// Diagnosis tag driving perturbations
    pub condition: Condition,

    /// Typical systolic pressure band in mmHg
    #[serde(alias = "bp_range")]
    pub systolic_range: ValueRange<i32>,

    /// Typical oxygen saturation band in percent
    pub spo2_range: ValueRange<f64>,

    /// Typical heart rate band in beats per minute
    pub pulse_range: ValueRange<i32>,
}

/// Cross-field checks that the derive attributes cannot express
fn validate_profile_ranges(profile: &PatientProfile) -> Result<(), ValidationError> {
    if !profile.systolic_range.is_ordered() {
        return Err(range_error("systolic_range", "Systolic range min must be below max"));
    }

    if !profile.pulse_range.is_ordered() {
        return Err(range_error("pulse_range", "Pulse range min must be below max"));
    }

    let spo2 = profile.spo2_range;
    if !(spo2.min > 0.0 && spo2.is_ordered() && spo2.max <= 100.0) {
        return Err(range_error(
            "spo2_range",
            "SpO2 range must satisfy 0 < min < max <= 100",
        ));
    }

    Ok(())
}

/// Ids and names end up as record tags, where control characters break the line
fn validate_printable(value: &str) -> Result<(), ValidationError> {
    if value.chars().any(char::is_control) {
        return Err(range_error("printable", "Control characters are not allowed"));
    }
    Ok(())
}

fn range_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::from(message));
    error
}

impl PatientProfile {
    /// Run every validation rule and collapse failures into a single `ProfileError`
    pub fn ensure_valid(&self) -> Result<(), ProfileError> {
        if let Err(validation_errors) = self.validate() {
            let field_errors = validation_errors.field_errors();
            let mut fields: Vec<_> = field_errors.iter().collect();
            fields.sort_by_key(|(field, _)| **field);

            let message = fields
                .into_iter()
                .map(|(field, errors)| {
                    let error_msgs: Vec<String> = errors
                        .iter()
                        .map(|err| match &err.message {
                            Some(msg) => msg.to_string(),
                            None => format!("Invalid {}", field),
                        })
                        .collect();
                    error_msgs.join(", ")
                })
                .collect::<Vec<String>>()
                .join("; ");

            return Err(ProfileError::Validation {
                id: self.id.clone(),
                message,
            });
        }

        Ok(())
    }
}

/// Immutable, validated set of patient profiles
///
/// Built once at startup and handed to the scheduler; profile order is kept
/// so records within a batch always come out in the configured order.
#[derive(Debug, Clone)]
pub struct PatientRoster {
    profiles: Vec<PatientProfile>,
}

impl PatientRoster {
    /// Validate every profile and check that ids are unique
    pub fn new(profiles: Vec<PatientProfile>) -> Result<Self, ProfileError> {
        if profiles.is_empty() {
            return Err(ProfileError::EmptyRoster);
        }

        let mut seen = HashSet::new();
        for profile in &profiles {
            profile.ensure_valid()?;
            if !seen.insert(profile.id.as_str()) {
                return Err(ProfileError::DuplicateId(profile.id.clone()));
            }
        }

        Ok(Self { profiles })
    }

    /// Parse a JSON array of profiles
    pub fn from_json_str(json: &str) -> Result<Self, ProfileError> {
        let profiles: Vec<PatientProfile> = serde_json::from_str(json)?;
        Self::new(profiles)
    }

    /// Load a JSON roster file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        debug!("Reading patient roster from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        let roster = Self::from_json_str(&contents)?;
        info!("Loaded {} patient profiles from {}", roster.len(), path.display());
        Ok(roster)
    }

    /// Iterate over the profiles in configured order
    pub fn iter(&self) -> impl Iterator<Item = &PatientProfile> {
        self.profiles.iter()
    }

    /// Look up a profile by id
    pub fn get(&self, id: &str) -> Option<&PatientProfile> {
        self.profiles.iter().find(|profile| profile.id == id)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for PatientRoster {
    /// The five reference patients the simulator ships with
    fn default() -> Self {
        let profile = |id: &str, name: &str, condition, systolic: (i32, i32), spo2: (f64, f64), pulse: (i32, i32)| {
            PatientProfile {
                id: id.to_string(),
                name: name.to_string(),
                condition,
                systolic_range: ValueRange::new(systolic.0, systolic.1),
                spo2_range: ValueRange::new(spo2.0, spo2.1),
                pulse_range: ValueRange::new(pulse.0, pulse.1),
            }
        };

        Self {
            profiles: vec![
                profile("P001", "Patient1", Condition::Hypertension, (140, 190), (92.0, 98.0), (80, 120)),
                profile("P002", "Patient2", Condition::Hypotension, (80, 100), (96.0, 99.0), (50, 70)),
                profile("P003", "Patient3", Condition::Pneumonia, (110, 130), (85.0, 93.0), (90, 130)),
                profile("P004", "Patient4", Condition::Bradycardia, (120, 140), (97.0, 99.0), (40, 55)),
                profile("P005", "Patient5", Condition::Tachycardia, (130, 150), (95.0, 98.0), (120, 160)),
            ],
        }
    }
}

impl<'a> IntoIterator for &'a PatientRoster {
    type Item = &'a PatientProfile;
    type IntoIter = std::slice::Iter<'a, PatientProfile>;

    fn into_iter(self) -> Self::IntoIter {
        self.profiles.iter()
    }
}
