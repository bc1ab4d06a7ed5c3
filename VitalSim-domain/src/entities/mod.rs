// Domain entities and value objects
pub mod patient;
pub mod vitals;

// Re-export common types for easier imports
pub use patient::{Condition, PatientProfile, PatientRoster, ValueRange};
pub use vitals::{BloodPressureCategory, VitalBounds, VitalsReading};
