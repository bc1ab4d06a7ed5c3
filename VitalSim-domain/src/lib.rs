// VitalSim Domain
// This crate contains the simulation logic for the VitalSim application

// Patient profiles and generated readings
pub mod entities;

// Profile validation errors
pub mod errors;

// Injected randomness
pub mod random;

// Services that implement the simulation
pub mod services;

// Deterministic random sources - available to unit tests and with the mock feature
#[cfg(any(test, feature = "mock"))]
pub mod testing;

// Re-export common types for easier imports
pub use entities::{Condition, PatientProfile, PatientRoster, ValueRange, VitalsReading};
pub use errors::ProfileError;
pub use random::{RandomSource, RngSource, StdRandomSource};
pub use services::generator::{generate, VitalsGenerator};
