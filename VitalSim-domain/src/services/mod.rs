pub mod generator;
pub mod insights;
pub mod perturbation;

// Simulation services
// This module contains the vital-sign generator and the rules it applies.

// Re-export the generator and its helpers
pub use generator::{generate, VitalsGenerator, DEFAULT_PERTURBATION_PROBABILITY};
pub use insights::categorize_blood_pressure;
pub use perturbation::Perturbation;
