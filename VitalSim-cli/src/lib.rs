// VitalSim lib.rs
//
// Wires the domain generator to a metrics sink: configuration, record
// mapping and the periodic scheduler used by the binary.

// Public modules
pub mod config;
pub mod records;
pub mod scheduler;

pub use config::{Cli, Command, ConfigError, SimulatorConfig};
pub use scheduler::{publish_metadata, RunSummary, Simulator};
