use thiserror::Error;

/// Error type for patient profile and roster configuration
#[derive(Error, Debug)]
pub enum ProfileError {
    /// A profile failed field or range validation
    #[error("Invalid profile {id}: {message}")]
    Validation {
        /// Id of the offending profile (may be empty)
        id: String,
        /// Human readable list of the failed checks
        message: String,
    },

    /// Two profiles share the same id
    #[error("Duplicate patient id: {0}")]
    DuplicateId(String),

    /// The roster contains no profiles
    #[error("Patient roster is empty")]
    EmptyRoster,

    /// The roster file could not be read
    #[error("Failed to read patient roster: {0}")]
    Io(#[from] std::io::Error),

    /// The roster file is not valid JSON for a list of profiles
    #[error("Failed to parse patient roster: {0}")]
    Parse(#[from] serde_json::Error),
}
