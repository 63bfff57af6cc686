use thiserror::Error;

/// Errors raised by the catalog and diff engines.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An item reached ingest without a name
    #[error("Item in machine '{machine}' has no name")]
    MissingName { machine: String },

    /// Every input was empty after ingest
    #[error("No items found in any input")]
    EmptyInput,
}

impl CoreError {
    pub fn missing_name(machine: impl Into<String>) -> Self {
        Self::MissingName {
            machine: machine.into(),
        }
    }
}
