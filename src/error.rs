//! Error taxonomy for the model path.
//!
//! The deterministic pipeline never fails: empty or unparseable input maps
//! to defined default outcomes. Only the outbound model call can error, and
//! every variant here is caught inside the analyzer before it reaches the
//! public surface.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// Network failure, timeout, or non-success HTTP status.
    #[error("model transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The model reply did not contain valid JSON of the expected shape.
    #[error("model response failed validation: {0}")]
    Schema(String),

    /// The model path was enabled without the configuration it needs.
    #[error("model configuration invalid: {0}")]
    Configuration(String),
}
