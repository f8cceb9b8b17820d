//! Errors surfaced while assembling an instance.

use thiserror::Error;

use crate::logging::LogError;
use crate::private_key::PrivateKeyError;

/// Error creating an app instance.
///
/// Collaborator failures are passed through as the source, never recovered.
#[derive(Debug, Error)]
pub enum CreateError {
    #[error("private key error: {0}")]
    PrivateKey(#[from] PrivateKeyError),
    #[error("logger error: {0}")]
    Log(#[from] LogError),
    #[error("constructor error: {0}")]
    Construct(#[source] Box<dyn std::error::Error + Send + Sync>),
}
