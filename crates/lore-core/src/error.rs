//! Error types for `lore-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("actor identifier must not be empty")]
  InvalidActor,

  #[error("missing required field: {0}")]
  MissingField(&'static str),

  /// An external collaborator (identity verifier, payment processor) failed
  /// or could not be reached. Retryable by the caller.
  #[error("upstream error: {0}")]
  Upstream(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
