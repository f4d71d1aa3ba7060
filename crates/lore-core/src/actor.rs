//! Actor identity: the authenticated party performing an action.
//!
//! An [`ActorId`] is only ever built from a verified credential (or read back
//! from the store), never from request-body fields.

use std::fmt;

use serde::Serialize;

use crate::{Error, Result};

/// A verified, non-empty, email-like actor identifier.
///
/// Normalised to trimmed ASCII-lowercase so identities coming from the
/// identity verifier and from the payment processor compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
  pub fn new(raw: impl AsRef<str>) -> Result<Self> {
    let normalised = raw.as_ref().trim().to_ascii_lowercase();
    if normalised.is_empty() {
      return Err(Error::InvalidActor);
    }
    Ok(Self(normalised))
  }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn into_inner(self) -> String { self.0 }
}

impl AsRef<str> for ActorId {
  fn as_ref(&self) -> &str { &self.0 }
}

impl fmt::Display for ActorId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
