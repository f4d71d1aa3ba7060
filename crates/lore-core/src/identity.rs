//! Identity verifier boundary.

use std::future::Future;

use crate::{Result, actor::ActorId};

/// Abstraction over the external identity provider.
///
/// `Ok(None)` means the provider rejected the token; `Err` means the provider
/// could not be asked (reported as [`Error::Upstream`](crate::Error::Upstream)).
pub trait IdentityVerifier: Send + Sync {
  fn verify<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<Option<ActorId>>> + Send + 'a;
}
