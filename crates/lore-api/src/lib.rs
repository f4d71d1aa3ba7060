//! JSON REST API for Lore.
//!
//! Exposes an axum [`Router`] backed by any [`LessonStore`], with identity and
//! payments delegated to an [`IdentityVerifier`] and a [`PaymentProcessor`].
//! TLS, CORS and request tracing are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = Router::new().merge(lore_api::api_router(state));
//! ```

pub mod auth;
pub mod comments;
pub mod error;
pub mod extract;
pub mod favorites;
pub mod lessons;
pub mod payments;
pub mod reports;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, patch, post},
};
use lore_core::{identity::IdentityVerifier, payment::PaymentProcessor, store::LessonStore};

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Fixed parameters of the premium checkout offered to every actor.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
  pub amount_cents: i64,
  pub currency:     String,
  pub product_name: String,
  /// Where the processor sends the payer after paying. May contain the
  /// processor's session-id placeholder.
  pub success_url:  String,
  pub cancel_url:   String,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
///
/// Every collaborator is created once at start-up and shared by reference
/// count; handlers never reach for a global.
pub struct AppState<S, I, P> {
  pub store:    Arc<S>,
  pub identity: Arc<I>,
  pub payments: Arc<P>,
  pub checkout: Arc<CheckoutConfig>,
}

impl<S, I, P> Clone for AppState<S, I, P> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      identity: Arc::clone(&self.identity),
      payments: Arc::clone(&self.payments),
      checkout: Arc::clone(&self.checkout),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S, I, P>(state: AppState<S, I, P>) -> Router<()>
where
  S: LessonStore + 'static,
  I: IdentityVerifier + 'static,
  P: PaymentProcessor + 'static,
{
  Router::new()
    // Users
    .route("/users", get(users::list::<S, I, P>).post(users::register::<S, I, P>))
    .route("/users/me", get(users::me::<S, I, P>))
    .route(
      "/users/role/{key}",
      get(users::role_of::<S, I, P>).patch(users::toggle_role::<S, I, P>),
    )
    .route("/users/{id}", delete(users::remove::<S, I, P>))
    // Lessons
    .route("/lessons", get(lessons::list::<S, I, P>).post(lessons::create::<S, I, P>))
    .route("/lessons/mine", get(lessons::mine::<S, I, P>))
    .route("/lessons/featured", get(lessons::featured::<S, I, P>))
    .route("/lessons/featured/{id}", patch(lessons::toggle_featured::<S, I, P>))
    .route("/lessons/like/{id}", patch(lessons::toggle_like::<S, I, P>))
    .route(
      "/lessons/{id}",
      get(lessons::get_one::<S, I, P>).delete(lessons::remove::<S, I, P>),
    )
    // Favorites
    .route("/favorites", get(favorites::list::<S, I, P>))
    .route("/favorites/toggle", post(favorites::toggle::<S, I, P>))
    // Comments
    .route("/comments", post(comments::create::<S, I, P>))
    .route("/comments/like", post(comments::like_by_body::<S, I, P>))
    .route("/comments/like/{id}", patch(comments::like_by_path::<S, I, P>))
    .route(
      "/comments/{id}",
      get(comments::thread::<S, I, P>).delete(comments::remove::<S, I, P>),
    )
    // Reports
    .route(
      "/lesson-reports",
      get(reports::list::<S, I, P>).post(reports::create::<S, I, P>),
    )
    .route(
      "/lesson-reports/{id}",
      delete(reports::dismiss::<S, I, P>),
    )
    // Payments
    .route("/create-checkout-session", post(payments::create_checkout::<S, I, P>))
    .route(
      "/payment-success",
      get(payments::success::<S, I, P>).patch(payments::success::<S, I, P>),
    )
    .with_state(state)
}

#[cfg(test)]
mod tests;
