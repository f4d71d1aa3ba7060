//! Server wiring for Lore: configuration, external providers, and the
//! top-level router.
//!
//! The binary in `main.rs` only reads configuration, opens the store and
//! calls [`app`]; everything reachable from tests lives here.

pub mod firebase;
pub mod stripe;

use std::path::PathBuf;

use axum::{Router, routing::get};
use lore_api::{AppState, CheckoutConfig, api_router};
use lore_core::{identity::IdentityVerifier, payment::PaymentProcessor, store::LessonStore};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use firebase::FirebaseVerifier;
pub use stripe::StripeProcessor;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `LORE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  #[serde(default = "default_database_path")]
  pub database_path:        PathBuf,
  /// Public origin of the web front-end; checkout redirects land here.
  #[serde(default = "default_site_domain")]
  pub site_domain:          String,
  pub identity_api_key:     String,
  #[serde(default = "default_identity_endpoint")]
  pub identity_endpoint:    String,
  pub stripe_secret_key:    String,
  #[serde(default = "default_stripe_api_base")]
  pub stripe_api_base:      String,
  #[serde(default = "default_premium_price_cents")]
  pub premium_price_cents:  i64,
  #[serde(default = "default_premium_currency")]
  pub premium_currency:     String,
  #[serde(default = "default_premium_product_name")]
  pub premium_product_name: String,
}

fn default_host() -> String { "0.0.0.0".to_owned() }
fn default_port() -> u16 { 3000 }
fn default_database_path() -> PathBuf { PathBuf::from("lore.db") }
fn default_site_domain() -> String { "http://localhost:5173".to_owned() }
fn default_identity_endpoint() -> String {
  "https://identitytoolkit.googleapis.com/v1".to_owned()
}
fn default_stripe_api_base() -> String { "https://api.stripe.com".to_owned() }
fn default_premium_price_cents() -> i64 { 1500 }
fn default_premium_currency() -> String { "usd".to_owned() }
fn default_premium_product_name() -> String { "Premium Membership".to_owned() }

impl ServerConfig {
  /// The premium checkout offered to every actor.
  pub fn checkout(&self) -> CheckoutConfig {
    let site = self.site_domain.trim_end_matches('/');
    CheckoutConfig {
      amount_cents: self.premium_price_cents,
      currency:     self.premium_currency.clone(),
      product_name: self.premium_product_name.clone(),
      success_url:  format!(
        "{site}/dashboard/payment-success?session_id={{CHECKOUT_SESSION_ID}}"
      ),
      cancel_url:   format!("{site}/dashboard/payment-cancel"),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full public application: liveness route, API, request tracing and
/// permissive CORS for the browser front-end.
pub fn app<S, I, P>(state: AppState<S, I, P>) -> Router
where
  S: LessonStore + 'static,
  I: IdentityVerifier + 'static,
  P: PaymentProcessor + 'static,
{
  Router::new()
    .route("/", get(liveness))
    .merge(api_router(state))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
}

async fn liveness() -> &'static str { "Lore server is running" }

// ─── Tests ────────────────────────────────────────────────────────────────────
