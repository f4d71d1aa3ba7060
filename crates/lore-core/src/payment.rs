//! Payment processor boundary and premium checkout types.
//!
//! A checkout attempt moves `Open -> Paid -> (reconciled)` or
//! `Open -> Abandoned`. Reconciliation turns a paid session into a durable
//! premium upgrade on the payer's user record.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Result, actor::ActorId};

/// What the processor needs to start a hosted checkout.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
  pub actor:        ActorId,
  pub amount_cents: i64,
  pub currency:     String,
  pub product_name: String,
  pub success_url:  String,
  pub cancel_url:   String,
}

/// The hosted checkout page the client should be sent to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
  pub session_id:   String,
  pub redirect_url: String,
}

/// Lifecycle of a checkout session as reported by the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutState {
  Open,
  Paid,
  Abandoned,
}

/// A checkout session as reported by the processor.
#[derive(Debug, Clone)]
pub struct PaymentSession {
  pub session_id:     String,
  pub state:          CheckoutState,
  pub payer_email:    Option<String>,
  pub amount_cents:   i64,
  pub currency:       String,
  pub transaction_id: Option<String>,
}

impl PaymentSession {
  pub fn is_paid(&self) -> bool { self.state == CheckoutState::Paid }
}

/// A settled payment recorded on the user it upgraded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
  /// Processor-side transaction id (e.g. a Stripe payment intent).
  pub id:           String,
  pub amount_cents: i64,
  /// Major currency units, `amount_cents / 100`.
  pub amount:       f64,
  pub currency:     String,
  pub paid_at:      DateTime<Utc>,
}

impl Transaction {
  pub fn new(
    id: impl Into<String>,
    amount_cents: i64,
    currency: impl Into<String>,
    paid_at: DateTime<Utc>,
  ) -> Self {
    Self {
      id: id.into(),
      amount_cents,
      amount: amount_cents as f64 / 100.0,
      currency: currency.into(),
      paid_at,
    }
  }

  /// Build the transaction record for a paid session. Sessions without a
  /// processor transaction id fall back to the session id.
  pub fn from_session(session: &PaymentSession, paid_at: DateTime<Utc>) -> Self {
    let id = session
      .transaction_id
      .clone()
      .unwrap_or_else(|| session.session_id.clone());
    Self::new(id, session.amount_cents, session.currency.clone(), paid_at)
  }
}

/// Abstraction over the external payment processor.
///
/// Transport failures are reported as [`Error::Upstream`](crate::Error::Upstream).
pub trait PaymentProcessor: Send + Sync {
  /// Open a hosted checkout session.
  fn create_checkout<'a>(
    &'a self,
    request: &'a CheckoutRequest,
  ) -> impl Future<Output = Result<Checkout>> + Send + 'a;

  /// Look up a session. Returns `None` if the processor does not know it.
  fn retrieve_session<'a>(
    &'a self,
    session_id: &'a str,
  ) -> impl Future<Output = Result<Option<PaymentSession>>> + Send + 'a;
}
