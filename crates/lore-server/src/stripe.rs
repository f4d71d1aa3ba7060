//! Payment processing through Stripe Checkout Sessions.
//!
//! Sessions are created with a single ad-hoc line item and the payer's
//! email, and read back to learn whether they were paid. The payer email is
//! read from the session, preferring what the payer typed at checkout.

use std::{collections::HashMap, future::Future, time::Duration};

use anyhow::Context as _;
use lore_core::{
  Error,
  Result,
  payment::{Checkout, CheckoutRequest, CheckoutState, PaymentProcessor, PaymentSession},
};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

/// [`PaymentProcessor`] speaking the Stripe REST API.
#[derive(Clone)]
pub struct StripeProcessor {
  client:     Client,
  api_base:   String,
  secret_key: String,
}

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct StripeSession {
  id:               String,
  url:              Option<String>,
  status:           Option<String>,
  payment_status:   Option<String>,
  amount_total:     Option<i64>,
  currency:         Option<String>,
  customer_email:   Option<String>,
  customer_details: Option<CustomerDetails>,
  #[serde(default)]
  metadata:         HashMap<String, String>,
  /// Either an id string or, when expanded, the payment intent object.
  payment_intent:   Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CustomerDetails {
  email: Option<String>,
}

impl StripeSession {
  fn state(&self) -> CheckoutState {
    match (self.payment_status.as_deref(), self.status.as_deref()) {
      (Some("paid"), _) => CheckoutState::Paid,
      (_, Some("expired")) => CheckoutState::Abandoned,
      _ => CheckoutState::Open,
    }
  }

  fn into_session(self) -> PaymentSession {
    let state = self.state();
    let payer_email = self
      .customer_details
      .and_then(|d| d.email)
      .or(self.customer_email)
      .or_else(|| self.metadata.get("actor").cloned());
    let transaction_id = match self.payment_intent {
      Some(Value::String(id)) => Some(id),
      Some(Value::Object(obj)) => obj.get("id").and_then(Value::as_str).map(str::to_owned),
      _ => None,
    };
    PaymentSession {
      session_id: self.id,
      state,
      payer_email,
      amount_cents: self.amount_total.unwrap_or(0),
      currency: self.currency.unwrap_or_default(),
      transaction_id,
    }
  }
}

/// Stripe session ids are `cs_…` tokens; anything else cannot name one.
fn is_session_id(id: &str) -> bool {
  !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn upstream(context: &str, e: impl std::fmt::Display) -> Error {
  Error::Upstream(format!("{context}: {e}"))
}

// ─── Client ───────────────────────────────────────────────────────────────────

impl StripeProcessor {
  pub fn new(api_base: &str, secret_key: &str) -> anyhow::Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build payments HTTP client")?;
    Ok(Self {
      client,
      api_base: api_base.trim_end_matches('/').to_owned(),
      secret_key: secret_key.to_owned(),
    })
  }

  fn url(&self, path: &str) -> String { format!("{}/v1{}", self.api_base, path) }

  async fn open_session(&self, request: &CheckoutRequest) -> Result<Checkout> {
    let amount = request.amount_cents.to_string();
    let form = checkout_form(request, &amount);

    let resp = self
      .client
      .post(self.url("/checkout/sessions"))
      .bearer_auth(&self.secret_key)
      .form(&form)
      .send()
      .await
      .map_err(|e| upstream("creating checkout session", e))?;

    if !resp.status().is_success() {
      return Err(Error::Upstream(format!(
        "creating checkout session → {}",
        resp.status()
      )));
    }
    let session: StripeSession = resp
      .json()
      .await
      .map_err(|e| upstream("decoding checkout session", e))?;
    let redirect_url = session
      .url
      .ok_or_else(|| Error::Upstream("checkout session has no url".to_owned()))?;
    Ok(Checkout {
      session_id: session.id,
      redirect_url,
    })
  }

  async fn fetch_session(&self, session_id: &str) -> Result<Option<PaymentSession>> {
    if !is_session_id(session_id) {
      return Ok(None);
    }
    let resp = self
      .client
      .get(self.url(&format!("/checkout/sessions/{session_id}")))
      .bearer_auth(&self.secret_key)
      .send()
      .await
      .map_err(|e| upstream("retrieving checkout session", e))?;

    match resp.status() {
      s if s.is_success() => {
        let session: StripeSession = resp
          .json()
          .await
          .map_err(|e| upstream("decoding checkout session", e))?;
        Ok(Some(session.into_session()))
      }
      StatusCode::NOT_FOUND => Ok(None),
      s => Err(Error::Upstream(format!("retrieving checkout session → {s}"))),
    }
  }
}

/// Form fields for `POST /v1/checkout/sessions`.
fn checkout_form<'a>(request: &'a CheckoutRequest, amount: &'a str) -> Vec<(&'static str, &'a str)> {
  vec![
    ("mode", "payment"),
    ("payment_method_types[0]", "card"),
    ("line_items[0][quantity]", "1"),
    ("line_items[0][price_data][currency]", request.currency.as_str()),
    ("line_items[0][price_data][unit_amount]", amount),
    ("line_items[0][price_data][product_data][name]", request.product_name.as_str()),
    ("customer_email", request.actor.as_str()),
    ("metadata[actor]", request.actor.as_str()),
    ("success_url", request.success_url.as_str()),
    ("cancel_url", request.cancel_url.as_str()),
  ]
}

impl PaymentProcessor for StripeProcessor {
  fn create_checkout<'a>(
    &'a self,
    request: &'a CheckoutRequest,
  ) -> impl Future<Output = Result<Checkout>> + Send + 'a {
    self.open_session(request)
  }

  fn retrieve_session<'a>(
    &'a self,
    session_id: &'a str,
  ) -> impl Future<Output = Result<Option<PaymentSession>>> + Send + 'a {
    self.fetch_session(session_id)
  }
}
