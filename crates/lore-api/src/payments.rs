//! Premium checkout and payment reconciliation.
//!
//! `POST /create-checkout-session` opens a hosted checkout for the actor.
//! `GET|PATCH /payment-success?session_id=…` asks the processor about the
//! session and, if it is paid, upgrades the payer to premium. The payer is
//! taken from the processor's session, never from the request.

use axum::extract::State;
use chrono::Utc;
use lore_core::{
  actor::ActorId,
  identity::IdentityVerifier,
  payment::{Checkout, CheckoutRequest, PaymentProcessor, Transaction},
  store::LessonStore,
  user::User,
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::Actor,
  error::ApiError,
  extract::{Json, Query},
};

// ─── Checkout ─────────────────────────────────────────────────────────────────

/// `POST /create-checkout-session` returns `{"sessionId":…,"redirectUrl":…}`.
pub async fn create_checkout<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  Actor(actor): Actor,
) -> Result<Json<Checkout>, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  let already_premium = state
    .store
    .get_user_by_email(&actor)
    .await
    .map_err(ApiError::store)?
    .is_some_and(|u| u.is_premium);
  if already_premium {
    return Err(ApiError::BadRequest("already a premium member".to_owned()));
  }

  let config = state.checkout.as_ref();
  let request = CheckoutRequest {
    actor:        actor.clone(),
    amount_cents: config.amount_cents,
    currency:     config.currency.clone(),
    product_name: config.product_name.clone(),
    success_url:  config.success_url.clone(),
    cancel_url:   config.cancel_url.clone(),
  };
  let checkout = state.payments.create_checkout(&request).await?;

  tracing::info!(actor = %actor, session_id = %checkout.session_id, "opened checkout session");
  Ok(Json(checkout))
}

// ─── Reconciliation ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SuccessParams {
  pub session_id: Option<String>,
}

/// Result of reconciling one checkout session.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Reconciliation {
  Paid {
    transaction: Transaction,
    actor:       User,
  },
  Incomplete {
    message: String,
  },
}

/// `GET|PATCH /payment-success?session_id=…`
pub async fn success<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  Query(params): Query<SuccessParams>,
) -> Result<Json<Reconciliation>, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  let session_id = params
    .session_id
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .ok_or_else(|| ApiError::BadRequest("missing session_id".to_owned()))?;

  reconcile(state.store.as_ref(), state.payments.as_ref(), session_id)
    .await
    .map(Json)
}

/// Bring the payer's user record in line with the processor's view of
/// `session_id`.
///
/// Repeating this for an already reconciled session changes nothing: the
/// store keeps the original `premiumAt` and transaction when the transaction
/// id matches.
pub async fn reconcile<S, P>(
  store: &S,
  payments: &P,
  session_id: &str,
) -> Result<Reconciliation, ApiError>
where
  S: LessonStore,
  P: PaymentProcessor,
{
  let session = payments
    .retrieve_session(session_id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("checkout session {session_id} not found")))?;

  if !session.is_paid() {
    tracing::debug!(session_id, state = ?session.state, "checkout session not paid");
    return Ok(Reconciliation::Incomplete {
      message: "Payment incomplete".to_owned(),
    });
  }

  let payer = session
    .payer_email
    .as_deref()
    .ok_or_else(|| ApiError::Upstream(format!("paid session {session_id} has no payer email")))?;
  let actor = ActorId::new(payer)
    .map_err(|_| ApiError::Upstream(format!("paid session {session_id} has an invalid payer email")))?;

  let tx = Transaction::from_session(&session, Utc::now());
  let user = store
    .grant_premium(&actor, &tx)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(actor = %actor, session_id, transaction_id = %tx.id, "reconciled payment");
  let transaction = user.transaction.clone().unwrap_or(tx);
  Ok(Reconciliation::Paid {
    transaction,
    actor: user,
  })
}
