//! Router-level tests: real SQLite store, fake identity and payments.

use std::{
  collections::HashMap,
  future::Future,
  sync::{
    Arc,
    Mutex,
    atomic::{AtomicBool, Ordering},
  },
};

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use lore_core::{
  Result as CoreResult,
  actor::ActorId,
  identity::IdentityVerifier,
  payment::{Checkout, CheckoutRequest, CheckoutState, PaymentProcessor, PaymentSession},
  store::LessonStore,
};
use lore_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{AppState, CheckoutConfig, api_router};

// ─── Fakes ────────────────────────────────────────────────────────────────────

/// Accepts `valid:<email>`, fails on `down`, rejects everything else.
struct FakeIdentity;

impl IdentityVerifier for FakeIdentity {
  fn verify<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = CoreResult<Option<ActorId>>> + Send + 'a {
    async move {
      if token == "down" {
        return Err(lore_core::Error::Upstream("identity service unreachable".into()));
      }
      Ok(token.strip_prefix("valid:").and_then(|e| ActorId::new(e).ok()))
    }
  }
}

/// In-memory processor; `down` makes every call fail as unreachable.
#[derive(Default)]
struct FakePayments {
  sessions: Mutex<HashMap<String, PaymentSession>>,
  requests: Mutex<Vec<CheckoutRequest>>,
  down:     AtomicBool,
}

impl FakePayments {
  fn set_down(&self, down: bool) { self.down.store(down, Ordering::SeqCst); }

  fn check_up(&self) -> CoreResult<()> {
    if self.down.load(Ordering::SeqCst) {
      Err(lore_core::Error::Upstream("payment processor unreachable".into()))
    } else {
      Ok(())
    }
  }

  fn put(&self, session: PaymentSession) {
    self
      .sessions
      .lock()
      .unwrap()
      .insert(session.session_id.clone(), session);
  }
}

impl PaymentProcessor for FakePayments {
  fn create_checkout<'a>(
    &'a self,
    request: &'a CheckoutRequest,
  ) -> impl Future<Output = CoreResult<Checkout>> + Send + 'a {
    async move {
      self.check_up()?;
      let mut requests = self.requests.lock().unwrap();
      requests.push(request.clone());
      let session_id = format!("sess_{}", requests.len());
      Ok(Checkout {
        redirect_url: format!("https://pay.test/{session_id}"),
        session_id,
      })
    }
  }

  fn retrieve_session<'a>(
    &'a self,
    session_id: &'a str,
  ) -> impl Future<Output = CoreResult<Option<PaymentSession>>> + Send + 'a {
    async move {
      self.check_up()?;
      Ok(self.sessions.lock().unwrap().get(session_id).cloned())
    }
  }
}

// ─── Harness ──────────────────────────────────────────────────────────────────

type TestState = AppState<SqliteStore, FakeIdentity, FakePayments>;

async fn make_state() -> TestState {
  AppState {
    store:    Arc::new(SqliteStore::open_in_memory().await.unwrap()),
    identity: Arc::new(FakeIdentity),
    payments: Arc::new(FakePayments::default()),
    checkout: Arc::new(CheckoutConfig {
      amount_cents: 1500,
      currency:     "usd".into(),
      product_name: "Premium Membership".into(),
      success_url:  "http://site.test/dashboard/payment-success?session_id={CHECKOUT_SESSION_ID}".into(),
      cancel_url:   "http://site.test/dashboard/payment-cancel".into(),
    }),
  }
}

fn paid_session(id: &str, email: &str, cents: i64) -> PaymentSession {
  PaymentSession {
    session_id:     id.into(),
    state:          CheckoutState::Paid,
    payer_email:    Some(email.into()),
    amount_cents:   cents,
    currency:       "usd".into(),
    transaction_id: Some(format!("pi_{id}")),
  }
}

/// Send one request; `as_user` is an email, or a raw token if it has no `@`.
async fn send(
  state: &TestState,
  method: &str,
  uri: &str,
  as_user: Option<&str>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(who) = as_user {
    let token = if who.contains('@') { format!("valid:{who}") } else { who.to_owned() };
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
  }
  let req = match body {
    Some(v) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(v.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let resp = api_router(state.clone()).oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, json)
}

async fn create_lesson(state: &TestState, author: &str) -> Uuid {
  let (status, body) = send(
    state,
    "POST",
    "/lessons",
    Some(author),
    Some(json!({
      "title": "Ask early",
      "description": "Waiting to ask for help cost me a week.",
      "category": "career",
      "emotionalTone": "reflective"
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["lessonId"].as_str().unwrap().parse().unwrap()
}

async fn make_admin(state: &TestState, email: &str) {
  let (status, user) = send(state, "POST", "/users", Some(email), Some(json!({}))).await;
  assert_eq!(status, StatusCode::CREATED);
  let id: Uuid = user["userId"].as_str().unwrap().parse().unwrap();
  state.store.toggle_role(id).await.unwrap();
}

// ── Comments ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn comment_thread_and_ownership() {
  let state = make_state().await;
  let lesson = create_lesson(&state, "author@x.com").await;

  let (status, _) = send(
    &state,
    "POST",
    "/comments",
    None,
    Some(json!({ "lessonId": lesson, "body": "first" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, _) = send(
    &state,
    "POST",
    "/comments",
    Some("not-a-token"),
    Some(json!({ "lessonId": lesson, "body": "first" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, c1) = send(
    &state,
    "POST",
    "/comments",
    Some("a@x.com"),
    Some(json!({ "lessonId": lesson, "body": "first" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let c1_id = c1["commentId"].as_str().unwrap().to_owned();

  let (_, tree) = send(&state, "GET", &format!("/comments/{lesson}"), None, None).await;
  assert_eq!(tree.as_array().unwrap().len(), 1);
  assert_eq!(tree[0]["replies"].as_array().unwrap().len(), 0);

  let (status, c2) = send(
    &state,
    "POST",
    "/comments",
    Some("b@x.com"),
    Some(json!({ "lessonId": lesson, "body": "reply", "parentId": c1_id })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (_, tree) = send(&state, "GET", &format!("/comments/{lesson}"), None, None).await;
  assert_eq!(tree.as_array().unwrap().len(), 1);
  assert_eq!(tree[0]["commentId"], c1["commentId"]);
  let replies = tree[0]["replies"].as_array().unwrap();
  assert_eq!(replies.len(), 1);
  assert_eq!(replies[0]["commentId"], c2["commentId"]);
  assert_eq!(replies[0]["authorEmail"], "b@x.com");

  let (status, _) = send(&state, "DELETE", &format!("/comments/{c1_id}"), Some("c@x.com"), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(&state, "DELETE", &format!("/comments/{c1_id}"), Some("a@x.com"), None).await;
  assert_eq!(status, StatusCode::OK);
  let (_, tree) = send(&state, "GET", &format!("/comments/{lesson}"), None, None).await;
  assert_eq!(tree, json!([]));
}

#[tokio::test]
async fn replies_cannot_nest() {
  let state = make_state().await;
  let lesson = create_lesson(&state, "author@x.com").await;

  let (_, root) = send(
    &state,
    "POST",
    "/comments",
    Some("a@x.com"),
    Some(json!({ "lessonId": lesson, "body": "root" })),
  )
  .await;
  let (_, reply) = send(
    &state,
    "POST",
    "/comments",
    Some("a@x.com"),
    Some(json!({ "lessonId": lesson, "body": "reply", "parentId": root["commentId"] })),
  )
  .await;
  let (status, _) = send(
    &state,
    "POST",
    "/comments",
    Some("a@x.com"),
    Some(json!({ "lessonId": lesson, "body": "deeper", "parentId": reply["commentId"] })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn comment_on_missing_lesson_or_parent_is_404() {
  let state = make_state().await;
  let (status, _) = send(
    &state,
    "POST",
    "/comments",
    Some("a@x.com"),
    Some(json!({ "lessonId": Uuid::new_v4(), "body": "hello" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let lesson = create_lesson(&state, "author@x.com").await;
  let (status, _) = send(
    &state,
    "POST",
    "/comments",
    Some("a@x.com"),
    Some(json!({ "lessonId": lesson, "body": "hello", "parentId": Uuid::new_v4() })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_comment_body_is_rejected() {
  let state = make_state().await;
  let lesson = create_lesson(&state, "author@x.com").await;
  let (status, body) = send(
    &state,
    "POST",
    "/comments",
    Some("a@x.com"),
    Some(json!({ "lessonId": lesson, "body": "   " })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("body"));
}

#[tokio::test]
async fn comment_like_via_path_and_body() {
  let state = make_state().await;
  let lesson = create_lesson(&state, "author@x.com").await;
  let (_, c) = send(
    &state,
    "POST",
    "/comments",
    Some("a@x.com"),
    Some(json!({ "lessonId": lesson, "body": "nice" })),
  )
  .await;
  let id = c["commentId"].as_str().unwrap().to_owned();

  let (_, r) = send(&state, "PATCH", &format!("/comments/like/{id}"), Some("b@x.com"), None).await;
  assert_eq!(r, json!({ "liked": true, "likesCount": 1 }));

  let (_, r) = send(
    &state,
    "POST",
    "/comments/like",
    Some("c@x.com"),
    Some(json!({ "commentId": id })),
  )
  .await;
  assert_eq!(r, json!({ "liked": true, "likesCount": 2 }));

  let (_, r) = send(&state, "PATCH", &format!("/comments/like/{id}"), Some("b@x.com"), None).await;
  assert_eq!(r, json!({ "liked": false, "likesCount": 1 }));

  let (status, _) = send(
    &state,
    "PATCH",
    &format!("/comments/like/{}", Uuid::new_v4()),
    Some("b@x.com"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Reactions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn favorite_toggle_flips_and_lists() {
  let state = make_state().await;
  let lesson = create_lesson(&state, "author@x.com").await;
  let body = json!({ "lessonId": lesson });

  let (_, r) = send(&state, "POST", "/favorites/toggle", Some("u1@x.com"), Some(body.clone())).await;
  assert_eq!(r, json!({ "favorited": true }));

  let (_, list) = send(&state, "GET", "/favorites", Some("u1@x.com"), None).await;
  assert_eq!(list.as_array().unwrap().len(), 1);
  assert_eq!(list[0]["lessonTitle"], "Ask early");

  let (_, r) = send(&state, "POST", "/favorites/toggle", Some("u1@x.com"), Some(body)).await;
  assert_eq!(r, json!({ "favorited": false }));

  let (_, list) = send(&state, "GET", "/favorites", Some("u1@x.com"), None).await;
  assert_eq!(list, json!([]));
}

#[tokio::test]
async fn lesson_like_is_an_involution() {
  let state = make_state().await;
  let lesson = create_lesson(&state, "author@x.com").await;
  let uri = format!("/lessons/like/{lesson}");

  let (_, r) = send(&state, "PATCH", &uri, Some("a@x.com"), None).await;
  assert_eq!(r, json!({ "liked": true, "likesCount": 1 }));
  let (_, r) = send(&state, "PATCH", &uri, Some("a@x.com"), None).await;
  assert_eq!(r, json!({ "liked": false, "likesCount": 0 }));

  let (_, got) = send(&state, "GET", &format!("/lessons/{lesson}"), None, None).await;
  assert_eq!(got["likesCount"], 0);
  assert_eq!(got["likes"], json!([]));
}

// ── Lessons ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn premium_lesson_requires_premium_author() {
  let state = make_state().await;
  let body = json!({
    "title": "Members only",
    "description": "…",
    "category": "life",
    "accessLevel": "premium"
  });

  let (status, _) = send(&state, "POST", "/lessons", Some("a@x.com"), Some(body.clone())).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  state.payments.put(paid_session("sess_p", "a@x.com", 1500));
  let (status, _) = send(&state, "PATCH", "/payment-success?session_id=sess_p", None, None).await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = send(&state, "POST", "/lessons", Some("a@x.com"), Some(body)).await;
  assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn private_lessons_are_hidden_from_public_reads() {
  let state = make_state().await;
  let (_, created) = send(
    &state,
    "POST",
    "/lessons",
    Some("a@x.com"),
    Some(json!({
      "title": "Diary",
      "description": "Just for me",
      "category": "life",
      "visibility": "private"
    })),
  )
  .await;
  let id = created["lessonId"].as_str().unwrap();

  let (status, _) = send(&state, "GET", &format!("/lessons/{id}"), None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send(&state, "GET", &format!("/lessons/{id}"), Some("eve@x.com"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, own) = send(&state, "GET", &format!("/lessons/{id}"), Some("a@x.com"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(own["title"], "Diary");
  let (_, public) = send(&state, "GET", "/lessons", None, None).await;
  assert_eq!(public, json!([]));
  let (_, mine) = send(&state, "GET", "/lessons/mine", Some("a@x.com"), None).await;
  assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn lesson_delete_by_author_or_admin_only() {
  let state = make_state().await;
  let first = create_lesson(&state, "author@x.com").await;
  let second = create_lesson(&state, "author@x.com").await;

  let (status, _) = send(&state, "DELETE", &format!("/lessons/{first}"), Some("other@x.com"), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(&state, "DELETE", &format!("/lessons/{first}"), Some("author@x.com"), None).await;
  assert_eq!(status, StatusCode::OK);

  make_admin(&state, "root@x.com").await;
  let (status, _) = send(&state, "DELETE", &format!("/lessons/{second}"), Some("root@x.com"), None).await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = send(&state, "GET", &format!("/lessons/{second}"), None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_lesson_fields_are_bad_request() {
  let state = make_state().await;
  let (status, body) = send(
    &state,
    "POST",
    "/lessons",
    Some("a@x.com"),
    Some(json!({ "title": "No body" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

// ── Users and roles ──────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_registration_reports_existing_user() {
  let state = make_state().await;
  let (status, user) = send(
    &state,
    "POST",
    "/users",
    Some("A@X.com"),
    Some(json!({ "name": "Ada" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(user["email"], "a@x.com");
  assert_eq!(user["role"], "user");
  assert_eq!(user["isPremium"], false);

  let (status, again) = send(&state, "POST", "/users", Some("a@x.com"), Some(json!({}))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(again, json!({ "message": "user exists" }));
}

#[tokio::test]
async fn admin_endpoints_reject_plain_users() {
  let state = make_state().await;
  send(&state, "POST", "/users", Some("a@x.com"), Some(json!({}))).await;

  let (status, _) = send(&state, "GET", "/lesson-reports", Some("a@x.com"), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  // Unknown accounts look the same as non-admins.
  let (status, _) = send(&state, "GET", "/users", Some("ghost@x.com"), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  let (status, _) = send(&state, "GET", "/users", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  make_admin(&state, "root@x.com").await;
  let (status, users) = send(&state, "GET", "/users", Some("root@x.com"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(users.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn role_lookup_and_toggle() {
  let state = make_state().await;
  let (_, user) = send(&state, "POST", "/users", Some("a@x.com"), Some(json!({}))).await;
  let id = user["userId"].as_str().unwrap().to_owned();

  let (_, role) = send(&state, "GET", "/users/role/a@x.com", Some("a@x.com"), None).await;
  assert_eq!(role, json!({ "role": "user" }));
  let (status, _) = send(&state, "GET", "/users/role/a@x.com", Some("b@x.com"), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  make_admin(&state, "root@x.com").await;
  let (status, r) = send(&state, "PATCH", &format!("/users/role/{id}"), Some("root@x.com"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(r["role"], "admin");

  let (_, role) = send(&state, "GET", "/users/role/a@x.com", Some("root@x.com"), None).await;
  assert_eq!(role, json!({ "role": "admin" }));
}

#[tokio::test]
async fn identity_outage_is_bad_gateway() {
  let state = make_state().await;
  let (status, body) = send(&state, "GET", "/users/me", Some("down"), None).await;
  assert_eq!(status, StatusCode::BAD_GATEWAY);
  assert!(body["error"].is_string());
}

// ── Reports ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reports_are_grouped_and_dismissed_by_admin() {
  let state = make_state().await;
  let lesson = create_lesson(&state, "author@x.com").await;
  for who in ["a@x.com", "b@x.com"] {
    let (status, _) = send(
      &state,
      "POST",
      "/lesson-reports",
      Some(who),
      Some(json!({ "lessonId": lesson, "reason": "spam" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
  }

  make_admin(&state, "root@x.com").await;
  let (_, reported) = send(&state, "GET", "/lesson-reports", Some("root@x.com"), None).await;
  assert_eq!(reported[0]["reportCount"], 2);

  let (_, r) = send(&state, "DELETE", &format!("/lesson-reports/{lesson}"), Some("root@x.com"), None).await;
  assert_eq!(r, json!({ "success": true, "removed": 2 }));
  let (_, reported) = send(&state, "GET", "/lesson-reports", Some("root@x.com"), None).await;
  assert_eq!(reported, json!([]));
}

// ── Payments ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn paid_session_grants_premium_once() {
  let state = make_state().await;
  state.payments.put(paid_session("sess_123", "a@x.com", 1500));

  let (status, first) = send(&state, "PATCH", "/payment-success?session_id=sess_123", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(first["actor"]["email"], "a@x.com");
  assert_eq!(first["actor"]["isPremium"], true);
  assert_eq!(first["transaction"]["amount"], 15.0);
  assert_eq!(first["transaction"]["id"], "pi_sess_123");

  let (status, second) = send(&state, "GET", "/payment-success?session_id=sess_123", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(second["transaction"], first["transaction"]);
  assert_eq!(second["actor"]["premiumAt"], first["actor"]["premiumAt"]);
}

#[tokio::test]
async fn unpaid_and_unknown_sessions() {
  let state = make_state().await;
  state.payments.put(PaymentSession {
    state: CheckoutState::Open,
    ..paid_session("sess_open", "a@x.com", 1500)
  });

  let (status, body) = send(&state, "PATCH", "/payment-success?session_id=sess_open", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "message": "Payment incomplete" }));
  let (status, _) = send(&state, "GET", "/users/me", Some("a@x.com"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = send(&state, "PATCH", "/payment-success?session_id=nope", None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send(&state, "PATCH", "/payment-success", None, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn checkout_uses_verified_actor_and_refuses_premium() {
  let state = make_state().await;
  let (status, _) = send(&state, "POST", "/create-checkout-session", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, body) = send(&state, "POST", "/create-checkout-session", Some("a@x.com"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["redirectUrl"], "https://pay.test/sess_1");
  {
    let requests = state.payments.requests.lock().unwrap();
    assert_eq!(requests[0].actor.as_str(), "a@x.com");
    assert_eq!(requests[0].amount_cents, 1500);
  }

  state.payments.put(paid_session("sess_1", "a@x.com", 1500));
  send(&state, "PATCH", "/payment-success?session_id=sess_1", None, None).await;
  let (status, _) = send(&state, "POST", "/create-checkout-session", Some("a@x.com"), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn payment_outage_is_bad_gateway_and_changes_nothing() {
  let state = make_state().await;
  send(&state, "POST", "/users", Some("a@x.com"), Some(json!({}))).await;
  let (_, before) = send(&state, "GET", "/users/me", Some("a@x.com"), None).await;

  state.payments.put(paid_session("sess_9", "a@x.com", 1500));
  state.payments.set_down(true);

  let (status, body) = send(&state, "PATCH", "/payment-success?session_id=sess_9", None, None).await;
  assert_eq!(status, StatusCode::BAD_GATEWAY);
  assert!(body["error"].is_string());

  let (status, body) = send(&state, "POST", "/create-checkout-session", Some("a@x.com"), None).await;
  assert_eq!(status, StatusCode::BAD_GATEWAY);
  assert!(body["error"].is_string());
  assert!(state.payments.requests.lock().unwrap().is_empty());

  let (_, after) = send(&state, "GET", "/users/me", Some("a@x.com"), None).await;
  assert_eq!(after, before);
  assert_eq!(after["isPremium"], false);

  state.payments.set_down(false);
  let (status, paid) = send(&state, "PATCH", "/payment-success?session_id=sess_9", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(paid["actor"]["isPremium"], true);
}

// ── Malformed input ──────────────────────────────────────────────────────────

#[tokio::test]
async fn malformed_input_is_a_json_bad_request() {
  let state = make_state().await;

  let (status, body) = send(
    &state,
    "POST",
    "/comments",
    Some("a@x.com"),
    Some(json!({ "body": "x" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("lessonId"), "{body}");

  let (status, body) = send(&state, "GET", "/comments/not-a-uuid", None, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());

  let (status, body) = send(&state, "GET", "/lessons?limit=many", None, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());

  let req = Request::builder()
    .method("POST")
    .uri("/favorites/toggle")
    .header(header::AUTHORIZATION, "Bearer valid:a@x.com")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{not json"))
    .unwrap();
  let resp = api_router(state.clone()).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert_eq!(
    resp.headers().get(header::CONTENT_TYPE).unwrap(),
    "application/json"
  );
}

#[tokio::test]
async fn comment_accepts_subject_id_for_lesson() {
  let state = make_state().await;
  let lesson = create_lesson(&state, "author@x.com").await;

  let (status, _) = send(
    &state,
    "POST",
    "/comments",
    Some("a@x.com"),
    Some(json!({ "subjectId": lesson, "body": "hi" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (_, tree) = send(&state, "GET", &format!("/comments/{lesson}"), None, None).await;
  assert_eq!(tree[0]["body"], "hi");
}

// ── Private lessons ──────────────────────────────────────────────────────────

#[tokio::test]
async fn private_lessons_cannot_be_reacted_to_by_others() {
  let state = make_state().await;
  let (_, created) = send(
    &state,
    "POST",
    "/lessons",
    Some("owner@x.com"),
    Some(json!({
      "title": "secret diary",
      "description": "Not for anyone else",
      "category": "life",
      "visibility": "private"
    })),
  )
  .await;
  let id = created["lessonId"].as_str().unwrap().to_owned();
  let (_, c) = send(
    &state,
    "POST",
    "/comments",
    Some("owner@x.com"),
    Some(json!({ "lessonId": id, "body": "note to self" })),
  )
  .await;
  let comment_id = c["commentId"].as_str().unwrap().to_owned();

  let eve = Some("eve@x.com");
  let (status, _) = send(&state, "POST", "/favorites/toggle", eve, Some(json!({ "lessonId": id }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (_, favorites) = send(&state, "GET", "/favorites", eve, None).await;
  assert_eq!(favorites, json!([]));

  let (status, _) = send(&state, "PATCH", &format!("/lessons/like/{id}"), eve, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send(
    &state,
    "POST",
    "/comments",
    eve,
    Some(json!({ "lessonId": id, "body": "peek" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send(&state, "GET", &format!("/comments/{id}"), eve, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send(&state, "GET", &format!("/comments/{id}"), None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send(&state, "PATCH", &format!("/comments/like/{comment_id}"), eve, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send(
    &state,
    "POST",
    "/lesson-reports",
    eve,
    Some(json!({ "lessonId": id, "reason": "spam" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  // The author still reaches everything.
  let owner = Some("owner@x.com");
  let (_, r) = send(&state, "PATCH", &format!("/lessons/like/{id}"), owner, None).await;
  assert_eq!(r, json!({ "liked": true, "likesCount": 1 }));
  let (_, r) = send(&state, "POST", "/favorites/toggle", owner, Some(json!({ "lessonId": id }))).await;
  assert_eq!(r, json!({ "favorited": true }));
  let (status, tree) = send(&state, "GET", &format!("/comments/{id}"), owner, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(tree.as_array().unwrap().len(), 1);
}
