//! Handlers for `/users` endpoints.
//!
//! | Method  | Path | Auth | Notes |
//! |---------|------|------|-------|
//! | `POST`  | `/users` | identity | Body: `{"name":"…","photoUrl":"…"}`; email comes from the token |
//! | `GET`   | `/users` | admin | All users |
//! | `GET`   | `/users/me` | identity | 404 if not registered |
//! | `GET`   | `/users/role/:email` | identity | Self or admin; `{"role":null}` if unknown |
//! | `PATCH` | `/users/role/:id` | admin | Toggle user ↔ admin |
//! | `DELETE`| `/users/:id` | admin | |

use axum::{
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use lore_core::{
  actor::ActorId,
  identity::IdentityVerifier,
  payment::PaymentProcessor,
  store::LessonStore,
  user::{NewUser, User},
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
  AppState,
  auth::{Actor, Admin, is_admin},
  error::ApiError,
  extract::{Json, Path},
};

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
  pub name:      Option<String>,
  pub photo_url: Option<String>,
}

/// `POST /users`: idempotent registration for social and password sign-in.
pub async fn register<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  Actor(actor): Actor,
  Json(body): Json<RegisterBody>,
) -> Result<Response, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  let input = NewUser {
    email:     actor,
    name:      body.name,
    photo_url: body.photo_url,
  };
  let created = state
    .store
    .add_user(input)
    .await
    .map_err(ApiError::store)?;

  Ok(match created {
    Some(user) => {
      tracing::info!(email = %user.email, "registered user");
      (StatusCode::CREATED, Json(user)).into_response()
    }
    None => Json(json!({ "message": "user exists" })).into_response(),
  })
}

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /users`
pub async fn list<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  _admin: Admin,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  let users = state.store.list_users().await.map_err(ApiError::store)?;
  Ok(Json(users))
}

/// `GET /users/me`
pub async fn me<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  Actor(actor): Actor,
) -> Result<Json<User>, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  let user = state
    .store
    .get_user_by_email(&actor)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {actor} not registered")))?;
  Ok(Json(user))
}

/// `GET /users/role/:email`
pub async fn role_of<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  Actor(actor): Actor,
  Path(email): Path<String>,
) -> Result<Json<Value>, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  let target = ActorId::new(&email)?;
  if target != actor && !is_admin(state.store.as_ref(), &actor).await? {
    return Err(ApiError::Forbidden("cannot read another user's role".to_owned()));
  }

  let role = state
    .store
    .get_user_by_email(&target)
    .await
    .map_err(ApiError::store)?
    .map(|u| u.role);
  Ok(Json(json!({ "role": role })))
}

// ─── Admin mutations ──────────────────────────────────────────────────────────

/// `PATCH /users/role/:id`
pub async fn toggle_role<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  Admin(admin): Admin,
  Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  let role = state
    .store
    .toggle_role(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;

  tracing::info!(user_id = %id, role = role.as_str(), by = %admin.email, "toggled user role");
  Ok(Json(json!({
    "message": format!("User role updated to {}", role.as_str()),
    "role": role,
  })))
}

/// `DELETE /users/:id`
pub async fn remove<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  Admin(admin): Admin,
  Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  if !state.store.delete_user(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(format!("user {id} not found")));
  }
  tracing::info!(user_id = %id, by = %admin.email, "deleted user");
  Ok(Json(json!({ "success": true })))
}
