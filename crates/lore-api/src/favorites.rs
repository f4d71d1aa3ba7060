//! Handlers for `/favorites` endpoints.

use axum::extract::State;
use lore_core::{
  identity::IdentityVerifier,
  payment::PaymentProcessor,
  reaction::Favorite,
  store::LessonStore,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
  AppState,
  auth::{Actor, visible_lesson},
  error::ApiError,
  extract::Json,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleBody {
  pub lesson_id: Uuid,
}

/// `POST /favorites/toggle` returns `{"favorited":bool}`.
pub async fn toggle<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  Actor(actor): Actor,
  Json(body): Json<ToggleBody>,
) -> Result<Json<Value>, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  visible_lesson(state.store.as_ref(), body.lesson_id, Some(&actor)).await?;
  let favorited = state
    .store
    .toggle_favorite(body.lesson_id, &actor)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("lesson {} not found", body.lesson_id)))?;

  tracing::info!(lesson_id = %body.lesson_id, actor = %actor, favorited, "toggled favorite");
  Ok(Json(json!({ "favorited": favorited })))
}

/// `GET /favorites`: the actor's saved lessons, newest first.
pub async fn list<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  Actor(actor): Actor,
) -> Result<Json<Vec<Favorite>>, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  let favorites = state
    .store
    .list_favorites(&actor)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(favorites))
}
