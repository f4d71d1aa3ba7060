//! Handlers for `/comments` endpoints.
//!
//! | Method  | Path | Auth | Notes |
//! |---------|------|------|-------|
//! | `GET`   | `/comments/:lessonId` | public | Roots with their direct replies |
//! | `POST`  | `/comments` | identity | Body: `{"lessonId":…,"body":…,"parentId":…?}`; `subjectId` is accepted for `lessonId` |
//! | `PATCH` | `/comments/like/:id` | identity | Toggle like |
//! | `POST`  | `/comments/like` | identity | Body: `{"commentId":…}`; toggle like |
//! | `DELETE`| `/comments/:id` | author | Also removes replies |

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use lore_core::{
  actor::ActorId,
  comment::{CommentNode, NewComment},
  identity::IdentityVerifier,
  payment::PaymentProcessor,
  reaction::ReactionTarget,
  store::LessonStore,
  thread::build_tree,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
  AppState,
  auth::{Actor, ensure_owner, visible_lesson},
  error::ApiError,
  extract::{Json, Path},
};

// ─── Thread ───────────────────────────────────────────────────────────────────

/// `GET /comments/:lessonId`
pub async fn thread<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  viewer: Option<Actor>,
  Path(lesson_id): Path<Uuid>,
) -> Result<Json<Vec<CommentNode>>, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  let viewer = viewer.map(|Actor(a)| a);
  visible_lesson(state.store.as_ref(), lesson_id, viewer.as_ref()).await?;

  let comments = state
    .store
    .list_comments(lesson_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(build_tree(&comments)))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  #[serde(alias = "subjectId")]
  pub lesson_id: Uuid,
  #[serde(default)]
  pub body:      String,
  pub parent_id: Option<Uuid>,
}

/// `POST /comments` returns 201 + `{"success":true,"commentId":"…"}`.
///
/// A reply must name a root comment on the same lesson.
pub async fn create<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  Actor(actor): Actor,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  let text = body.body.trim();
  if text.is_empty() {
    return Err(lore_core::Error::MissingField("body").into());
  }

  visible_lesson(state.store.as_ref(), body.lesson_id, Some(&actor)).await?;

  if let Some(parent_id) = body.parent_id {
    let parent = state
      .store
      .get_comment(parent_id)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| ApiError::NotFound(format!("comment {parent_id} not found")))?;
    if parent.lesson_id != body.lesson_id {
      return Err(ApiError::BadRequest(
        "parent comment belongs to a different lesson".to_owned(),
      ));
    }
    if !parent.is_root() {
      return Err(ApiError::BadRequest("replies cannot be nested".to_owned()));
    }
  }

  let (author_name, author_image) = state
    .store
    .get_user_by_email(&actor)
    .await
    .map_err(ApiError::store)?
    .map(|u| (u.name, u.photo_url))
    .unwrap_or_default();

  let comment = state
    .store
    .add_comment(NewComment {
      lesson_id: body.lesson_id,
      body: text.to_owned(),
      parent_id: body.parent_id,
      author_email: actor,
      author_name,
      author_image,
    })
    .await
    .map_err(ApiError::store)?;

  tracing::info!(
    comment_id = %comment.comment_id,
    lesson_id = %comment.lesson_id,
    reply = comment.parent_id.is_some(),
    "added comment"
  );
  Ok((
    StatusCode::CREATED,
    Json(json!({ "success": true, "commentId": comment.comment_id })),
  ))
}

// ─── Like ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeBody {
  pub comment_id: Uuid,
}

async fn toggle_comment_like<S>(
  store: &S,
  comment_id: Uuid,
  actor: &ActorId,
) -> Result<Json<Value>, ApiError>
where
  S: LessonStore,
{
  let comment = store
    .get_comment(comment_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("comment {comment_id} not found")))?;
  visible_lesson(store, comment.lesson_id, Some(actor)).await?;

  let outcome = store
    .toggle_like(ReactionTarget::Comment, comment_id, actor)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("comment {comment_id} not found")))?;

  tracing::info!(comment_id = %comment_id, actor = %actor, liked = outcome.active, "toggled comment like");
  Ok(Json(json!({ "liked": outcome.active, "likesCount": outcome.count })))
}

/// `PATCH /comments/like/:id`
pub async fn like_by_path<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  Actor(actor): Actor,
  Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  toggle_comment_like(state.store.as_ref(), id, &actor).await
}

/// `POST /comments/like` with body `{"commentId":"…"}`
pub async fn like_by_body<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  Actor(actor): Actor,
  Json(body): Json<LikeBody>,
) -> Result<Json<Value>, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  toggle_comment_like(state.store.as_ref(), body.comment_id, &actor).await
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /comments/:id`
pub async fn remove<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  Actor(actor): Actor,
  Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  let comment = state
    .store
    .get_comment(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("comment {id} not found")))?;

  ensure_owner(&actor, &comment.author_email)?;

  state.store.delete_comment(id).await.map_err(ApiError::store)?;
  tracing::info!(comment_id = %id, "deleted comment");
  Ok(Json(json!({ "success": true })))
}
