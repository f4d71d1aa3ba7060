//! Handlers for `/lessons` endpoints.
//!
//! | Method  | Path | Auth | Notes |
//! |---------|------|------|-------|
//! | `POST`  | `/lessons` | identity | Premium lessons need a premium author |
//! | `GET`   | `/lessons` | public | `?category`, `?emotionalTone`, `?featured`, `?limit`, `?offset` |
//! | `GET`   | `/lessons/mine` | identity | Includes private lessons |
//! | `GET`   | `/lessons/featured` | public | |
//! | `GET`   | `/lessons/:id` | public | Private lessons are 404 except to their author |
//! | `DELETE`| `/lessons/:id` | author or admin | |
//! | `PATCH` | `/lessons/featured/:id` | admin | Toggle featured |
//! | `PATCH` | `/lessons/like/:id` | identity | Toggle like |

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use lore_core::{
  identity::IdentityVerifier,
  lesson::{AccessLevel, Lesson, LessonQuery, NewLesson, Visibility},
  payment::PaymentProcessor,
  reaction::ReactionTarget,
  store::LessonStore,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
  AppState,
  auth::{Actor, Admin, is_admin, visible_lesson},
  error::ApiError,
  extract::{Json, Path, Query},
};

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /lessons`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  #[serde(default)]
  pub title:          String,
  #[serde(default)]
  pub description:    String,
  #[serde(default)]
  pub category:       String,
  #[serde(default)]
  pub emotional_tone: String,
  pub image:          Option<String>,
  #[serde(default)]
  pub visibility:     Visibility,
  #[serde(default)]
  pub access_level:   AccessLevel,
}

/// `POST /lessons` returns 201 + `{"success":true,"lessonId":"…"}`.
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
  let profile = state
    .store
    .get_user_by_email(&actor)
    .await
    .map_err(ApiError::store)?;

  if body.access_level == AccessLevel::Premium
    && !profile.as_ref().is_some_and(|u| u.is_premium)
  {
    return Err(ApiError::Forbidden(
      "premium membership required to publish premium lessons".to_owned(),
    ));
  }

  let (author_name, author_image) = profile
    .map(|u| (u.name, u.photo_url))
    .unwrap_or_default();

  let input = NewLesson {
    title: body.title,
    description: body.description,
    category: body.category,
    emotional_tone: body.emotional_tone,
    image: body.image,
    visibility: body.visibility,
    access_level: body.access_level,
    author_email: actor,
    author_name,
    author_image,
  };
  input.validate()?;

  let lesson = state
    .store
    .add_lesson(input)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(lesson_id = %lesson.lesson_id, author = %lesson.author_email, "created lesson");
  Ok((
    StatusCode::CREATED,
    Json(json!({ "success": true, "lessonId": lesson.lesson_id })),
  ))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub category:       Option<String>,
  pub emotional_tone: Option<String>,
  pub featured:       Option<bool>,
  pub limit:          Option<usize>,
  pub offset:         Option<usize>,
}

/// `GET /lessons[?category=…][&emotionalTone=…][&featured=true][&limit=…][&offset=…]`
pub async fn list<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Lesson>>, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  let query = LessonQuery {
    category:        params.category,
    emotional_tone:  params.emotional_tone,
    featured:        params.featured,
    author:          None,
    include_private: false,
    limit:           params.limit,
    offset:          params.offset,
  };
  let lessons = state
    .store
    .list_lessons(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(lessons))
}

/// `GET /lessons/mine`
pub async fn mine<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  Actor(actor): Actor,
) -> Result<Json<Vec<Lesson>>, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  let query = LessonQuery {
    author: Some(actor),
    include_private: true,
    ..Default::default()
  };
  let lessons = state
    .store
    .list_lessons(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(lessons))
}

/// `GET /lessons/featured`
pub async fn featured<S, I, P>(
  State(state): State<AppState<S, I, P>>,
) -> Result<Json<Vec<Lesson>>, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  let query = LessonQuery {
    featured: Some(true),
    ..Default::default()
  };
  let lessons = state
    .store
    .list_lessons(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(lessons))
}

// ─── Get one / delete ─────────────────────────────────────────────────────────

/// `GET /lessons/:id`; a private lesson is only found by its author.
pub async fn get_one<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  viewer: Option<Actor>,
  Path(id): Path<Uuid>,
) -> Result<Json<Lesson>, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  let viewer = viewer.map(|Actor(a)| a);
  let lesson = visible_lesson(state.store.as_ref(), id, viewer.as_ref()).await?;
  Ok(Json(lesson))
}

/// `DELETE /lessons/:id`
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
  let lesson = state
    .store
    .get_lesson(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("lesson {id} not found")))?;

  if lesson.author_email != actor && !is_admin(state.store.as_ref(), &actor).await? {
    return Err(ApiError::Forbidden(
      "only the author or an admin may delete a lesson".to_owned(),
    ));
  }

  state.store.delete_lesson(id).await.map_err(ApiError::store)?;
  tracing::info!(lesson_id = %id, by = %actor, "deleted lesson");
  Ok(Json(json!({ "success": true })))
}

// ─── Toggles ──────────────────────────────────────────────────────────────────

/// `PATCH /lessons/featured/:id` returns `{"featured":bool}`.
pub async fn toggle_featured<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  _admin: Admin,
  Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  let featured = state
    .store
    .toggle_featured(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("lesson {id} not found")))?;
  Ok(Json(json!({ "featured": featured })))
}

/// `PATCH /lessons/like/:id` returns `{"liked":bool,"likesCount":n}`.
pub async fn toggle_like<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  Actor(actor): Actor,
  Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  visible_lesson(state.store.as_ref(), id, Some(&actor)).await?;
  let outcome = state
    .store
    .toggle_like(ReactionTarget::Lesson, id, &actor)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("lesson {id} not found")))?;

  tracing::info!(lesson_id = %id, actor = %actor, liked = outcome.active, "toggled lesson like");
  Ok(Json(json!({ "liked": outcome.active, "likesCount": outcome.count })))
}
