//! Handlers for `/lesson-reports` endpoints.
//!
//! Any identified actor may report a lesson; only admins see or dismiss the
//! reports.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use lore_core::{
  identity::IdentityVerifier,
  payment::PaymentProcessor,
  report::{NewReport, ReportedLesson},
  store::LessonStore,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
  AppState,
  auth::{Actor, Admin, visible_lesson},
  error::ApiError,
  extract::{Json, Path},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub lesson_id: Uuid,
  #[serde(default)]
  pub reason:    String,
}

/// `POST /lesson-reports` returns 201 + the stored report.
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
  let reason = body.reason.trim();
  if reason.is_empty() {
    return Err(lore_core::Error::MissingField("reason").into());
  }

  visible_lesson(state.store.as_ref(), body.lesson_id, Some(&actor)).await?;

  let report = state
    .store
    .add_report(NewReport {
      lesson_id:      body.lesson_id,
      reporter_email: actor,
      reason:         reason.to_owned(),
    })
    .await
    .map_err(ApiError::store)?;

  tracing::info!(lesson_id = %report.lesson_id, report_id = %report.report_id, "lesson reported");
  Ok((StatusCode::CREATED, Json(report)))
}

/// `GET /lesson-reports`: reported lessons, most reported first.
pub async fn list<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  _admin: Admin,
) -> Result<Json<Vec<ReportedLesson>>, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  let reported = state
    .store
    .reported_lessons()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(reported))
}

/// `DELETE /lesson-reports/:lessonId`: drop every report on a lesson.
pub async fn dismiss<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  Admin(admin): Admin,
  Path(lesson_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError>
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  let removed = state
    .store
    .clear_reports(lesson_id)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(lesson_id = %lesson_id, admin = %admin.email, removed, "dismissed reports");
  Ok(Json(json!({ "success": true, "removed": removed })))
}
