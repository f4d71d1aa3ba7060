//! Lesson reports raised by users for admin review.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::actor::ActorId;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonReport {
  pub report_id:      Uuid,
  pub lesson_id:      Uuid,
  pub reporter_email: ActorId,
  pub reason:         String,
  pub created_at:     DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReport {
  pub lesson_id:      Uuid,
  pub reporter_email: ActorId,
  pub reason:         String,
}

/// All open reports against one lesson.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedLesson {
  pub lesson_id:    Uuid,
  pub lesson_title: String,
  pub report_count: usize,
  pub reports:      Vec<LessonReport>,
}
