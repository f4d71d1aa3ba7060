//! Toggleable reactions: likes on lessons and comments, and favorites.
//!
//! A like is membership of the actor in the subject's likers set; a favorite
//! is an independent record unique on `(lesson, actor)`. Either way a toggle
//! flips membership against the current persisted state in one atomic step.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::actor::ActorId;

/// The kind of record owning a likers set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionTarget {
  Lesson,
  Comment,
}

/// The state of a likers set right after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
  /// `true` if the actor is now a member.
  pub active: bool,
  /// Cardinality of the set after the toggle.
  pub count:  usize,
}

/// A lesson saved by an actor, with display fields copied from the lesson.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
  pub favorite_id:     Uuid,
  pub lesson_id:       Uuid,
  pub actor:           ActorId,
  pub lesson_title:    String,
  pub lesson_image:    Option<String>,
  pub lesson_category: String,
  pub created_at:      DateTime<Utc>,
}
