//! Lessons, the user-authored content everything else hangs off.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, actor::ActorId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
  #[default]
  Public,
  Private,
}

/// Who may read a lesson's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
  #[default]
  Free,
  Premium,
}

/// A stored lesson together with its derived like state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
  pub lesson_id:      Uuid,
  pub title:          String,
  pub description:    String,
  pub category:       String,
  pub emotional_tone: String,
  pub image:          Option<String>,
  pub visibility:     Visibility,
  pub access_level:   AccessLevel,
  pub author_email:   ActorId,
  pub author_name:    Option<String>,
  pub author_image:   Option<String>,
  pub is_featured:    bool,
  /// Actors who liked this lesson.
  pub likes:          Vec<ActorId>,
  /// Always `likes.len()`; never stored.
  pub likes_count:    usize,
  pub created_at:     DateTime<Utc>,
}

/// Input for creating a lesson. Author fields come from the verified actor
/// and their stored profile.
#[derive(Debug, Clone)]
pub struct NewLesson {
  pub title:          String,
  pub description:    String,
  pub category:       String,
  pub emotional_tone: String,
  pub image:          Option<String>,
  pub visibility:     Visibility,
  pub access_level:   AccessLevel,
  pub author_email:   ActorId,
  pub author_name:    Option<String>,
  pub author_image:   Option<String>,
}

impl NewLesson {
  /// Reject lessons missing any of the required text fields.
  pub fn validate(&self) -> Result<()> {
    let required = [
      ("title", &self.title),
      ("description", &self.description),
      ("category", &self.category),
    ];
    for (name, value) in required {
      if value.trim().is_empty() {
        return Err(Error::MissingField(name));
      }
    }
    Ok(())
  }
}

/// Parameters for [`LessonStore::list_lessons`](crate::store::LessonStore::list_lessons).
#[derive(Debug, Clone, Default)]
pub struct LessonQuery {
  pub category:        Option<String>,
  pub emotional_tone:  Option<String>,
  pub featured:        Option<bool>,
  /// Restrict to one author's lessons.
  pub author:          Option<ActorId>,
  /// If `false`, only [`Visibility::Public`] lessons are returned.
  pub include_private: bool,
  pub limit:           Option<usize>,
  pub offset:          Option<usize>,
}
