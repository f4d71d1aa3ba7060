//! Comments and replies on lessons.
//!
//! Comments are stored flat; a reply carries the id of the root comment it
//! answers. Replies to replies are not part of the display model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::actor::ActorId;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
  pub comment_id:   Uuid,
  /// The lesson under discussion.
  pub lesson_id:    Uuid,
  pub body:         String,
  pub parent_id:    Option<Uuid>,
  pub author_email: ActorId,
  pub author_name:  Option<String>,
  pub author_image: Option<String>,
  pub likes:        Vec<ActorId>,
  /// Always `likes.len()`; never stored.
  pub likes_count:  usize,
  pub created_at:   DateTime<Utc>,
}

impl Comment {
  pub fn is_root(&self) -> bool { self.parent_id.is_none() }
}

#[derive(Debug, Clone)]
pub struct NewComment {
  pub lesson_id:    Uuid,
  pub body:         String,
  pub parent_id:    Option<Uuid>,
  pub author_email: ActorId,
  pub author_name:  Option<String>,
  pub author_image: Option<String>,
}

/// A root comment with its direct replies, as rendered to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentNode {
  #[serde(flatten)]
  pub comment: Comment,
  pub replies: Vec<Comment>,
}
