//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that lexical order is chronological order. UUIDs are stored as
//! hyphenated lowercase strings. Likers sets are read back as the JSON array
//! produced by `json_group_array`.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use lore_core::{
  actor::ActorId,
  comment::Comment,
  lesson::{AccessLevel, Lesson, Visibility},
  payment::Transaction,
  reaction::Favorite,
  report::LessonReport,
  user::{Role, User},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ────────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str { r.as_str() }

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "user" => Ok(Role::User),
    "admin" => Ok(Role::Admin),
    other => Err(unknown("role", other)),
  }
}

pub fn encode_visibility(v: Visibility) -> &'static str {
  match v {
    Visibility::Public => "public",
    Visibility::Private => "private",
  }
}

pub fn decode_visibility(s: &str) -> Result<Visibility> {
  match s {
    "public" => Ok(Visibility::Public),
    "private" => Ok(Visibility::Private),
    other => Err(unknown("visibility", other)),
  }
}

pub fn encode_access_level(a: AccessLevel) -> &'static str {
  match a {
    AccessLevel::Free => "free",
    AccessLevel::Premium => "premium",
  }
}

pub fn decode_access_level(s: &str) -> Result<AccessLevel> {
  match s {
    "free" => Ok(AccessLevel::Free),
    "premium" => Ok(AccessLevel::Premium),
    other => Err(unknown("access level", other)),
  }
}

fn unknown(kind: &'static str, value: &str) -> Error {
  Error::UnknownVariant { kind, value: value.to_owned() }
}

// ─── Structured columns ───────────────────────────────────────────────────────

pub fn encode_transaction(t: &Transaction) -> Result<String> {
  Ok(serde_json::to_string(t)?)
}

pub fn decode_transaction(s: &str) -> Result<Transaction> {
  Ok(serde_json::from_str(s)?)
}

/// Decode a `json_group_array(actor)` result. SQLite yields `[]` for an empty
/// group; `NULL` is treated the same way.
pub fn decode_likers(s: Option<&str>) -> Result<Vec<ActorId>> {
  let raw: Vec<String> = match s {
    Some(json) => serde_json::from_str(json)?,
    None => Vec::new(),
  };
  let mut likers = raw
    .into_iter()
    .map(ActorId::new)
    .collect::<lore_core::Result<Vec<_>>>()?;
  likers.sort();
  Ok(likers)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:          String,
  pub email:            String,
  pub name:             Option<String>,
  pub photo_url:        Option<String>,
  pub role:             String,
  pub is_premium:       bool,
  pub premium_at:       Option<String>,
  pub transaction_json: Option<String>,
  pub created_at:       String,
}

pub const USER_COLUMNS: &str = "user_id, email, name, photo_url, role, \
  is_premium, premium_at, transaction_json, created_at";

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:          row.get(0)?,
      email:            row.get(1)?,
      name:             row.get(2)?,
      photo_url:        row.get(3)?,
      role:             row.get(4)?,
      is_premium:       row.get(5)?,
      premium_at:       row.get(6)?,
      transaction_json: row.get(7)?,
      created_at:       row.get(8)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:     decode_uuid(&self.user_id)?,
      email:       ActorId::new(&self.email)?,
      name:        self.name,
      photo_url:   self.photo_url,
      role:        decode_role(&self.role)?,
      is_premium:  self.is_premium,
      premium_at:  self.premium_at.as_deref().map(decode_dt).transpose()?,
      transaction: self
        .transaction_json
        .as_deref()
        .map(decode_transaction)
        .transpose()?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read from a `lessons` row plus its aggregated likers.
pub struct RawLesson {
  pub lesson_id:      String,
  pub title:          String,
  pub description:    String,
  pub category:       String,
  pub emotional_tone: String,
  pub image:          Option<String>,
  pub visibility:     String,
  pub access_level:   String,
  pub author_email:   String,
  pub author_name:    Option<String>,
  pub author_image:   Option<String>,
  pub is_featured:    bool,
  pub created_at:     String,
  pub likes_json:     Option<String>,
}

/// Select list for lessons aliased as `l`.
pub const LESSON_COLUMNS: &str = "l.lesson_id, l.title, l.description, \
  l.category, l.emotional_tone, l.image, l.visibility, l.access_level, \
  l.author_email, l.author_name, l.author_image, l.is_featured, l.created_at, \
  (SELECT json_group_array(actor) FROM lesson_likes k WHERE k.lesson_id = l.lesson_id)";

impl RawLesson {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      lesson_id:      row.get(0)?,
      title:          row.get(1)?,
      description:    row.get(2)?,
      category:       row.get(3)?,
      emotional_tone: row.get(4)?,
      image:          row.get(5)?,
      visibility:     row.get(6)?,
      access_level:   row.get(7)?,
      author_email:   row.get(8)?,
      author_name:    row.get(9)?,
      author_image:   row.get(10)?,
      is_featured:    row.get(11)?,
      created_at:     row.get(12)?,
      likes_json:     row.get(13)?,
    })
  }

  pub fn into_lesson(self) -> Result<Lesson> {
    let likes = decode_likers(self.likes_json.as_deref())?;
    Ok(Lesson {
      lesson_id:      decode_uuid(&self.lesson_id)?,
      title:          self.title,
      description:    self.description,
      category:       self.category,
      emotional_tone: self.emotional_tone,
      image:          self.image,
      visibility:     decode_visibility(&self.visibility)?,
      access_level:   decode_access_level(&self.access_level)?,
      author_email:   ActorId::new(&self.author_email)?,
      author_name:    self.author_name,
      author_image:   self.author_image,
      is_featured:    self.is_featured,
      likes_count:    likes.len(),
      likes,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read from a `comments` row plus its aggregated likers.
pub struct RawComment {
  pub comment_id:   String,
  pub lesson_id:    String,
  pub parent_id:    Option<String>,
  pub body:         String,
  pub author_email: String,
  pub author_name:  Option<String>,
  pub author_image: Option<String>,
  pub created_at:   String,
  pub likes_json:   Option<String>,
}

/// Select list for comments aliased as `c`.
pub const COMMENT_COLUMNS: &str = "c.comment_id, c.lesson_id, c.parent_id, \
  c.body, c.author_email, c.author_name, c.author_image, c.created_at, \
  (SELECT json_group_array(actor) FROM comment_likes k WHERE k.comment_id = c.comment_id)";

impl RawComment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comment_id:   row.get(0)?,
      lesson_id:    row.get(1)?,
      parent_id:    row.get(2)?,
      body:         row.get(3)?,
      author_email: row.get(4)?,
      author_name:  row.get(5)?,
      author_image: row.get(6)?,
      created_at:   row.get(7)?,
      likes_json:   row.get(8)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    let likes = decode_likers(self.likes_json.as_deref())?;
    Ok(Comment {
      comment_id:   decode_uuid(&self.comment_id)?,
      lesson_id:    decode_uuid(&self.lesson_id)?,
      body:         self.body,
      parent_id:    self.parent_id.as_deref().map(decode_uuid).transpose()?,
      author_email: ActorId::new(&self.author_email)?,
      author_name:  self.author_name,
      author_image: self.author_image,
      likes_count:  likes.len(),
      likes,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read from a `favorites` row.
pub struct RawFavorite {
  pub favorite_id:     String,
  pub lesson_id:       String,
  pub actor:           String,
  pub lesson_title:    String,
  pub lesson_image:    Option<String>,
  pub lesson_category: String,
  pub created_at:      String,
}

impl RawFavorite {
  pub fn into_favorite(self) -> Result<Favorite> {
    Ok(Favorite {
      favorite_id:     decode_uuid(&self.favorite_id)?,
      lesson_id:       decode_uuid(&self.lesson_id)?,
      actor:           ActorId::new(&self.actor)?,
      lesson_title:    self.lesson_title,
      lesson_image:    self.lesson_image,
      lesson_category: self.lesson_category,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read from a `lesson_reports` row.
pub struct RawReport {
  pub report_id:      String,
  pub lesson_id:      String,
  pub reporter_email: String,
  pub reason:         String,
  pub created_at:     String,
}

impl RawReport {
  pub fn into_report(self) -> Result<LessonReport> {
    Ok(LessonReport {
      report_id:      decode_uuid(&self.report_id)?,
      lesson_id:      decode_uuid(&self.lesson_id)?,
      reporter_email: ActorId::new(&self.reporter_email)?,
      reason:         self.reason,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}
