//! [`SqliteStore`]: the SQLite implementation of [`LessonStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use lore_core::{
  actor::ActorId,
  comment::{Comment, NewComment},
  lesson::{Lesson, LessonQuery, NewLesson},
  payment::Transaction,
  reaction::{Favorite, ReactionTarget, ToggleOutcome},
  report::{LessonReport, NewReport, ReportedLesson},
  store::LessonStore,
  user::{NewUser, Role, User},
};

use crate::{
  encode::{
    COMMENT_COLUMNS, LESSON_COLUMNS, RawComment, RawFavorite, RawLesson, RawReport,
    RawUser, USER_COLUMNS, decode_role, encode_access_level, encode_dt, encode_role,
    encode_transaction, encode_uuid, encode_visibility, now,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Lore store backed by a single SQLite file.
///
/// Cheap to clone; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row fetch helpers (run on the connection thread) ───────────────────────

fn fetch_user_by_email(
  conn: &rusqlite::Connection,
  email: &str,
) -> rusqlite::Result<Option<RawUser>> {
  conn
    .query_row(
      &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
      rusqlite::params![email],
      RawUser::from_row,
    )
    .optional()
}

fn fetch_lesson(
  conn: &rusqlite::Connection,
  id: &str,
) -> rusqlite::Result<Option<RawLesson>> {
  conn
    .query_row(
      &format!("SELECT {LESSON_COLUMNS} FROM lessons l WHERE l.lesson_id = ?1"),
      rusqlite::params![id],
      RawLesson::from_row,
    )
    .optional()
}

fn fetch_comment(
  conn: &rusqlite::Connection,
  id: &str,
) -> rusqlite::Result<Option<RawComment>> {
  conn
    .query_row(
      &format!("SELECT {COMMENT_COLUMNS} FROM comments c WHERE c.comment_id = ?1"),
      rusqlite::params![id],
      RawComment::from_row,
    )
    .optional()
}

/// Table names backing the likers set of each reaction target:
/// `(subject table, likes table, key column)`.
fn like_tables(target: ReactionTarget) -> (&'static str, &'static str, &'static str) {
  match target {
    ReactionTarget::Lesson => ("lessons", "lesson_likes", "lesson_id"),
    ReactionTarget::Comment => ("comments", "comment_likes", "comment_id"),
  }
}

// ─── LessonStore impl ────────────────────────────────────────────────────────

impl LessonStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<Option<User>> {
    let user = User {
      user_id:     Uuid::new_v4(),
      email:       input.email,
      name:        input.name,
      photo_url:   input.photo_url,
      role:        Role::User,
      is_premium:  false,
      premium_at:  None,
      transaction: None,
      created_at:  now(),
    };

    let id_str    = encode_uuid(user.user_id);
    let email     = user.email.as_str().to_owned();
    let name      = user.name.clone();
    let photo_url = user.photo_url.clone();
    let role_str  = encode_role(user.role);
    let at_str    = encode_dt(user.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO users (user_id, email, name, photo_url, role, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT (email) DO NOTHING",
          rusqlite::params![id_str, email, name, photo_url, role_str, at_str],
        )?)
      })
      .await?;

    Ok((inserted == 1).then_some(user))
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
            rusqlite::params![id_str],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn get_user_by_email(&self, email: &ActorId) -> Result<Option<User>> {
    let email = email.as_str().to_owned();

    let raw = self
      .conn
      .call(move |conn| Ok(fetch_user_by_email(conn, &email)?))
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, rowid ASC"
        ))?;
        let rows = stmt
          .query_map([], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn toggle_role(&self, id: Uuid) -> Result<Option<Role>> {
    let id_str = encode_uuid(id);

    let role: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "UPDATE users
             SET role = CASE role WHEN 'admin' THEN 'user' ELSE 'admin' END
             WHERE user_id = ?1
             RETURNING role",
            rusqlite::params![id_str],
            |r| r.get(0),
          )
          .optional()?)
      })
      .await?;

    role.as_deref().map(decode_role).transpose()
  }

  async fn delete_user(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM users WHERE user_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  async fn grant_premium(
    &self,
    email: &ActorId,
    transaction: &Transaction,
  ) -> Result<User> {
    let id_str   = encode_uuid(Uuid::new_v4());
    let email    = email.as_str().to_owned();
    let at_str   = encode_dt(now());
    let tx_json  = encode_transaction(transaction)?;
    let tx_id    = transaction.id.clone();
    let role_str = encode_role(Role::User);

    let lookup = email.clone();
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        // Re-applying the same transaction keeps the original timestamps.
        tx.execute(
          "INSERT INTO users (
             user_id, email, role, is_premium, premium_at,
             transaction_json, transaction_id, created_at
           ) VALUES (?1, ?2, ?3, 1, ?4, ?5, ?6, ?4)
           ON CONFLICT (email) DO UPDATE SET
             is_premium       = 1,
             premium_at       = CASE WHEN users.transaction_id IS excluded.transaction_id
                                     THEN users.premium_at ELSE excluded.premium_at END,
             transaction_json = CASE WHEN users.transaction_id IS excluded.transaction_id
                                     THEN users.transaction_json ELSE excluded.transaction_json END,
             transaction_id   = excluded.transaction_id",
          rusqlite::params![id_str, email, role_str, at_str, tx_json, tx_id],
        )?;
        let raw = fetch_user_by_email(&tx, &email)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw
      .ok_or_else(|| Error::MissingRow(format!("user {lookup}")))?
      .into_user()
  }

  // ── Lessons ───────────────────────────────────────────────────────────────

  async fn add_lesson(&self, input: NewLesson) -> Result<Lesson> {
    input.validate()?;

    let lesson = Lesson {
      lesson_id:      Uuid::new_v4(),
      title:          input.title,
      description:    input.description,
      category:       input.category,
      emotional_tone: input.emotional_tone,
      image:          input.image,
      visibility:     input.visibility,
      access_level:   input.access_level,
      author_email:   input.author_email,
      author_name:    input.author_name,
      author_image:   input.author_image,
      is_featured:    false,
      likes:          Vec::new(),
      likes_count:    0,
      created_at:     now(),
    };

    let id_str       = encode_uuid(lesson.lesson_id);
    let title        = lesson.title.clone();
    let description  = lesson.description.clone();
    let category     = lesson.category.clone();
    let tone         = lesson.emotional_tone.clone();
    let image        = lesson.image.clone();
    let visibility   = encode_visibility(lesson.visibility);
    let access       = encode_access_level(lesson.access_level);
    let author_email = lesson.author_email.as_str().to_owned();
    let author_name  = lesson.author_name.clone();
    let author_image = lesson.author_image.clone();
    let at_str       = encode_dt(lesson.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO lessons (
             lesson_id, title, description, category, emotional_tone, image,
             visibility, access_level, author_email, author_name, author_image,
             is_featured, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 0, ?12)",
          rusqlite::params![
            id_str,
            title,
            description,
            category,
            tone,
            image,
            visibility,
            access,
            author_email,
            author_name,
            author_image,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(lesson)
  }

  async fn get_lesson(&self, id: Uuid) -> Result<Option<Lesson>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| Ok(fetch_lesson(conn, &id_str)?))
      .await?;

    raw.map(RawLesson::into_lesson).transpose()
  }

  async fn list_lessons(&self, query: &LessonQuery) -> Result<Vec<Lesson>> {
    let category        = query.category.clone();
    let tone            = query.emotional_tone.clone();
    let featured        = query.featured;
    let author          = query.author.as_ref().map(|a| a.as_str().to_owned());
    let include_private = query.include_private;
    // SQLite treats a negative LIMIT as "no limit".
    let limit_val       = query.limit.map_or(-1, |l| l as i64);
    let offset_val      = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawLesson> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {LESSON_COLUMNS}
           FROM lessons l
           WHERE (?1 IS NULL OR l.category = ?1)
             AND (?2 IS NULL OR l.emotional_tone = ?2)
             AND (?3 IS NULL OR l.is_featured = ?3)
             AND (?4 IS NULL OR l.author_email = ?4)
             AND (?5 OR l.visibility = 'public')
           ORDER BY l.created_at DESC, l.rowid DESC
           LIMIT ?6 OFFSET ?7"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              category,
              tone,
              featured,
              author,
              include_private,
              limit_val,
              offset_val,
            ],
            RawLesson::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLesson::into_lesson).collect()
  }

  async fn delete_lesson(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM lessons WHERE lesson_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  async fn toggle_featured(&self, id: Uuid) -> Result<Option<bool>> {
    let id_str = encode_uuid(id);

    let featured: Option<bool> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "UPDATE lessons SET is_featured = NOT is_featured
             WHERE lesson_id = ?1
             RETURNING is_featured",
            rusqlite::params![id_str],
            |r| r.get(0),
          )
          .optional()?)
      })
      .await?;

    Ok(featured)
  }

  // ── Reactions ─────────────────────────────────────────────────────────────

  async fn toggle_like(
    &self,
    target:     ReactionTarget,
    subject_id: Uuid,
    actor:      &ActorId,
  ) -> Result<Option<ToggleOutcome>> {
    let (subjects, likes, key) = like_tables(target);
    let id_str = encode_uuid(subject_id);
    let actor  = actor.as_str().to_owned();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists = tx
          .query_row(
            &format!("SELECT 1 FROM {subjects} WHERE {key} = ?1"),
            rusqlite::params![id_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(None);
        }

        let removed = tx.execute(
          &format!("DELETE FROM {likes} WHERE {key} = ?1 AND actor = ?2"),
          rusqlite::params![id_str, actor],
        )?;
        if removed == 0 {
          tx.execute(
            &format!("INSERT INTO {likes} ({key}, actor) VALUES (?1, ?2)"),
            rusqlite::params![id_str, actor],
          )?;
        }

        let count: i64 = tx.query_row(
          &format!("SELECT COUNT(*) FROM {likes} WHERE {key} = ?1"),
          rusqlite::params![id_str],
          |r| r.get(0),
        )?;
        tx.commit()?;

        Ok(Some(ToggleOutcome {
          active: removed == 0,
          count:  count as usize,
        }))
      })
      .await?;

    Ok(outcome)
  }

  async fn toggle_favorite(
    &self,
    lesson_id: Uuid,
    actor:     &ActorId,
  ) -> Result<Option<bool>> {
    let favorite_id = encode_uuid(Uuid::new_v4());
    let lesson_str  = encode_uuid(lesson_id);
    let actor       = actor.as_str().to_owned();
    let at_str      = encode_dt(now());

    let favorited = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let display: Option<(String, Option<String>, String)> = tx
          .query_row(
            "SELECT title, image, category FROM lessons WHERE lesson_id = ?1",
            rusqlite::params![lesson_str],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
          )
          .optional()?;
        let Some((title, image, category)) = display else {
          return Ok(None);
        };

        let removed = tx.execute(
          "DELETE FROM favorites WHERE lesson_id = ?1 AND actor = ?2",
          rusqlite::params![lesson_str, actor],
        )?;
        if removed == 0 {
          tx.execute(
            "INSERT INTO favorites (
               favorite_id, lesson_id, actor, lesson_title, lesson_image,
               lesson_category, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![favorite_id, lesson_str, actor, title, image, category, at_str],
          )?;
        }
        tx.commit()?;

        Ok(Some(removed == 0))
      })
      .await?;

    Ok(favorited)
  }

  async fn list_favorites(&self, actor: &ActorId) -> Result<Vec<Favorite>> {
    let actor = actor.as_str().to_owned();

    let raws: Vec<RawFavorite> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT favorite_id, lesson_id, actor, lesson_title, lesson_image,
                  lesson_category, created_at
           FROM favorites
           WHERE actor = ?1
           ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![actor], |row| {
            Ok(RawFavorite {
              favorite_id:     row.get(0)?,
              lesson_id:       row.get(1)?,
              actor:           row.get(2)?,
              lesson_title:    row.get(3)?,
              lesson_image:    row.get(4)?,
              lesson_category: row.get(5)?,
              created_at:      row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFavorite::into_favorite).collect()
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn add_comment(&self, input: NewComment) -> Result<Comment> {
    let comment = Comment {
      comment_id:   Uuid::new_v4(),
      lesson_id:    input.lesson_id,
      body:         input.body,
      parent_id:    input.parent_id,
      author_email: input.author_email,
      author_name:  input.author_name,
      author_image: input.author_image,
      likes:        Vec::new(),
      likes_count:  0,
      created_at:   now(),
    };

    let id_str       = encode_uuid(comment.comment_id);
    let lesson_str   = encode_uuid(comment.lesson_id);
    let parent_str   = comment.parent_id.map(encode_uuid);
    let body         = comment.body.clone();
    let author_email = comment.author_email.as_str().to_owned();
    let author_name  = comment.author_name.clone();
    let author_image = comment.author_image.clone();
    let at_str       = encode_dt(comment.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (
             comment_id, lesson_id, parent_id, body,
             author_email, author_name, author_image, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            lesson_str,
            parent_str,
            body,
            author_email,
            author_name,
            author_image,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(comment)
  }

  async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| Ok(fetch_comment(conn, &id_str)?))
      .await?;

    raw.map(RawComment::into_comment).transpose()
  }

  async fn list_comments(&self, lesson_id: Uuid) -> Result<Vec<Comment>> {
    let lesson_str = encode_uuid(lesson_id);

    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLUMNS}
           FROM comments c
           WHERE c.lesson_id = ?1
           ORDER BY c.created_at ASC, c.rowid ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![lesson_str], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  async fn delete_comment(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM comments WHERE comment_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  async fn add_report(&self, input: NewReport) -> Result<LessonReport> {
    let report = LessonReport {
      report_id:      Uuid::new_v4(),
      lesson_id:      input.lesson_id,
      reporter_email: input.reporter_email,
      reason:         input.reason,
      created_at:     now(),
    };

    let id_str     = encode_uuid(report.report_id);
    let lesson_str = encode_uuid(report.lesson_id);
    let reporter   = report.reporter_email.as_str().to_owned();
    let reason     = report.reason.clone();
    let at_str     = encode_dt(report.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO lesson_reports (report_id, lesson_id, reporter_email, reason, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, lesson_str, reporter, reason, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(report)
  }

  async fn reported_lessons(&self) -> Result<Vec<ReportedLesson>> {
    let rows: Vec<(RawReport, String)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT r.report_id, r.lesson_id, r.reporter_email, r.reason,
                  r.created_at, l.title
           FROM lesson_reports r
           JOIN lessons l ON l.lesson_id = r.lesson_id
           ORDER BY r.created_at ASC, r.rowid ASC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok((
              RawReport {
                report_id:      row.get(0)?,
                lesson_id:      row.get(1)?,
                reporter_email: row.get(2)?,
                reason:         row.get(3)?,
                created_at:     row.get(4)?,
              },
              row.get(5)?,
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut grouped: Vec<ReportedLesson> = Vec::new();
    for (raw, title) in rows {
      let report = raw.into_report()?;
      match grouped.iter_mut().find(|g| g.lesson_id == report.lesson_id) {
        Some(group) => group.reports.push(report),
        None => grouped.push(ReportedLesson {
          lesson_id:    report.lesson_id,
          lesson_title: title,
          report_count: 0,
          reports:      vec![report],
        }),
      }
    }
    for group in &mut grouped {
      group.report_count = group.reports.len();
    }
    grouped.sort_by(|a, b| b.report_count.cmp(&a.report_count));

    Ok(grouped)
  }

  async fn clear_reports(&self, lesson_id: Uuid) -> Result<usize> {
    let lesson_str = encode_uuid(lesson_id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM lesson_reports WHERE lesson_id = ?1",
          rusqlite::params![lesson_str],
        )?)
      })
      .await?;

    Ok(removed)
  }
}
