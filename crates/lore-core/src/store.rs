//! The `LessonStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `lore-store-sqlite`).
//! Higher layers (`lore-api`, `lore-server`) depend on this abstraction, not
//! on any concrete backend.
//!
//! Lookups that can miss return `Option` (or `bool` for deletes) rather than
//! an error, so callers decide how a miss is surfaced.

use std::future::Future;

use uuid::Uuid;

use crate::{
  actor::ActorId,
  comment::{Comment, NewComment},
  lesson::{Lesson, LessonQuery, NewLesson},
  payment::Transaction,
  reaction::{Favorite, ReactionTarget, ToggleOutcome},
  report::{LessonReport, NewReport, ReportedLesson},
  user::{NewUser, Role, User},
};

/// Abstraction over a Lore storage backend.
///
/// Every toggle and upsert is a single atomic operation against the current
/// persisted state; there are no multi-record transactions beyond that.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait LessonStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Register a user with role [`Role::User`]. Returns `None` if a user with
  /// the same email already exists.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn get_user_by_email<'a>(
    &'a self,
    email: &'a ActorId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Flip a user's role between user and admin. Returns the new role, or
  /// `None` if the user does not exist.
  fn toggle_role(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Role>, Self::Error>> + Send + '_;

  /// Delete a user. Returns `false` if nothing was deleted.
  fn delete_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Mark `email` as premium and attach `transaction`, creating the user if
  /// needed, and return the resulting record.
  ///
  /// Idempotent: if the user already carries a transaction with the same id,
  /// the stored premium and payment timestamps are kept.
  fn grant_premium<'a>(
    &'a self,
    email: &'a ActorId,
    transaction: &'a Transaction,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + 'a;

  // ── Lessons ───────────────────────────────────────────────────────────

  fn add_lesson(
    &self,
    input: NewLesson,
  ) -> impl Future<Output = Result<Lesson, Self::Error>> + Send + '_;

  fn get_lesson(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Lesson>, Self::Error>> + Send + '_;

  /// Newest first.
  fn list_lessons<'a>(
    &'a self,
    query: &'a LessonQuery,
  ) -> impl Future<Output = Result<Vec<Lesson>, Self::Error>> + Send + 'a;

  /// Delete a lesson together with its likes, favorites, comments and
  /// reports. Returns `false` if nothing was deleted.
  fn delete_lesson(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Flip a lesson's featured flag. Returns the new value, or `None` if the
  /// lesson does not exist.
  fn toggle_featured(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<bool>, Self::Error>> + Send + '_;

  // ── Reactions ─────────────────────────────────────────────────────────

  /// Add `actor` to the subject's likers set if absent, remove it otherwise.
  /// Returns `None` if the subject does not exist.
  fn toggle_like<'a>(
    &'a self,
    target: ReactionTarget,
    subject_id: Uuid,
    actor: &'a ActorId,
  ) -> impl Future<Output = Result<Option<ToggleOutcome>, Self::Error>> + Send + 'a;

  /// Insert a favorite for `(lesson_id, actor)` if absent, delete it
  /// otherwise. Returns whether the lesson is now a favorite, or `None` if
  /// the lesson does not exist.
  fn toggle_favorite<'a>(
    &'a self,
    lesson_id: Uuid,
    actor: &'a ActorId,
  ) -> impl Future<Output = Result<Option<bool>, Self::Error>> + Send + 'a;

  /// Newest first.
  fn list_favorites<'a>(
    &'a self,
    actor: &'a ActorId,
  ) -> impl Future<Output = Result<Vec<Favorite>, Self::Error>> + Send + 'a;

  // ── Comments ──────────────────────────────────────────────────────────

  fn add_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  fn get_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  /// All comments on a lesson, oldest first.
  fn list_comments(
    &self,
    lesson_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  /// Delete a comment and its replies. Returns `false` if nothing was
  /// deleted.
  fn delete_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Reports ───────────────────────────────────────────────────────────

  fn add_report(
    &self,
    input: NewReport,
  ) -> impl Future<Output = Result<LessonReport, Self::Error>> + Send + '_;

  /// Lessons with at least one report, most-reported first.
  fn reported_lessons(
    &self,
  ) -> impl Future<Output = Result<Vec<ReportedLesson>, Self::Error>> + Send + '_;

  /// Dismiss all reports on a lesson. Returns how many were removed.
  fn clear_reports(
    &self,
    lesson_id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
