//! Authorization gate: bearer-token identity, admin role, and ownership.
//!
//! The actor's identity is only ever the email the identity verifier returns
//! for the presented token; request bodies never name the actor.
//!
//! A private lesson exists only for its author: every lookup on behalf of a
//! viewer goes through [`visible_lesson`].

use axum::{
  extract::{FromRequestParts, OptionalFromRequestParts},
  http::{HeaderMap, header, request::Parts},
};
use lore_core::{
  actor::ActorId,
  identity::IdentityVerifier,
  lesson::{Lesson, Visibility},
  payment::PaymentProcessor,
  store::LessonStore,
  user::User,
};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// An authenticated actor, extracted from `Authorization: Bearer <token>`.
pub struct Actor(pub ActorId);

/// An authenticated actor whose stored role is admin.
pub struct Admin(pub User);

/// Return the token of a well-formed `Bearer` authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.trim().split_once(' ')?;
  if !scheme.eq_ignore_ascii_case("bearer") {
    return None;
  }
  let token = token.trim();
  (!token.is_empty() && !token.contains(' ')).then_some(token)
}

/// Verify the request's bearer credential with `verifier`.
pub async fn verify_identity<I>(headers: &HeaderMap, verifier: &I) -> Result<ActorId, ApiError>
where
  I: IdentityVerifier,
{
  let token = bearer_token(headers).ok_or(ApiError::Unauthorized)?;
  verifier.verify(token).await?.ok_or(ApiError::Unauthorized)
}

/// Whether `actor` holds the admin role. Unknown actors are not admins.
pub async fn is_admin<S>(store: &S, actor: &ActorId) -> Result<bool, ApiError>
where
  S: LessonStore,
{
  let user = store
    .get_user_by_email(actor)
    .await
    .map_err(ApiError::store)?;
  Ok(user.is_some_and(|u| u.role.is_admin()))
}

/// Fail with `Forbidden` unless `actor` is the stored `author`.
pub fn ensure_owner(actor: &ActorId, author: &ActorId) -> Result<(), ApiError> {
  if actor == author {
    Ok(())
  } else {
    Err(ApiError::Forbidden("only the author may do this".to_owned()))
  }
}

impl<S, I, P> FromRequestParts<AppState<S, I, P>> for Actor
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, I, P>,
  ) -> Result<Self, Self::Rejection> {
    verify_identity(&parts.headers, state.identity.as_ref())
      .await
      .map(Actor)
  }
}

/// Fetch lesson `id` if `viewer` may see it: public lessons for everyone,
/// private ones for their author only. Anything else is `NotFound`.
pub async fn visible_lesson<S>(
  store: &S,
  id: Uuid,
  viewer: Option<&ActorId>,
) -> Result<Lesson, ApiError>
where
  S: LessonStore,
{
  store
    .get_lesson(id)
    .await
    .map_err(ApiError::store)?
    .filter(|l| l.visibility == Visibility::Public || Some(&l.author_email) == viewer)
    .ok_or_else(|| ApiError::NotFound(format!("lesson {id} not found")))
}

/// No `Authorization` header means an anonymous viewer; a header that fails
/// verification is still rejected.
impl<S, I, P> OptionalFromRequestParts<AppState<S, I, P>> for Actor
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, I, P>,
  ) -> Result<Option<Self>, Self::Rejection> {
    if !parts.headers.contains_key(header::AUTHORIZATION) {
      return Ok(None);
    }
    <Actor as FromRequestParts<_>>::from_request_parts(parts, state)
      .await
      .map(Some)
  }
}

impl<S, I, P> FromRequestParts<AppState<S, I, P>> for Admin
where
  S: LessonStore,
  I: IdentityVerifier,
  P: PaymentProcessor,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, I, P>,
  ) -> Result<Self, Self::Rejection> {
    let Actor(actor) = <Actor as FromRequestParts<_>>::from_request_parts(parts, state).await?;
    // A missing account is reported exactly like a non-admin one.
    match state
      .store
      .get_user_by_email(&actor)
      .await
      .map_err(ApiError::store)?
    {
      Some(user) if user.role.is_admin() => Ok(Admin(user)),
      _ => Err(ApiError::Forbidden("admin role required".to_owned())),
    }
  }
}
