//! Registered users, their role, and their premium status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{actor::ActorId, payment::Transaction};

/// Privilege level of a user. New registrations are always [`Role::User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[default]
  User,
  Admin,
}

impl Role {
  /// The other role; used by the admin role toggle.
  pub fn toggled(self) -> Self {
    match self {
      Role::User => Role::Admin,
      Role::Admin => Role::User,
    }
  }

  pub fn is_admin(self) -> bool { matches!(self, Role::Admin) }

  pub fn as_str(self) -> &'static str {
    match self {
      Role::User => "user",
      Role::Admin => "admin",
    }
  }
}

/// A stored user record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub user_id:     Uuid,
  pub email:       ActorId,
  pub name:        Option<String>,
  pub photo_url:   Option<String>,
  pub role:        Role,
  pub is_premium:  bool,
  pub premium_at:  Option<DateTime<Utc>>,
  /// The payment that granted premium access, if any.
  pub transaction: Option<Transaction>,
  pub created_at:  DateTime<Utc>,
}

/// Input for registering a user. The email always comes from a verified
/// identity.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:     ActorId,
  pub name:      Option<String>,
  pub photo_url: Option<String>,
}
