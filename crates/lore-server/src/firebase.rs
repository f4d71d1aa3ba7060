//! Identity verification against the Google Identity Toolkit.
//!
//! `POST {endpoint}/accounts:lookup?key=<api key>` with `{"idToken": …}`
//! answers with the account the token belongs to. A rejected token comes back
//! as HTTP 400 and is treated as "not verified", not as an outage.

use std::{future::Future, time::Duration};

use anyhow::Context as _;
use lore_core::{Error, Result, actor::ActorId, identity::IdentityVerifier};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

/// [`IdentityVerifier`] backed by the Identity Toolkit REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct FirebaseVerifier {
  client:   Client,
  endpoint: String,
  api_key:  String,
}

#[derive(Debug, Default, Deserialize)]
struct LookupResponse {
  #[serde(default)]
  users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
struct LookupUser {
  email: Option<String>,
}

impl FirebaseVerifier {
  pub fn new(endpoint: &str, api_key: &str) -> anyhow::Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build identity HTTP client")?;
    Ok(Self {
      client,
      endpoint: endpoint.trim_end_matches('/').to_owned(),
      api_key: api_key.to_owned(),
    })
  }

  fn url(&self) -> String { format!("{}/accounts:lookup", self.endpoint) }

  async fn lookup(&self, token: &str) -> Result<Option<ActorId>> {
    let resp = self
      .client
      .post(self.url())
      .query(&[("key", self.api_key.as_str())])
      .json(&json!({ "idToken": token }))
      .send()
      .await
      .map_err(|e| Error::Upstream(format!("identity lookup failed: {e}")))?;

    match resp.status() {
      s if s.is_success() => {
        let body: LookupResponse = resp
          .json()
          .await
          .map_err(|e| Error::Upstream(format!("decoding identity lookup: {e}")))?;
        Ok(actor_from_lookup(body))
      }
      StatusCode::BAD_REQUEST => Ok(None),
      s => Err(Error::Upstream(format!("identity lookup → {s}"))),
    }
  }
}

/// The first account's email, if it has a usable one.
fn actor_from_lookup(body: LookupResponse) -> Option<ActorId> {
  body
    .users
    .into_iter()
    .next()?
    .email
    .and_then(|e| ActorId::new(e).ok())
}

impl IdentityVerifier for FirebaseVerifier {
  fn verify<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<Option<ActorId>>> + Send + 'a {
    async move {
      let actor = self.lookup(token).await?;
      if actor.is_none() {
        tracing::debug!("identity token rejected");
      }
      Ok(actor)
    }
  }
}
