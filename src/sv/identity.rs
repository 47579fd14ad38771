//! Identity collaborator: username resolution against the alias table and
//! password verification against the hosted identity REST endpoint.

use serde::{Deserialize, Serialize};

use crate::{entity::alias, prelude::*};

pub struct Identity<'a> {
  db: &'a DatabaseConnection,
  http: &'a reqwest::Client,
  endpoint: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyReq<'a> {
  email: &'a str,
  password: &'a str,
  return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRes {
  local_id: String,
}

impl<'a> Identity<'a> {
  pub fn new(
    db: &'a DatabaseConnection,
    http: &'a reqwest::Client,
    endpoint: &'a str,
  ) -> Self {
    Self { db, http, endpoint }
  }

  /// Alias keys are stored lowercased, so lookup is case-insensitive.
  pub async fn resolve_email(&self, username: &str) -> Result<alias::Model> {
    let key = username.trim().to_lowercase();
    alias::Entity::find_by_id(key)
      .one(self.db)
      .await?
      .ok_or(Error::AliasNotFound)
  }

  /// Returns the identity provider's account id on success. Any rejection
  /// by the endpoint maps to `Unauthorized`; transport failures surface
  /// as `Identity` for the caller to retry.
  pub async fn verify_password(
    &self,
    email: &str,
    password: &str,
  ) -> Result<String> {
    let response = self
      .http
      .post(self.endpoint)
      .json(&VerifyReq { email, password, return_secure_token: true })
      .send()
      .await?;

    if !response.status().is_success() {
      warn!("Password verification rejected by identity endpoint");
      return Err(Error::Unauthorized);
    }

    let body: VerifyRes = response.json().await?;
    Ok(body.local_id)
  }
}
