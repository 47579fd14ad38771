//! HTTP handlers for the entitlement API

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{
  engine::{self, Access, Remaining},
  entity::{Tier, record},
  prelude::*,
  state::AppState,
};

#[derive(Debug, Serialize)]
pub struct AccessRes {
  pub granted: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reason: Option<String>,
}

impl From<Access> for AccessRes {
  fn from(access: Access) -> Self {
    match access {
      Access::Granted => Self { granted: true, reason: None },
      Access::Denied(denial) => {
        Self { granted: false, reason: Some(denial.to_string()) }
      }
    }
  }
}

#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum RemainingRes {
  Never,
  Expired { at: String },
  Left { days: i64, hours: i64, minutes: i64, display: String },
}

impl From<Remaining> for RemainingRes {
  fn from(remaining: Remaining) -> Self {
    match remaining {
      Remaining::Never => Self::Never,
      Remaining::Expired(at) => Self::Expired { at: utils::format_date(at) },
      Remaining::Left(delta) => Self::Left {
        days: delta.num_days(),
        hours: delta.num_hours() % 24,
        minutes: delta.num_minutes() % 60,
        display: utils::format_duration(delta),
      },
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct LoginReq {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginRes {
  pub profile: record::Model,
  pub access: AccessRes,
  pub remaining: RemainingRes,
}

pub async fn login(
  State(app): State<Arc<AppState>>,
  Json(req): Json<LoginReq>,
) -> Result<Json<LoginRes>> {
  let sv = app.sv();

  let alias = sv.identity.resolve_email(&req.username).await?;
  let uid = sv.identity.verify_password(&alias.email, &req.password).await?;
  let record = sv.record.get(&uid).await?;

  info!("Login for {}", record.username);

  let now = Utc::now().naive_utc();
  Ok(Json(LoginRes {
    access: engine::evaluate_access(&record, now).into(),
    remaining: engine::remaining_time(&record, now).into(),
    profile: record,
  }))
}

#[derive(Debug, Deserialize)]
pub struct AccessReq {
  pub uid: String,
}

/// The gate in front of any privileged action. Callers re-check at the
/// moment of use; the decision is never cached.
pub async fn access(
  State(app): State<Arc<AppState>>,
  Json(req): Json<AccessReq>,
) -> Result<Json<AccessRes>> {
  let record = app.sv().record.get(&req.uid).await?;
  Ok(Json(engine::evaluate_access(&record, Utc::now().naive_utc()).into()))
}

/// Pull-based countdown query; the UI polls this on a timer, the service
/// itself holds none.
pub async fn remaining(
  State(app): State<Arc<AppState>>,
  Path(uid): Path<String>,
) -> Result<Json<RemainingRes>> {
  let record = app.sv().record.get(&uid).await?;
  Ok(Json(engine::remaining_time(&record, Utc::now().naive_utc()).into()))
}

#[derive(Debug, Deserialize)]
pub struct ActorQuery {
  pub actor: String,
}

pub async fn list_records(
  State(app): State<Arc<AppState>>,
  Query(query): Query<ActorQuery>,
) -> Result<Json<Vec<record::Model>>> {
  let sv = app.sv();
  let actor = sv.record.get(&query.actor).await?;
  Ok(Json(sv.record.list(&actor).await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateReq {
  pub actor: String,
  pub uid: String,
  pub username: String,
}

pub async fn create_record(
  State(app): State<Arc<AppState>>,
  Json(req): Json<CreateReq>,
) -> Result<Json<record::Model>> {
  let sv = app.sv();
  let actor = sv.record.get(&req.actor).await?;
  Ok(Json(sv.record.create(&actor, &req.uid, &req.username).await?))
}

#[derive(Debug, Deserialize)]
pub struct ModifyTierReq {
  pub actor: String,
  pub uid: String,
  pub tier: String,
}

pub async fn modify_tier(
  State(app): State<Arc<AppState>>,
  Json(req): Json<ModifyTierReq>,
) -> Result<Json<record::Model>> {
  // Reject unrecognized tiers before touching the record.
  let tier: Tier = req.tier.parse()?;

  let sv = app.sv();
  let actor = sv.record.get(&req.actor).await?;
  Ok(Json(sv.record.assign_tier(&actor, &req.uid, tier).await?))
}

#[derive(Debug, Deserialize)]
pub struct ToggleBanReq {
  pub actor: String,
  pub uid: String,
}

pub async fn toggle_ban(
  State(app): State<Arc<AppState>>,
  Json(req): Json<ToggleBanReq>,
) -> Result<Json<record::Model>> {
  let sv = app.sv();
  let actor = sv.record.get(&req.actor).await?;
  Ok(Json(sv.record.toggle_ban(&actor, &req.uid).await?))
}

pub async fn health() -> &'static str {
  "OK"
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::state::Config;

  async fn test_state() -> Arc<AppState> {
    let config = Config {
      database_url: "sqlite::memory:".into(),
      identity_url: "http://localhost:0".into(),
      port: 0,
    };
    Arc::new(AppState::new(config).await)
  }

  async fn seed(
    app: &AppState,
    uid: &str,
    username: &str,
    is_admin: bool,
  ) -> record::Model {
    record::ActiveModel {
      uid: Set(uid.to_string()),
      username: Set(username.to_string()),
      is_admin: Set(is_admin),
      is_banned: Set(false),
      license_tier: Set(Tier::None),
      license_key: Set(None),
      expiry_date: Set(None),
      version: Set(0),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(&app.db)
    .await
    .unwrap()
  }

  #[tokio::test]
  async fn login_rejects_unknown_username() {
    let app = test_state().await;

    let req = LoginReq { username: "nobody".into(), password: "pw".into() };
    let result = login(State(app), Json(req)).await;
    assert!(matches!(result, Err(Error::AliasNotFound)));
  }

  #[tokio::test]
  async fn modify_rejects_unrecognized_tier() {
    let app = test_state().await;
    seed(&app, "a1", "root", true).await;
    seed(&app, "u1", "ghost", false).await;

    let req = ModifyTierReq {
      actor: "a1".into(),
      uid: "u1".into(),
      tier: "weekly".into(),
    };
    let result = modify_tier(State(app.clone()), Json(req)).await;
    assert!(matches!(result, Err(Error::InvalidTier(_))));

    // No mutation happened.
    let record = app.sv().record.get("u1").await.unwrap();
    assert_eq!(record.license_tier, Tier::None);
    assert_eq!(record.version, 0);
  }

  #[tokio::test]
  async fn access_reflects_a_fresh_ban() {
    let app = test_state().await;
    seed(&app, "a1", "root", true).await;
    seed(&app, "u1", "ghost", false).await;

    let req = ModifyTierReq {
      actor: "a1".into(),
      uid: "u1".into(),
      tier: "lifetime".into(),
    };
    modify_tier(State(app.clone()), Json(req)).await.unwrap();

    let req = AccessReq { uid: "u1".into() };
    let Json(res) = access(State(app.clone()), Json(req)).await.unwrap();
    assert!(res.granted);

    let req = ToggleBanReq { actor: "a1".into(), uid: "u1".into() };
    toggle_ban(State(app.clone()), Json(req)).await.unwrap();

    let req = AccessReq { uid: "u1".into() };
    let Json(res) = access(State(app), Json(req)).await.unwrap();
    assert!(!res.granted);
    assert_eq!(res.reason.as_deref(), Some("account is banned"));
  }

  #[tokio::test]
  async fn remaining_surfaces_missing_records() {
    let app = test_state().await;

    let result = remaining(State(app), Path("nobody".into())).await;
    assert!(matches!(result, Err(Error::RecordNotFound)));
  }
}
