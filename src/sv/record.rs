use crate::{
  engine,
  entity::{Tier, record},
  prelude::*,
};

pub struct Record<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Record<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn by_uid(&self, uid: &str) -> Result<Option<record::Model>> {
    let record = record::Entity::find_by_id(uid).one(self.db).await?;
    Ok(record)
  }

  pub async fn get(&self, uid: &str) -> Result<record::Model> {
    self.by_uid(uid).await?.ok_or(Error::RecordNotFound)
  }

  pub async fn list(
    &self,
    actor: &record::Model,
  ) -> Result<Vec<record::Model>> {
    require_admin(actor)?;

    let records = record::Entity::find()
      .order_by_asc(record::Column::Username)
      .all(self.db)
      .await?;
    Ok(records)
  }

  /// Records come to exist through an administrative actor; they start
  /// with no tier, no key and no expiry.
  pub async fn create(
    &self,
    actor: &record::Model,
    uid: &str,
    username: &str,
  ) -> Result<record::Model> {
    require_admin(actor)?;

    let now = Utc::now().naive_utc();
    let record = record::ActiveModel {
      uid: Set(uid.to_string()),
      username: Set(username.to_string()),
      is_admin: Set(false),
      is_banned: Set(false),
      license_tier: Set(Tier::None),
      license_key: Set(None),
      expiry_date: Set(None),
      version: Set(0),
      created_at: Set(now),
    };

    info!("Created license record for {username}");
    Ok(record.insert(self.db).await?)
  }

  pub async fn assign_tier(
    &self,
    actor: &record::Model,
    uid: &str,
    tier: Tier,
  ) -> Result<record::Model> {
    require_admin(actor)?;

    let record = self.get(uid).await?;
    let change = engine::assign_tier(&record, tier, Utc::now().naive_utc());

    let fields = record::ActiveModel {
      license_tier: Set(change.tier),
      license_key: Set(change.license_key),
      expiry_date: Set(change.expiry_date),
      ..Default::default()
    };

    let updated = self.update_guarded(&record, fields).await?;
    info!("Assigned tier {tier} to {}", updated.username);
    Ok(updated)
  }

  pub async fn toggle_ban(
    &self,
    actor: &record::Model,
    uid: &str,
  ) -> Result<record::Model> {
    require_admin(actor)?;

    let record = self.get(uid).await?;
    let fields = record::ActiveModel {
      is_banned: Set(engine::toggle_ban(&record)),
      ..Default::default()
    };

    let updated = self.update_guarded(&record, fields).await?;
    info!(
      "{} is now {}",
      updated.username,
      if updated.is_banned { "banned" } else { "unbanned" }
    );
    Ok(updated)
  }

  /// Writes `fields` only while the row still carries the snapshot's
  /// version. A concurrent writer bumps the version first, so the losing
  /// call gets `Error::Conflict` instead of silently clobbering it.
  pub(crate) async fn update_guarded(
    &self,
    snapshot: &record::Model,
    mut fields: record::ActiveModel,
  ) -> Result<record::Model> {
    fields.version = Set(snapshot.version + 1);

    let result = record::Entity::update_many()
      .set(fields)
      .filter(record::Column::Uid.eq(&snapshot.uid))
      .filter(record::Column::Version.eq(snapshot.version))
      .exec(self.db)
      .await?;

    if result.rows_affected == 0 {
      return Err(Error::Conflict);
    }

    self.get(&snapshot.uid).await
  }
}

fn require_admin(actor: &record::Model) -> Result<()> {
  if actor.is_admin { Ok(()) } else { Err(Error::Forbidden) }
}

#[cfg(test)]
mod tests {
  use sea_orm::{DbBackend, Schema};

  use super::*;
  use crate::entity::alias;

  async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();

    let schema = Schema::new(DbBackend::Sqlite);

    let stmt = schema.create_table_from_entity(record::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(alias::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    db
  }

  async fn seed(
    db: &DatabaseConnection,
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
    .insert(db)
    .await
    .unwrap()
  }

  #[tokio::test]
  async fn non_admin_cannot_mutate() {
    let db = setup_test_db().await;
    let sv = Record::new(&db);

    let actor = seed(&db, "u1", "mortal", false).await;
    seed(&db, "u2", "target", false).await;

    assert!(matches!(
      sv.create(&actor, "u3", "newbie").await,
      Err(Error::Forbidden)
    ));
    assert!(matches!(
      sv.assign_tier(&actor, "u2", Tier::Lifetime).await,
      Err(Error::Forbidden)
    ));
    assert!(matches!(
      sv.toggle_ban(&actor, "u2").await,
      Err(Error::Forbidden)
    ));
    assert!(matches!(sv.list(&actor).await, Err(Error::Forbidden)));
  }

  #[tokio::test]
  async fn create_then_assign_lifecycle() {
    let db = setup_test_db().await;
    let sv = Record::new(&db);

    let admin = seed(&db, "a1", "root", true).await;
    let created = sv.create(&admin, "u1", "ghost").await.unwrap();
    assert_eq!(created.license_tier, Tier::None);
    assert_eq!(created.license_key, None);

    let assigned = sv.assign_tier(&admin, "u1", Tier::OneYear).await.unwrap();
    assert_eq!(assigned.license_tier, Tier::OneYear);
    let key = assigned.license_key.clone().expect("key generated");
    let expiry = assigned.expiry_date.expect("expiry set");
    assert!((expiry - Utc::now().naive_utc()).num_days() >= 364);

    // Downgrade keeps the key, recomputes the expiry.
    let downgraded =
      sv.assign_tier(&admin, "u1", Tier::ThirtyDay).await.unwrap();
    assert_eq!(downgraded.license_key.as_deref(), Some(key.as_str()));
    assert!(downgraded.expiry_date.unwrap() < expiry);

    // Revoking clears both.
    let revoked = sv.assign_tier(&admin, "u1", Tier::None).await.unwrap();
    assert_eq!(revoked.license_key, None);
    assert_eq!(revoked.expiry_date, None);
  }

  #[tokio::test]
  async fn assign_to_missing_record_surfaces_not_found() {
    let db = setup_test_db().await;
    let sv = Record::new(&db);

    let admin = seed(&db, "a1", "root", true).await;
    assert!(matches!(
      sv.assign_tier(&admin, "nobody", Tier::Lifetime).await,
      Err(Error::RecordNotFound)
    ));
  }

  #[tokio::test]
  async fn toggle_ban_round_trips() {
    let db = setup_test_db().await;
    let sv = Record::new(&db);

    let admin = seed(&db, "a1", "root", true).await;
    seed(&db, "u1", "ghost", false).await;

    let banned = sv.toggle_ban(&admin, "u1").await.unwrap();
    assert!(banned.is_banned);

    let unbanned = sv.toggle_ban(&admin, "u1").await.unwrap();
    assert!(!unbanned.is_banned);
    assert_eq!(unbanned.version, 2);
  }

  #[tokio::test]
  async fn stale_snapshot_loses_the_race() {
    let db = setup_test_db().await;
    let sv = Record::new(&db);

    let admin = seed(&db, "a1", "root", true).await;
    let stale = seed(&db, "u1", "ghost", false).await;

    // Another writer gets in first and bumps the version.
    sv.toggle_ban(&admin, "u1").await.unwrap();

    let fields = record::ActiveModel {
      license_tier: Set(Tier::Lifetime),
      ..Default::default()
    };
    assert!(matches!(
      sv.update_guarded(&stale, fields).await,
      Err(Error::Conflict)
    ));

    // The winner's write is intact.
    let current = sv.get("u1").await.unwrap();
    assert!(current.is_banned);
    assert_eq!(current.license_tier, Tier::None);
  }

  #[tokio::test]
  async fn list_is_ordered_by_username() {
    let db = setup_test_db().await;
    let sv = Record::new(&db);

    let admin = seed(&db, "a1", "zed", true).await;
    seed(&db, "u1", "alice", false).await;

    let names: Vec<_> = sv
      .list(&admin)
      .await
      .unwrap()
      .into_iter()
      .map(|r| r.username)
      .collect();
    assert_eq!(names, vec!["alice", "zed"]);
  }
}
