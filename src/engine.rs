//! Entitlement engine - the rules that decide whether an account may use
//! the product right now.
//!
//! Every operation is a pure function over a record snapshot plus a clock
//! value: no I/O, no shared state, safe to call from concurrent readers.
//! Persisting the computed fields is the storage layer's job (`sv::Record`).

use uuid::Uuid;

use crate::{
  entity::{Tier, record},
  prelude::*,
};

/// Outcome of an access check. Must be recomputed at the moment of use,
/// never cached: time advances independently of record mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
  Granted,
  Denied(Denial),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Denial {
  Banned,
  NoLicense,
  Expired,
}

impl std::fmt::Display for Denial {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let reason = match self {
      Self::Banned => "account is banned",
      Self::NoLicense => "no active license",
      Self::Expired => "license expired",
    };
    f.write_str(reason)
  }
}

impl Tier {
  /// Fixed license duration, `None` for the tiers that never expire on
  /// their own.
  pub fn duration(&self) -> Option<TimeDelta> {
    match self {
      Tier::ThirtyDay => Some(TimeDelta::days(30)),
      Tier::OneYear => Some(TimeDelta::days(365)),
      Tier::None | Tier::Lifetime => None,
    }
  }
}

/// First match wins: ban beats everything (including lifetime), then the
/// tier, then expiry. Expiry is a derived condition - an expired 30-day
/// record keeps its tier until an admin reassigns it.
pub fn evaluate_access(record: &record::Model, now: DateTime) -> Access {
  if record.is_banned {
    return Access::Denied(Denial::Banned);
  }

  match record.license_tier {
    Tier::None => Access::Denied(Denial::NoLicense),
    Tier::Lifetime => Access::Granted,
    Tier::ThirtyDay | Tier::OneYear => match record.expiry_date {
      Some(expiry) if now > expiry => Access::Denied(Denial::Expired),
      _ => Access::Granted,
    },
  }
}

/// The complete new values of the three tier-coupled fields. Nothing else
/// on the record is touched by a tier assignment.
#[derive(Clone, Debug, PartialEq)]
pub struct TierChange {
  pub tier: Tier,
  pub license_key: Option<String>,
  pub expiry_date: Option<DateTime>,
}

/// Computes the field updates for a tier reassignment.
///
/// A license key is generated exactly once per non-none lifetime of the
/// record: assigning another non-none tier keeps the existing key, and
/// only dropping back to `none` clears it.
pub fn assign_tier(
  record: &record::Model,
  tier: Tier,
  now: DateTime,
) -> TierChange {
  let expiry_date = tier.duration().map(|duration| now + duration);

  let license_key = match tier {
    Tier::None => None,
    _ => record.license_key.clone().or_else(|| Some(new_license_key())),
  };

  TierChange { tier, license_key, expiry_date }
}

/// 16 random bytes, hex-encoded (UUIDv4 without hyphens).
pub fn new_license_key() -> String {
  Uuid::new_v4().simple().to_string()
}

/// Pure flip of the ban flag; no other field is affected.
pub fn toggle_ban(record: &record::Model) -> bool {
  !record.is_banned
}

/// Time left on the license, recomputed on every call (the UI polls this
/// for its countdown label).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Remaining {
  Never,
  Expired(DateTime),
  Left(TimeDelta),
}

pub fn remaining_time(record: &record::Model, now: DateTime) -> Remaining {
  match (record.license_tier, record.expiry_date) {
    (Tier::Lifetime, _) | (_, None) => Remaining::Never,
    (_, Some(expiry)) if now > expiry => Remaining::Expired(expiry),
    (_, Some(expiry)) => Remaining::Left(expiry - now),
  }
}
