// ABOUTME: Core data models for the fleet dataset: accounts, operating companies, vehicles
// ABOUTME: Includes creation/patch payloads, merge rules, and the outward projection capability
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Data Models
//!
//! The three persisted entities plus the payload shapes the service layer
//! accepts for creation and partial update. Outward serialization goes
//! through the [`Serialise`] capability, which produces a fixed projection
//! together with hypermedia link descriptors; `Account` relies on it to keep
//! `password_hash` out of every response.
//!
//! Partial updates are resolved here, not in the repository: `merged` folds
//! a patch onto the stored row so the repository write always receives a
//! fully populated target.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::constants::{api_paths, messages};
use crate::errors::{AppError, AppResult};

/// Account role stored as a three-letter code
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AccountRole {
    /// Standard account with read access
    #[default]
    #[serde(rename = "STD")]
    Standard,
    /// Administrator account with full access
    #[serde(rename = "ADM")]
    Admin,
}

impl AccountRole {
    /// Get the three-letter code as stored
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "STD",
            Self::Admin => "ADM",
        }
    }
}

impl Display for AccountRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccountRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STD" => Ok(Self::Standard),
            "ADM" => Ok(Self::Admin),
            _ => Err(AppError::internal(format!("Unknown account role: {s}"))),
        }
    }
}

/// A login-capable account as stored
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    /// Store-assigned numeric identifier
    pub id: i64,
    /// Store-assigned identity root; namespace for token-family derivation
    pub uuid: Uuid,
    /// Role code
    pub role: AccountRole,
    /// Unique login name
    pub username: String,
    /// Display name
    pub name: String,
    /// Bcrypt digest; never serialized outward
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the password digest last changed
    pub password_last_modified: DateTime<Utc>,
    /// Whether login and token refresh are blocked
    pub disabled: bool,
    /// Row creation instant
    pub created_at: DateTime<Utc>,
    /// Last modification instant
    pub last_modified: DateTime<Utc>,
}

/// Payload for creating an account
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewAccount {
    /// Must be absent; identity is store-assigned
    pub id: Option<i64>,
    /// Role code, `STD` when absent
    pub role: AccountRole,
    /// Unique login name
    pub username: String,
    /// Display name
    pub name: String,
    /// Plaintext password, hashed before storage
    pub password: String,
    /// Starts disabled unless explicitly enabled
    pub disabled: Option<bool>,
}

impl Default for NewAccount {
    fn default() -> Self {
        Self {
            id: None,
            role: AccountRole::Standard,
            username: String::new(),
            name: String::new(),
            password: String::new(),
            disabled: None,
        }
    }
}

/// Partial update payload for an account
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccountPatch {
    /// Optional id echo; must match the target row when present
    pub id: Option<i64>,
    /// New identity root; rotating it invalidates issued refresh tokens
    pub uuid: Option<Uuid>,
    /// New role code
    pub role: Option<AccountRole>,
    /// New login name
    pub username: Option<String>,
    /// New display name
    pub name: Option<String>,
    /// New disabled flag
    pub disabled: Option<bool>,
}

impl AccountPatch {
    /// Identifier of the row this patch targets, for callers that have no
    /// target id of their own.
    ///
    /// # Errors
    ///
    /// Returns a bad-request error when the patch carries no id.
    pub fn target_id(&self) -> AppResult<i64> {
        self.id
            .ok_or_else(|| AppError::bad_request(messages::MSG_MISSING_ID))
    }
}

impl Account {
    /// Fold a partial update onto this stored row.
    ///
    /// Absent patch fields keep their stored values. The password digest and
    /// the store-maintained timestamps are always kept regardless of the
    /// patch contents.
    ///
    /// # Errors
    ///
    /// Returns a bad-request error when the patch carries an id different
    /// from this row's id.
    pub fn merged(&self, patch: AccountPatch) -> AppResult<Self> {
        if patch.id.is_some_and(|id| id != self.id) {
            return Err(AppError::bad_request(messages::MSG_ID_MISMATCH));
        }

        Ok(Self {
            id: self.id,
            uuid: patch.uuid.unwrap_or(self.uuid),
            role: patch.role.unwrap_or(self.role),
            username: patch.username.unwrap_or_else(|| self.username.clone()),
            name: patch.name.unwrap_or_else(|| self.name.clone()),
            password_hash: self.password_hash.clone(),
            password_last_modified: self.password_last_modified,
            disabled: patch.disabled.unwrap_or(self.disabled),
            created_at: self.created_at,
            last_modified: self.last_modified,
        })
    }
}

/// An operating company as stored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperatingCompany {
    /// Store-assigned numeric identifier
    pub id: i64,
    /// National Operator Code, unique, at most 4 characters
    pub noc: String,
    /// Unique short code, at most 3 characters
    pub short_code: String,
    /// Trading name
    pub name: Option<String>,
}

/// Payload for creating an operating company
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewOperatingCompany {
    /// Must be absent; identity is store-assigned
    pub id: Option<i64>,
    /// National Operator Code
    pub noc: String,
    /// Short code
    pub short_code: String,
    /// Trading name
    pub name: Option<String>,
}

/// Partial update payload for an operating company
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OperatingCompanyPatch {
    /// Optional id echo; must match the target row when present
    pub id: Option<i64>,
    /// New National Operator Code
    pub noc: Option<String>,
    /// New short code
    pub short_code: Option<String>,
    /// New trading name
    pub name: Option<String>,
}

impl OperatingCompanyPatch {
    /// Identifier of the row this patch targets, for callers that have no
    /// target id of their own.
    ///
    /// # Errors
    ///
    /// Returns a bad-request error when the patch carries no id.
    pub fn target_id(&self) -> AppResult<i64> {
        self.id
            .ok_or_else(|| AppError::bad_request(messages::MSG_MISSING_ID))
    }
}

impl OperatingCompany {
    /// Fold a partial update onto this stored row.
    ///
    /// # Errors
    ///
    /// Returns a bad-request error when the patch carries an id different
    /// from this row's id.
    pub fn merged(&self, patch: OperatingCompanyPatch) -> AppResult<Self> {
        if patch.id.is_some_and(|id| id != self.id) {
            return Err(AppError::bad_request(messages::MSG_ID_MISMATCH));
        }

        Ok(Self {
            id: self.id,
            noc: patch.noc.unwrap_or_else(|| self.noc.clone()),
            short_code: patch.short_code.unwrap_or_else(|| self.short_code.clone()),
            name: patch.name.or_else(|| self.name.clone()),
        })
    }
}

/// A fleet vehicle as stored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vehicle {
    /// Fleet number, the primary identifier, at most 5 characters
    pub fleet_no: String,
    /// Operating company the vehicle is assigned to
    pub opco_id: Option<i64>,
}

/// Payload for creating a vehicle
#[derive(Debug, Clone, Deserialize)]
pub struct NewVehicle {
    /// Fleet number
    pub fleet_no: String,
    /// Operating company assignment
    #[serde(default)]
    pub opco_id: Option<i64>,
}

/// Partial update payload for a vehicle
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VehiclePatch {
    /// Optional fleet number echo; must match the target row when present
    pub fleet_no: Option<String>,
    /// New operating company assignment
    pub opco_id: Option<i64>,
}

impl Vehicle {
    /// Fold a partial update onto this stored row.
    ///
    /// An absent `opco_id` keeps the stored assignment; there is no way to
    /// unassign a vehicle through a patch.
    ///
    /// # Errors
    ///
    /// Returns a bad-request error when the patch carries a fleet number
    /// different from this row's.
    pub fn merged(&self, patch: VehiclePatch) -> AppResult<Self> {
        if patch
            .fleet_no
            .as_ref()
            .is_some_and(|fleet_no| fleet_no != &self.fleet_no)
        {
            return Err(AppError::bad_request(messages::MSG_ID_MISMATCH));
        }

        Ok(Self {
            fleet_no: self.fleet_no.clone(),
            opco_id: patch.opco_id.or(self.opco_id),
        })
    }
}

/// Hypermedia link descriptor attached to serialized entities
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Link {
    /// Relationship of the linked resource to the entity
    pub rel: String,
    /// Target path, prefixed with the caller-supplied root
    pub href: String,
}

impl Link {
    fn new(rel: &str, href: String) -> Self {
        Self {
            rel: rel.into(),
            href,
        }
    }
}

/// Outward projection capability implemented per entity.
///
/// Each entity declares exactly which fields leave the system and which
/// link descriptors accompany them, rather than reflecting over whatever
/// attributes happen to exist.
pub trait Serialise {
    /// Fixed outward projection of this entity
    fn serialise(&self) -> Value;

    /// Link descriptors for this entity, prefixed with `root`
    fn links(&self, root: &str) -> Vec<Link>;

    /// Projection with its link descriptors attached under `links`
    fn with_links(&self, root: &str) -> Value {
        let mut value = self.serialise();
        if let Value::Object(map) = &mut value {
            map.insert("links".into(), json!(self.links(root)));
        }
        value
    }
}

impl Serialise for Account {
    fn serialise(&self) -> Value {
        json!({
            "id": self.id,
            "uuid": self.uuid,
            "role": self.role,
            "username": self.username,
            "name": self.name,
            "password_last_modified": self.password_last_modified,
            "disabled": self.disabled,
            "created_at": self.created_at,
            "last_modified": self.last_modified,
        })
    }

    fn links(&self, root: &str) -> Vec<Link> {
        vec![Link::new(
            "self",
            format!("{root}{}/{}", api_paths::ACCOUNT, self.id),
        )]
    }
}

impl Serialise for OperatingCompany {
    fn serialise(&self) -> Value {
        json!({
            "id": self.id,
            "noc": self.noc,
            "short_code": self.short_code,
            "name": self.name,
        })
    }

    fn links(&self, root: &str) -> Vec<Link> {
        vec![Link::new(
            "self",
            format!("{root}{}/{}", api_paths::OPERATING_COMPANY, self.id),
        )]
    }
}

impl Serialise for Vehicle {
    fn serialise(&self) -> Value {
        json!({
            "fleet_no": self.fleet_no,
            "opco_id": self.opco_id,
        })
    }

    fn links(&self, root: &str) -> Vec<Link> {
        let mut links = vec![Link::new(
            "self",
            format!("{root}{}/{}", api_paths::VEHICLE, self.fleet_no),
        )];

        if let Some(opco_id) = self.opco_id {
            links.push(Link::new(
                "operatingCompany",
                format!("{root}{}/{opco_id}", api_paths::OPERATING_COMPANY),
            ));
        }

        links
    }
}

/// Outcome of a two-phase delete
#[derive(Debug, Clone, Serialize)]
pub struct DeleteReport {
    /// Confirmation or preview message
    pub message: String,
    /// Rows the operation deleted, or would delete when previewing
    pub rows: Vec<OperatingCompany>,
    /// Number of affected rows
    pub length: usize,
}
