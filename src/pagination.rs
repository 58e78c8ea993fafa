// ABOUTME: Offset pagination with whitelisted ordering for list queries
// ABOUTME: Resolves untrusted order-by input to fixed column positions and window-counted pages
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # List Pagination
//!
//! Builds the two list-query shapes the repository runs: a paged SELECT
//! carrying a `count(*) OVER ()` window total on every row, and a count-only
//! SELECT for limits that do not ask for rows.
//!
//! Ordering input is untrusted. The direction is accepted only when it is
//! exactly `ASC` or `DESC`; the field name is resolved through a per-entity
//! whitelist to a fixed positional index. Only the resolved position and the
//! validated direction keyword ever reach the statement text; limit and
//! offset stay bound parameters.

use serde::{Deserialize, Serialize};

use crate::constants::pagination::{
    DEFAULT_LIMIT, DEFAULT_OFFSET, DEFAULT_ORDER_BY, DEFAULT_ORDER_BY_DIRECTION,
};

/// Sort direction for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SortDirection {
    /// Ascending order
    #[default]
    #[serde(rename = "ASC")]
    Ascending,
    /// Descending order
    #[serde(rename = "DESC")]
    Descending,
}

impl SortDirection {
    /// Parse a direction, falling back to ascending for anything that is
    /// not exactly `ASC` or `DESC` (case-sensitive).
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "DESC" => Self::Descending,
            _ => Self::Ascending,
        }
    }

    /// SQL keyword for this direction
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Whitelisted ORDER BY mapping for one entity.
///
/// Field names resolve to fixed positional indexes into the entity's SELECT
/// projection. Unrecognized names fall back to position 1, the entity's
/// primary identifier.
#[derive(Debug, Clone, Copy)]
pub struct OrderWhitelist {
    fields: &'static [(&'static str, u8)],
}

impl OrderWhitelist {
    /// Orderable account fields. Position 6, the password digest, is
    /// deliberately absent.
    pub const ACCOUNT: Self = Self {
        fields: &[
            ("id", 1),
            ("uuid", 2),
            ("role", 3),
            ("username", 4),
            ("name", 5),
            ("password_last_modified", 7),
            ("disabled", 8),
            ("created_at", 9),
            ("last_modified", 10),
        ],
    };

    /// Orderable operating company fields
    pub const OPERATING_COMPANY: Self = Self {
        fields: &[("id", 1), ("noc", 2), ("short_code", 3), ("name", 4)],
    };

    /// Orderable vehicle fields
    pub const VEHICLE: Self = Self {
        fields: &[("fleet_no", 1), ("opco_id", 2)],
    };

    /// Resolve a field name to its positional index, position 1 when the
    /// name is not whitelisted.
    #[must_use]
    pub fn position(&self, field: &str) -> u8 {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map_or(1, |(_, position)| *position)
    }
}

/// Untrusted list parameters as received from the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListParams {
    /// Cap on returned rows
    pub limit: i64,
    /// Rows to skip
    pub offset: i64,
    /// Field to order by
    pub order_by: String,
    /// Requested sort direction
    pub order_by_direction: String,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
            order_by: DEFAULT_ORDER_BY.into(),
            order_by_direction: DEFAULT_ORDER_BY_DIRECTION.into(),
        }
    }
}

impl ListParams {
    /// Resolve these parameters against an entity whitelist, clamping the
    /// offset and validating the direction.
    #[must_use]
    pub fn resolve(&self, whitelist: OrderWhitelist) -> ResolvedQuery {
        ResolvedQuery {
            limit: self.limit,
            offset: self.offset.max(0),
            order_by_position: whitelist.position(&self.order_by),
            direction: SortDirection::parse(&self.order_by_direction),
            order_by: self.order_by.clone(),
        }
    }
}

/// List parameters after clamping and whitelist resolution
#[derive(Debug, Clone)]
pub struct ResolvedQuery {
    /// Requested cap, untouched; the paged/count split keys off it
    pub limit: i64,
    /// Offset with negatives clamped to zero
    pub offset: i64,
    /// Whitelist-resolved ORDER BY position
    pub order_by_position: u8,
    /// Validated sort direction
    pub direction: SortDirection,
    /// Caller's order-by field, echoed in response metadata
    pub order_by: String,
}

impl ResolvedQuery {
    /// Whether this query returns rows or only the window count.
    ///
    /// A limit of exactly 1 lands on the count-only side of the split.
    #[must_use]
    pub const fn is_paged(&self) -> bool {
        self.limit > 1
    }

    /// Paged SELECT with the window total attached to every row.
    ///
    /// The resolved position and the direction keyword are interpolated;
    /// limit and offset bind as `$1` and `$2`.
    #[must_use]
    pub fn paged_sql(&self, table: &str, projection: &str) -> String {
        format!(
            "SELECT {projection}, count(*) OVER () AS full_count FROM {table} ORDER BY {} {} LIMIT $1 OFFSET $2",
            self.order_by_position,
            self.direction.as_sql()
        )
    }

    /// Response metadata echoing the effective parameters
    #[must_use]
    pub fn meta(&self, max: i64) -> PageMeta {
        PageMeta {
            max,
            limit: self.limit,
            offset: self.offset,
            order_by: self.order_by.clone(),
            order_by_direction: self.direction,
        }
    }
}

/// Count-only SELECT used when the limit does not ask for rows
#[must_use]
pub fn count_sql(table: &str) -> String {
    format!("SELECT count(*) OVER () AS full_count FROM {table} LIMIT 1")
}

/// Pagination metadata returned with every list response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMeta {
    /// Unfiltered total row count from the window function
    pub max: i64,
    /// Requested cap
    pub limit: i64,
    /// Effective offset
    pub offset: i64,
    /// Requested order-by field, echoed as given
    #[serde(rename = "orderBy")]
    pub order_by: String,
    /// Effective sort direction
    #[serde(rename = "orderByDirection")]
    pub order_by_direction: SortDirection,
}

/// One page of results together with its metadata
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Rows for this page; empty in count-only mode
    pub result: Vec<T>,
    /// Pagination metadata
    pub meta: PageMeta,
}
