// ABOUTME: Main library entry point for the fleet management backend core
// ABOUTME: Token lifecycle, safe pagination, and transactional CRUD over SQLite
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Fleet Core
//!
//! The correctness-critical core of a fleet-management CRUD backend:
//!
//! - **[`auth`]** — the token lifecycle manager. Access/refresh pairs share a
//!   deterministic family identifier derived from account identity; rotating
//!   an account's uuid strands every previously issued refresh token without
//!   a revocation list.
//! - **[`pagination`]** — safe dynamic list queries. Untrusted ordering input
//!   resolves through per-entity whitelists to fixed column positions; limit
//!   and offset stay bound parameters.
//! - **[`database`]** — transactional repositories over a bounded connection
//!   pool, with store constraint violations classified into the domain error
//!   taxonomy, plus the two-phase confirmed-delete protocol.
//!
//! HTTP routing, request schema validation, and process bootstrap are the
//! surrounding service's concern; this crate exchanges plain data structures
//! and [`errors::AppError`] values with that boundary layer.

/// Token lifecycle management: issuance, refresh gating, and guards
pub mod auth;
/// Environment-driven application configuration
pub mod config;
/// Application constants grouped by domain
pub mod constants;
/// Bounded-pool database manager and per-entity repositories
pub mod database;
/// Unified error taxonomy with HTTP status mapping
pub mod errors;
/// Tracing subscriber configuration
pub mod logging;
/// Persisted entities, payload shapes, and outward projections
pub mod models;
/// Whitelisted ordering and window-counted pagination
pub mod pagination;
