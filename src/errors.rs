// ABOUTME: Unified error taxonomy with HTTP status mapping and store error classification
// ABOUTME: Defines ErrorKind, AppError, and conversions from sqlx and jsonwebtoken failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Unified Error Handling
//!
//! A closed error taxonomy shared by every module. Store and signature
//! failures are classified into this taxonomy at the repository and token
//! boundaries; the taxonomy itself owns the HTTP status mapping so the
//! surrounding transport layer only has to forward it.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::constants::messages;

/// Domain error kinds used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed or contradictory input, e.g. an id supplied on create
    #[serde(rename = "BAD_REQUEST")]
    BadRequest,
    /// Missing, invalid, or expired credential, or a failed login
    #[serde(rename = "UNAUTHORISED")]
    Unauthorised,
    /// Authenticated but disabled account or insufficient role
    #[serde(rename = "FORBIDDEN")]
    Forbidden,
    /// No matching row
    #[serde(rename = "NOT_FOUND")]
    NotFound,
    /// Uniqueness or referential-integrity violation
    #[serde(rename = "CONFLICT")]
    Conflict,
    /// Reserved for confirmation-required flows
    #[serde(rename = "LOCKED")]
    Locked,
    /// A dependency (the store) is unreachable
    #[serde(rename = "SERVICE_UNAVAILABLE")]
    ServiceUnavailable,
    /// Catch-all for unclassified failures
    #[serde(rename = "INTERNAL_ERROR")]
    Internal,
}

impl ErrorKind {
    /// Get the HTTP status code for this error kind
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorised => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Locked => 423,
            Self::ServiceUnavailable => 503,
            Self::Internal => 500,
        }
    }

    /// Get a user-friendly description of this error kind
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::BadRequest => "The request could not be processed as submitted",
            Self::Unauthorised => "Valid authentication credentials are required",
            Self::Forbidden => "The authenticated account may not perform this action",
            Self::NotFound => "The requested resource was not found",
            Self::Conflict => "The operation conflicts with existing data",
            Self::Locked => "The resource requires confirmation before modification",
            Self::ServiceUnavailable => "A required service is currently unavailable",
            Self::Internal => "An internal error occurred",
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error kind
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Source error for chaining; never serialized outward
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attach a source error for chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.kind.http_status()
    }

    /// Malformed or contradictory input
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// Missing, invalid, or expired credential
    pub fn unauthorised(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorised, message)
    }

    /// Authenticated but not permitted
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// No matching row
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Uniqueness or referential-integrity violation
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Confirmation-required flow
    pub fn locked(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Locked, message)
    }

    /// Dependency unreachable
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    /// Internal failure
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Outward error response shape for the transport layer
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error kind identifier
    pub code: ErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            code: error.kind,
            message: error.message,
        }
    }
}

/// Classify store failures at the repository boundary.
///
/// Unique constraint violations become `Conflict` with the canonical
/// message; everything else is an internal failure carrying the driver
/// error as its source. Foreign key violations are classified here as
/// internal as well; the confirmed-delete path inspects them before this
/// conversion runs because only that path maps them to `Conflict`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::RowNotFound => {
                Self::not_found("The requested row was not found").with_source(error)
            }
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::conflict(messages::MSG_DUPLICATE_UNIQUE_FIELD).with_source(error)
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                Self::service_unavailable(messages::MSG_DATABASE_NOT_READY).with_source(error)
            }
            _ => Self::internal(format!("Database operation failed: {error}")).with_source(error),
        }
    }
}

/// Classify signature failures at the token boundary.
///
/// Expiry is the only condition reported distinctly; every other decode
/// failure collapses to one generic message so callers learn nothing
/// about why a forged or damaged token was rejected.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                Self::unauthorised("Access token has expired").with_source(error)
            }
            _ => Self::unauthorised("Invalid authentication credentials").with_source(error),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal(error.to_string())
    }
}
