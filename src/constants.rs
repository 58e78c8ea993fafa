// ABOUTME: Application constants organized by domain
// ABOUTME: Token lifetimes, pagination defaults, API paths, and canonical messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Constants module
//!
//! Groups application constants by domain. Token lifetimes and the
//! canonical repository messages live here so call sites and tests agree
//! on a single definition.

/// Token lifetime constants
pub mod tokens {
    /// Access token validity in seconds (2 minutes)
    pub const ACCESS_TOKEN_VALIDITY_SECS: i64 = 120;

    /// Refresh token validity in seconds (4 days)
    pub const REFRESH_TOKEN_VALIDITY_SECS: i64 = 345_600;
}

/// Pagination defaults
pub mod pagination {
    /// Default page size for listing endpoints
    pub const DEFAULT_LIMIT: i64 = 10;

    /// Default page offset
    pub const DEFAULT_OFFSET: i64 = 0;

    /// Default order-by field
    pub const DEFAULT_ORDER_BY: &str = "id";

    /// Default sort direction
    pub const DEFAULT_ORDER_BY_DIRECTION: &str = "ASC";
}

/// Resource paths used in hypermedia link descriptors
pub mod api_paths {
    /// Account resource path prefix
    pub const ACCOUNT: &str = "/api/v1/account";

    /// Operating company resource path prefix
    pub const OPERATING_COMPANY: &str = "/api/v1/operating-company";

    /// Vehicle resource path prefix
    pub const VEHICLE: &str = "/api/v1/vehicle";
}

/// Canonical error and status messages
pub mod messages {
    /// Login failure message. Deliberately generic so a failed username
    /// lookup and a failed password check are indistinguishable.
    pub const MSG_LOGIN_FAILED: &str = "Incorrect username or password";

    /// Unique constraint violation on insert or update
    pub const MSG_DUPLICATE_UNIQUE_FIELD: &str =
        "Duplicate value for a unique field, please ensure necessary field(s) are unique!";

    /// Operating company deletion blocked by assigned vehicles
    pub const MSG_COMPANY_IN_USE: &str = "Vehicles have been assigned to this operating company so it may not be deleted! You may still edit details...";

    /// No account row for the requested id
    pub const MSG_ACCOUNT_NOT_FOUND_BY_ID: &str = "No account matching specified id...";

    /// No account row for the requested uuid
    pub const MSG_ACCOUNT_NOT_FOUND_BY_UUID: &str = "No account matching specified uuid...";

    /// No account row for the requested username
    pub const MSG_ACCOUNT_NOT_FOUND_BY_USERNAME: &str = "No account matching specified username...";

    /// No operating company row for the requested id
    pub const MSG_COMPANY_NOT_FOUND: &str = "No operating company matching specified id...";

    /// No vehicle row for the requested fleet number
    pub const MSG_VEHICLE_NOT_FOUND: &str = "No vehicle matching specified fleet number...";

    /// Update payload id disagrees with the target row id
    pub const MSG_ID_MISMATCH: &str = "Mismatch between ID and ID in body provided";

    /// Update payload carries no identifier at all
    pub const MSG_MISSING_ID: &str = "No id provided to identify the target row!";

    /// Creation payload carries a caller-supplied identifier
    pub const MSG_ID_ON_CREATE: &str =
        "Do not supply an id on creation, identity is assigned by the store!";

    /// Presented access token failed decode or is of the wrong kind
    pub const MSG_INVALID_ACCESS_TOKEN: &str = "Invalid access token provided";

    /// Presented refresh token failed decode or is of the wrong kind
    pub const MSG_INVALID_REFRESH_TOKEN: &str = "Invalid refresh token provided";

    /// Access and refresh tokens do not share one family identifier
    pub const MSG_TOKENS_NOT_PAIRED: &str = "Access and refresh tokens are not a pair";

    /// Refresh token no longer matches the account's current identity
    pub const MSG_REFRESH_REVOKED: &str = "Refresh token is no longer valid";

    /// Access attempted with a disabled account snapshot
    pub const MSG_ACCOUNT_DISABLED: &str = "Account is disabled!";

    /// Operation requires the administrator role
    pub const MSG_ADMIN_REQUIRED: &str = "Administrator role required!";

    /// Store unreachable
    pub const MSG_DATABASE_NOT_READY: &str = "Database connection is not ready!";
}
