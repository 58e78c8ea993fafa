// ABOUTME: Token lifecycle management for access/refresh credential pairs
// ABOUTME: Handles login, token-family derivation, pair issuance, refresh gating, and claims introspection
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Token Lifecycle Management
//!
//! Issues and validates signed access/refresh token pairs. The two tokens of
//! a pair share one family identifier (`jti`), derived deterministically from
//! the account's identity: UUIDv5 over the account's stored `uuid` (as
//! namespace) and its decimal `id` (as name). Rotating the stored `uuid`
//! changes every future derivation, which silently invalidates all previously
//! issued refresh tokens without any revocation list.
//!
//! Per token the lifecycle is `issued → valid → (expired | rejected-by-
//! rotation)`; terminal states are never reactivated.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::constants::messages;
use crate::constants::tokens::{ACCESS_TOKEN_VALIDITY_SECS, REFRESH_TOKEN_VALIDITY_SECS};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Account, AccountRole};

/// Kind discriminator carried in every claim set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    /// Short-lived token presented on ordinary requests
    #[serde(rename = "access")]
    Access,
    /// Long-lived token exchanged for a fresh pair
    #[serde(rename = "refresh")]
    Refresh,
}

/// Signed claim set shared by both token kinds.
///
/// `iat`, `nbf`, and `exp` are always computed by the encoder, never
/// accepted from a caller. The `name`/`role`/`disabled` snapshot is present
/// only on access tokens; refresh claims stay minimal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Account id, as a decimal string
    pub sub: String,
    /// Token-family identifier shared by a pair
    pub jti: Uuid,
    /// Token kind
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Issuance instant (seconds since epoch)
    pub iat: i64,
    /// Not valid before this instant
    pub nbf: i64,
    /// Expiry instant
    pub exp: i64,
    /// Display name snapshot, access tokens only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Role snapshot, access tokens only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<AccountRole>,
    /// Disabled-flag snapshot, access tokens only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

impl TokenClaims {
    /// Reject claims whose account snapshot says the account is disabled.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error when the snapshot carries `disabled = true`.
    pub fn ensure_active(&self) -> AppResult<()> {
        if self.disabled == Some(true) {
            return Err(AppError::forbidden(messages::MSG_ACCOUNT_DISABLED));
        }
        Ok(())
    }

    /// Reject claims whose role snapshot is not an administrator.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error unless the snapshot carries the `ADM` role.
    pub fn ensure_admin(&self) -> AppResult<()> {
        if self.role != Some(AccountRole::Admin) {
            return Err(AppError::forbidden(messages::MSG_ADMIN_REQUIRED));
        }
        Ok(())
    }
}

/// A freshly issued access/refresh pair
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    /// Short-lived access token
    pub access_token: String,
    /// Long-lived refresh token
    pub refresh_token: String,
}

/// Derive the token-family identifier for an account.
///
/// Pure and deterministic: UUIDv5 with the account's stored `uuid` as the
/// namespace and the decimal form of its `id` as the name. Calling it twice
/// with the same `(uuid, id)` yields identical results; changing either
/// input always changes the result.
#[must_use]
pub fn derive_jti(account: &Account) -> Uuid {
    Uuid::new_v5(&account.uuid, account.id.to_string().as_bytes())
}

/// Hash a plaintext password with a randomized salt.
///
/// # Errors
///
/// Returns an internal error if bcrypt hashing fails.
pub fn hash_password(plaintext: &str) -> AppResult<String> {
    bcrypt::hash(plaintext, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::internal("Password hashing failed").with_source(e))
}

/// Verify a plaintext password against a stored digest.
///
/// A malformed digest verifies as `false` rather than erroring, so callers
/// on the login path cannot leak whether the stored digest was readable.
#[must_use]
pub fn verify_password(plaintext: &str, digest: &str) -> bool {
    bcrypt::verify(plaintext, digest).unwrap_or(false)
}

/// Issues, decodes, and cross-validates signed token pairs
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_validity_secs: i64,
    refresh_validity_secs: i64,
}

impl AuthManager {
    /// Create a manager with the standard access/refresh validities
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self::with_validity(
            secret,
            ACCESS_TOKEN_VALIDITY_SECS,
            REFRESH_TOKEN_VALIDITY_SECS,
        )
    }

    /// Create a manager with explicit validities, in seconds
    #[must_use]
    pub fn with_validity(secret: &[u8], access_secs: i64, refresh_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_validity_secs: access_secs,
            refresh_validity_secs: refresh_secs,
        }
    }

    /// Create a manager from loaded application configuration
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_validity(
            config.jwt_secret.as_bytes(),
            config.access_token_validity_secs,
            config.refresh_token_validity_secs,
        )
    }

    /// Issue an access/refresh pair for an account.
    ///
    /// The family identifier is computed once and shared by both tokens;
    /// the access token additionally snapshots `name`, `role`, and
    /// `disabled` at issuance time.
    ///
    /// # Errors
    ///
    /// Returns an error if claim encoding fails.
    pub fn generate_token_pair(&self, account: &Account) -> AppResult<TokenPair> {
        let jti = derive_jti(account);

        let access_token =
            self.encode_claims(account, jti, TokenType::Access, self.access_validity_secs)?;
        let refresh_token =
            self.encode_claims(account, jti, TokenType::Refresh, self.refresh_validity_secs)?;

        debug!(account_id = account.id, "issued token pair");
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Verify a username/password credential and issue a fresh pair.
    ///
    /// # Errors
    ///
    /// A failed username lookup and a failed password check both collapse
    /// to one generic unauthorised error, so callers cannot enumerate
    /// accounts.
    pub async fn login(
        &self,
        database: &Database,
        username: &str,
        password: &str,
    ) -> AppResult<TokenPair> {
        let account = database
            .get_account_by_username(username)
            .await
            .map_err(|_| AppError::unauthorised(messages::MSG_LOGIN_FAILED))?;

        if !verify_password(password, &account.password_hash) {
            return Err(AppError::unauthorised(messages::MSG_LOGIN_FAILED));
        }

        debug!(account_id = account.id, "login succeeded");
        self.generate_token_pair(&account)
    }

    /// Exchange a (possibly expired) access token and a live refresh token
    /// for a brand-new pair.
    ///
    /// Five hard gates, in order: the access token must decode (expiry
    /// ignored, signature enforced) and be of access type; the refresh
    /// token must decode strictly and be of refresh type; the two must
    /// share one family identifier; and the identifier must still match a
    /// fresh derivation from the account's current identity. Only then is
    /// a new pair issued.
    ///
    /// # Errors
    ///
    /// Every gate failure is an unauthorised error.
    pub async fn refresh(
        &self,
        database: &Database,
        access_token: &str,
        refresh_token: &str,
    ) -> AppResult<TokenPair> {
        let access_claims = self.decode_ignoring_expiry(access_token)?;
        if access_claims.token_type != TokenType::Access {
            return Err(AppError::unauthorised(messages::MSG_INVALID_ACCESS_TOKEN));
        }

        let refresh_claims = self.decode(refresh_token)?;
        if refresh_claims.token_type != TokenType::Refresh {
            return Err(AppError::unauthorised(messages::MSG_INVALID_REFRESH_TOKEN));
        }

        if access_claims.jti != refresh_claims.jti {
            return Err(AppError::unauthorised(messages::MSG_TOKENS_NOT_PAIRED));
        }

        let account_id: i64 = refresh_claims
            .sub
            .parse()
            .map_err(|_| AppError::unauthorised(messages::MSG_INVALID_REFRESH_TOKEN))?;
        let account = database
            .get_account_by_id(account_id)
            .await
            .map_err(|_| AppError::unauthorised(messages::MSG_REFRESH_REVOKED))?;

        // Identity rotation changes the derivation and strands old tokens.
        if derive_jti(&account) != refresh_claims.jti {
            return Err(AppError::unauthorised(messages::MSG_REFRESH_REVOKED));
        }

        debug!(account_id = account.id, "refresh succeeded");
        self.generate_token_pair(&account)
    }

    /// Strict decode of a presented access token, claims returned verbatim.
    ///
    /// # Errors
    ///
    /// Returns an unauthorised error for an invalid or expired signature,
    /// or when the token is not of access type.
    pub fn current_account(&self, access_token: &str) -> AppResult<TokenClaims> {
        let claims = self.decode(access_token)?;
        if claims.token_type != TokenType::Access {
            return Err(AppError::unauthorised(messages::MSG_INVALID_ACCESS_TOKEN));
        }
        Ok(claims)
    }

    /// Strict decode: signature and expiry both enforced, fails closed.
    ///
    /// # Errors
    ///
    /// Returns an unauthorised error for any signature or expiry failure.
    pub fn decode(&self, token: &str) -> AppResult<TokenClaims> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &Self::validation(true))?;
        Ok(data.claims)
    }

    /// Expiry-ignoring decode: the signature is still enforced. Used only
    /// to read claims off an access token that may have already lapsed
    /// during the refresh flow.
    fn decode_ignoring_expiry(&self, token: &str) -> AppResult<TokenClaims> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &Self::validation(false))?;
        Ok(data.claims)
    }

    fn validation(check_expiry: bool) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = check_expiry;
        validation.validate_nbf = true;
        validation
    }

    fn encode_claims(
        &self,
        account: &Account,
        jti: Uuid,
        token_type: TokenType,
        validity_secs: i64,
    ) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let snapshot = token_type == TokenType::Access;

        let claims = TokenClaims {
            sub: account.id.to_string(),
            jti,
            token_type,
            iat: now,
            nbf: now,
            exp: now + validity_secs,
            name: snapshot.then(|| account.name.clone()),
            role: snapshot.then_some(account.role),
            disabled: snapshot.then_some(account.disabled),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(AppError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use chrono::Utc;

    fn test_account(id: i64, uuid: Uuid) -> Account {
        Account {
            id,
            uuid,
            role: AccountRole::Standard,
            username: format!("driver{id:02}"),
            name: "Test Driver".into(),
            password_hash: "$2b$12$abcdefghijklmnopqrstuv".into(),
            password_last_modified: Utc::now(),
            disabled: false,
            created_at: Utc::now(),
            last_modified: Utc::now(),
        }
    }

    fn manager() -> AuthManager {
        AuthManager::new(b"unit-test-secret")
    }

    #[test]
    fn test_derive_jti_is_deterministic() {
        let account = test_account(1, Uuid::new_v4());

        assert_eq!(derive_jti(&account), derive_jti(&account));
    }

    #[test]
    fn test_derive_jti_changes_with_uuid() {
        let account = test_account(1, Uuid::new_v4());
        let rotated = Account {
            uuid: Uuid::new_v4(),
            ..account.clone()
        };

        assert_ne!(derive_jti(&account), derive_jti(&rotated));
    }

    #[test]
    fn test_derive_jti_changes_with_id() {
        let uuid = Uuid::new_v4();

        assert_ne!(
            derive_jti(&test_account(1, uuid)),
            derive_jti(&test_account(2, uuid))
        );
    }

    #[test]
    fn test_pair_shares_one_jti() {
        let auth = manager();
        let account = test_account(7, Uuid::new_v4());
        let pair = auth.generate_token_pair(&account).unwrap();

        let access = auth.decode(&pair.access_token).unwrap();
        let refresh = auth.decode(&pair.refresh_token).unwrap();

        assert_eq!(access.jti, refresh.jti);
        assert_eq!(access.token_type, TokenType::Access);
        assert_eq!(refresh.token_type, TokenType::Refresh);
        assert_eq!(access.sub, "7");
    }

    #[test]
    fn test_access_claims_snapshot_account_state() {
        let auth = manager();
        let account = test_account(3, Uuid::new_v4());
        let pair = auth.generate_token_pair(&account).unwrap();

        let access = auth.decode(&pair.access_token).unwrap();
        assert_eq!(access.name.as_deref(), Some("Test Driver"));
        assert_eq!(access.role, Some(AccountRole::Standard));
        assert_eq!(access.disabled, Some(false));

        let refresh = auth.decode(&pair.refresh_token).unwrap();
        assert!(refresh.name.is_none());
        assert!(refresh.role.is_none());
        assert!(refresh.disabled.is_none());
    }

    #[test]
    fn test_validities_set_by_encoder() {
        let auth = manager();
        let account = test_account(4, Uuid::new_v4());
        let pair = auth.generate_token_pair(&account).unwrap();

        let access = auth.decode(&pair.access_token).unwrap();
        let refresh = auth.decode(&pair.refresh_token).unwrap();

        assert_eq!(access.exp - access.iat, 120);
        assert_eq!(access.nbf, access.iat);
        assert_eq!(refresh.exp - refresh.iat, 345_600);
    }

    #[test]
    fn test_expired_access_token_fails_strict_decode() {
        // Validity well past the decoder's 60 second leeway.
        let auth = AuthManager::with_validity(b"unit-test-secret", -300, 345_600);
        let account = test_account(5, Uuid::new_v4());
        let pair = auth.generate_token_pair(&account).unwrap();

        let error = auth.current_account(&pair.access_token).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Unauthorised);
        assert_eq!(error.message, "Access token has expired");
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let auth = manager();
        let other = AuthManager::new(b"a-different-secret");
        let account = test_account(6, Uuid::new_v4());
        let pair = other.generate_token_pair(&account).unwrap();

        assert!(auth.decode(&pair.access_token).is_err());
        assert!(auth.decode("not-even-a-token").is_err());
    }

    #[test]
    fn test_current_account_rejects_refresh_token() {
        let auth = manager();
        let account = test_account(8, Uuid::new_v4());
        let pair = auth.generate_token_pair(&account).unwrap();

        let error = auth.current_account(&pair.refresh_token).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Unauthorised);
    }

    #[test]
    fn test_ensure_active_rejects_disabled_snapshot() {
        let auth = manager();
        let account = Account {
            disabled: true,
            ..test_account(9, Uuid::new_v4())
        };
        let pair = auth.generate_token_pair(&account).unwrap();
        let claims = auth.current_account(&pair.access_token).unwrap();

        let error = claims.ensure_active().unwrap_err();
        assert_eq!(error.kind, ErrorKind::Forbidden);
    }

    #[test]
    fn test_ensure_admin_rejects_standard_role() {
        let auth = manager();
        let standard = test_account(10, Uuid::new_v4());
        let admin = Account {
            role: AccountRole::Admin,
            ..test_account(11, Uuid::new_v4())
        };

        let standard_claims = auth
            .current_account(&auth.generate_token_pair(&standard).unwrap().access_token)
            .unwrap();
        let admin_claims = auth
            .current_account(&auth.generate_token_pair(&admin).unwrap().access_token)
            .unwrap();

        assert!(standard_claims.ensure_admin().is_err());
        assert!(admin_claims.ensure_admin().is_ok());
    }

    #[test]
    fn test_password_round_trip() {
        let digest = hash_password("p@ss").unwrap();

        assert_ne!(digest, "p@ss");
        assert!(verify_password("p@ss", &digest));
        assert!(!verify_password("wrong", &digest));
        assert!(!verify_password("p@ss", "not-a-digest"));
    }
}
