//! JWT access-token and invitation-token helpers.
//!
//! Both token kinds are HS256-signed with the same secret and told apart by
//! their `scope` claim. Access tokens authenticate API calls; invitation
//! tokens are embedded in the onboarding link and stored verbatim on the
//! session, which resolves them by exact match.

use hrflow_core::onboarding::{invitation_expiry, INVITATION_SCOPE};
use hrflow_core::types::{DbId, Timestamp};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `scope` claim carried by access tokens.
pub const ACCESS_SCOPE: &str = "access";

/// `token_type` reported alongside an issued access token.
pub const TOKEN_TYPE: &str = "bearer";

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    /// The user's company (tenant) id.
    pub cid: DbId,
    /// The user's role name (e.g. `"admin"`, `"employee"`).
    pub role: String,
    pub email: String,
    pub scope: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4).
    pub jti: String,
}

/// Claims embedded in an onboarding invitation token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InvitationClaims {
    /// Subject -- the invited email address.
    pub sub: String,
    pub cid: DbId,
    pub scope: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime in minutes (default: 60).
    pub access_token_expiry_mins: i64,
}

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                  | Required | Default |
    /// |--------------------------|----------|---------|
    /// | `JWT_SECRET`             | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS` | no       | `60`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins: i64 = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64");

        Self {
            secret,
            access_token_expiry_mins,
        }
    }
}

/// Generate an HS256 access token for the given user.
pub fn generate_access_token(
    user_id: DbId,
    company_id: DbId,
    role: &str,
    email: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let exp = now + config.access_token_expiry_mins * 60;

    let claims = Claims {
        sub: user_id,
        cid: company_id,
        role: role.to_string(),
        email: email.to_string(),
        scope: ACCESS_SCOPE.to_string(),
        exp,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode an access token, returning the embedded [`Claims`].
///
/// Validates the signature and expiration. Tokens of any other scope
/// (invitation tokens in particular) are rejected.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    if token_data.claims.scope != ACCESS_SCOPE {
        return Err(ErrorKind::InvalidToken.into());
    }
    Ok(token_data.claims)
}

/// Mint the invitation token for `email`, valid for 24 hours from
/// `issued_at`.
pub fn generate_invitation_token(
    email: &str,
    company_id: DbId,
    issued_at: Timestamp,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = InvitationClaims {
        sub: email.to_string(),
        cid: company_id,
        scope: INVITATION_SCOPE.to_string(),
        exp: invitation_expiry(issued_at).timestamp(),
        iat: issued_at.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Decode an invitation token without checking expiry.
///
/// Session resolution owns the expiry decision (it has to persist the
/// `expired` status), so only the signature and scope are verified here.
pub fn decode_invitation_token(
    token: &str,
    config: &JwtConfig,
) -> Result<InvitationClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.validate_exp = false;
    let token_data = decode::<InvitationClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    if token_data.claims.scope != INVITATION_SCOPE {
        return Err(ErrorKind::InvalidToken.into());
    }
    Ok(token_data.claims)
}
