//! Identity tokens.
//!
//! Tokens are compact HS256 JWTs carrying the user id, email and role. They are issued on
//! register and login and validated on every protected request.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use medvault_core::models::{User, UserRole};
use medvault_core::CoreConfig;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Errors from issuing or validating identity tokens.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

/// Claims carried by an identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates identity tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    secret: Vec<u8>,
    /// `None` when the configured lifetime does not fit a `Duration`.
    ttl: Option<Duration>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a token service.
    ///
    /// # Arguments
    ///
    /// * `secret` - HMAC signing secret.
    /// * `ttl_hours` - Token lifetime in hours.
    pub fn new(secret: impl AsRef<[u8]>, ttl_hours: i64) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            ttl: Duration::try_hours(ttl_hours),
        }
    }

    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self::new(cfg.jwt_secret(), cfg.jwt_expiration_hours())
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Issues a token for `user`, valid from now for the configured lifetime.
    ///
    /// # Errors
    ///
    /// [`TokenError::Signing`] if the lifetime is out of range or signing fails.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = Utc::now();
        let expires_at = self
            .ttl
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| TokenError::Signing("token lifetime is out of range".into()))?;
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        self.encode(&claims)
    }

    fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = JwtHeader {
            alg: "HS256".into(),
            typ: "JWT".into(),
        };
        let header_json =
            serde_json::to_vec(&header).map_err(|e| TokenError::Signing(e.to_string()))?;
        let claims_json =
            serde_json::to_vec(claims).map_err(|e| TokenError::Signing(e.to_string()))?;

        let message = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header_json),
            URL_SAFE_NO_PAD.encode(claims_json)
        );

        let mut mac = self.mac()?;
        mac.update(message.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{message}.{signature}"))
    }

    /// Validates a token's signature and expiry and returns its claims.
    ///
    /// # Errors
    ///
    /// - [`TokenError::Malformed`] if the token is not three base64url segments with JSON
    ///   header and claims.
    /// - [`TokenError::BadSignature`] if the signature does not match.
    /// - [`TokenError::Expired`] if `exp` is in the past.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let header: JwtHeader = URL_SAFE_NO_PAD
            .decode(header_b64)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .ok_or(TokenError::Malformed)?;
        if header.alg != "HS256" {
            return Err(TokenError::Malformed);
        }

        let claims: Claims = URL_SAFE_NO_PAD
            .decode(claims_b64)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .ok_or(TokenError::Malformed)?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "ada@example.com".into(),
            phone: String::new(),
            password_hash: String::new(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            date_of_birth: None,
            is_email_verified: false,
            is_phone_verified: false,
            role: UserRole::Patient,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_issue_and_validate() {
        let service = TokenService::new("secret", 24);
        let user = user();
        let token = service.issue(&user).expect("issue");

        let claims = service.validate(&token).expect("validate");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.role, UserRole::Patient);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_out_of_range_lifetime_fails_to_issue() {
        for ttl_hours in [1_000_000_000_000, i64::MAX] {
            let err = TokenService::new("secret", ttl_hours)
                .issue(&user())
                .expect_err("lifetime beyond the calendar should not issue");
            assert!(matches!(err, TokenError::Signing(_)), "{ttl_hours}");
        }
    }

    #[test]
    fn test_rejects_token_signed_with_other_secret() {
        let token = TokenService::new("secret-a", 24)
            .issue(&user())
            .expect("issue");
        assert_eq!(
            TokenService::new("secret-b", 24).validate(&token),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn test_rejects_tampered_claims() {
        let service = TokenService::new("secret", 24);
        let token = service.issue(&user()).expect("issue");
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&serde_json::json!({
                "sub": Uuid::new_v4(),
                "email": "mallory@example.com",
                "role": "doctor",
                "iat": 0,
                "exp": i64::MAX,
            }))
            .unwrap(),
        );
        parts[1] = &forged;
        assert_eq!(
            service.validate(&parts.join(".")),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn test_rejects_expired_token() {
        let service = TokenService::new("secret", 24);
        let now = Utc::now().timestamp();
        let token = service
            .encode(&Claims {
                sub: Uuid::new_v4(),
                email: "ada@example.com".into(),
                role: UserRole::Patient,
                iat: now - 7200,
                exp: now - 3600,
            })
            .expect("encode");
        assert_eq!(service.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        let service = TokenService::new("secret", 24);
        for bad in ["", "abc", "a.b", "a.b.c.d", "a.b.!!!"] {
            assert_eq!(service.validate(bad), Err(TokenError::Malformed), "{bad}");
        }
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
    }
}
