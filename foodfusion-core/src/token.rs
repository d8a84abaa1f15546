//! JWT access tokens
//!
//! Tokens are HS256-signed and carry the claims below.
//!
//! | Claim   | Description                               |
//! | ------- | ----------------------------------------- |
//! | `iss`   | Issuer, `foodfusion` unless configured    |
//! | `iat`   | Issued-at, unix seconds                   |
//! | `exp`   | Expiry, unix seconds                      |
//! | `sub`   | The user ID                               |
//! | `email` | The user's email address at issue time    |
//!
//! [`TokenIssuer::verify`] is the only way to obtain [`Claims`] from a token.
//! Refresh goes through [`TokenIssuer::decode_ignoring_expiry`], which yields
//! [`ExpiredClaims`]; that type can only be handed back to
//! [`TokenIssuer::refresh`], so an expired token never authorizes a request.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::{
    Error, UserId,
    error::{CryptoError, SessionError, ValidationError},
};

pub const DEFAULT_ISSUER: &str = "foodfusion";

/// Longest lifetime a token may be issued with.
pub const MAX_TTL: Duration = Duration::days(365);

/// Signing configuration for access tokens
#[derive(Clone)]
pub struct JwtConfig {
    secret_key: Vec<u8>,
    pub issuer: String,
    pub ttl: Duration,
}

impl JwtConfig {
    /// Create a configuration signing with the given HS256 secret.
    pub fn new_hs256(secret_key: impl Into<Vec<u8>>) -> Self {
        Self {
            secret_key: secret_key.into(),
            issuer: DEFAULT_ISSUER.to_string(),
            ttl: Duration::days(1),
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.secret_key.is_empty() {
            return Err(ValidationError::InvalidField(
                "JWT secret must not be empty".to_string(),
            ));
        }
        if self.ttl <= Duration::zero() {
            return Err(ValidationError::InvalidField(
                "JWT lifetime must be positive".to_string(),
            ));
        }
        if self.ttl > MAX_TTL {
            return Err(ValidationError::InvalidField(format!(
                "JWT lifetime must be at most {} days",
                MAX_TTL.num_days()
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret_key", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub sub: String,
    pub email: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<UserId, Error> {
        self.sub
            .parse()
            .map_err(|_| SessionError::InvalidToken("subject is not a user ID".to_string()).into())
    }
}

/// Claims from a correctly signed token whose expiry was not checked.
///
/// Only usable with [`TokenIssuer::refresh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredClaims(Claims);

impl ExpiredClaims {
    pub fn subject(&self) -> &str {
        &self.0.sub
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }

    pub fn expires_at(&self) -> i64 {
        self.0.exp
    }
}

/// Issues and checks access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(&config.secret_key);
        let decoding_key = DecodingKey::from_secret(&config.secret_key);
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Issue a token for a user, valid for the configured lifetime.
    pub fn issue(&self, user_id: UserId, email: &str) -> Result<String, Error> {
        self.issue_for_subject(user_id.to_string(), email.to_string())
    }

    /// Sign arbitrary claims.
    pub fn sign(&self, claims: &Claims) -> Result<String, Error> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| CryptoError::JwtSigning(e.to_string()).into())
    }

    /// Check signature, issuer and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, Error> {
        decode::<Claims>(token, &self.decoding_key, &self.validation(true))
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => SessionError::Expired.into(),
                _ => SessionError::InvalidToken(e.to_string()).into(),
            })
    }

    /// Check signature and issuer but accept an expired token.
    pub fn decode_ignoring_expiry(&self, token: &str) -> Result<ExpiredClaims, Error> {
        decode::<Claims>(token, &self.decoding_key, &self.validation(false))
            .map(|data| ExpiredClaims(data.claims))
            .map_err(|e| SessionError::InvalidToken(e.to_string()).into())
    }

    /// Issue a fresh token for the subject of a previously issued one.
    pub fn refresh(&self, claims: &ExpiredClaims) -> Result<String, Error> {
        tracing::debug!(sub = %claims.subject(), "Refreshing access token");
        self.issue_for_subject(claims.0.sub.clone(), claims.0.email.clone())
    }

    fn issue_for_subject(&self, sub: String, email: String) -> Result<String, Error> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(self.config.ttl).ok_or_else(|| {
            ValidationError::InvalidField("JWT lifetime is out of range".to_string())
        })?;
        let claims = Claims {
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            sub,
            email,
        };
        self.sign(&claims)
    }

    fn validation(&self, check_expiry: bool) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.issuer.as_str()]);
        validation.validate_exp = check_expiry;
        validation.leeway = 0;
        validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &[u8] = b"test_secret_key_for_hs256_jwt_tokens_not_for_production_use";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(JwtConfig::new_hs256(TEST_SECRET))
    }

    fn expired_claims() -> Claims {
        let now = Utc::now();
        Claims {
            iss: DEFAULT_ISSUER.to_string(),
            iat: (now - Duration::days(2)).timestamp(),
            exp: (now - Duration::days(1)).timestamp(),
            sub: "7".to_string(),
            email: "chef@example.com".to_string(),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = issuer();
        let token = issuer.issue(UserId::new(7), "chef@example.com").unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.iss, "foodfusion");
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.email, "chef@example.com");
        assert_eq!(claims.exp - claims.iat, 86_400);
        assert_eq!(claims.user_id().unwrap(), UserId::new(7));
    }

    #[test]
    fn test_verify_rejects_expired() {
        let issuer = issuer();
        let token = issuer.sign(&expired_claims()).unwrap();

        let result = issuer.verify(&token);
        assert!(matches!(result, Err(Error::Session(SessionError::Expired))));
    }

    #[test]
    fn test_decode_ignoring_expiry_accepts_expired() {
        let issuer = issuer();
        let token = issuer.sign(&expired_claims()).unwrap();

        let expired = issuer.decode_ignoring_expiry(&token).unwrap();
        assert_eq!(expired.subject(), "7");
        assert_eq!(expired.email(), "chef@example.com");

        let refreshed = issuer.refresh(&expired).unwrap();
        let claims = issuer.verify(&refreshed).unwrap();
        assert_eq!(claims.sub, "7");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_wrong_secret_rejected_by_both_paths() {
        let other = TokenIssuer::new(JwtConfig::new_hs256(b"another_secret".to_vec()));
        let token = other.issue(UserId::new(1), "a@example.com").unwrap();

        let issuer = issuer();
        assert!(matches!(
            issuer.verify(&token),
            Err(Error::Session(SessionError::InvalidToken(_)))
        ));
        assert!(matches!(
            issuer.decode_ignoring_expiry(&token),
            Err(Error::Session(SessionError::InvalidToken(_)))
        ));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let other = TokenIssuer::new(JwtConfig::new_hs256(TEST_SECRET).with_issuer("elsewhere"));
        let token = other.issue(UserId::new(1), "a@example.com").unwrap();

        assert!(issuer().verify(&token).is_err());
        assert!(issuer().decode_ignoring_expiry(&token).is_err());
    }

    #[test]
    fn test_garbage_token() {
        assert!(matches!(
            issuer().verify("invalid.jwt.token"),
            Err(Error::Session(SessionError::InvalidToken(_)))
        ));
    }

    #[test]
    fn test_config_validation() {
        assert!(JwtConfig::new_hs256(TEST_SECRET).validate().is_ok());
        assert!(JwtConfig::new_hs256(Vec::new()).validate().is_err());
        assert!(
            JwtConfig::new_hs256(TEST_SECRET)
                .with_ttl(Duration::zero())
                .validate()
                .is_err()
        );
        assert!(
            JwtConfig::new_hs256(TEST_SECRET)
                .with_ttl(Duration::seconds(9_000_000_000_000))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_unrepresentable_ttl_is_an_error() {
        let tokens = TokenIssuer::new(
            JwtConfig::new_hs256(TEST_SECRET).with_ttl(Duration::seconds(9_000_000_000_000)),
        );
        let err = tokens.issue(UserId::new(1), "a@example.com").unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", JwtConfig::new_hs256(TEST_SECRET));
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("test_secret_key"));
    }
}
