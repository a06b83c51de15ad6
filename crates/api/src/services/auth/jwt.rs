//! JWT access and refresh tokens (HS256).

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockroom_core::{EmployeeId, EmployeeRole};

use crate::config::JwtConfig;
use crate::models::CurrentEmployee;

/// Which of the two tokens a JWT is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims carried by both token types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: EmployeeId,
    pub username: String,
    pub role: EmployeeRole,
    pub token_type: TokenType,
    pub exp: i64,
    pub iat: i64,
}

impl From<Claims> for CurrentEmployee {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("expected a {expected:?} token")]
    WrongType { expected: TokenType },

    #[error("token generation failed: {0}")]
    Generation(String),
}

/// A freshly issued access/refresh pair.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Issues and validates tokens with the configured secret and lifetimes.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_ttl: Duration::minutes(config.access_token_minutes),
            refresh_ttl: Duration::days(config.refresh_token_days),
        }
    }

    /// Issue an access and a refresh token for an employee.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Generation` if signing fails.
    pub fn issue_pair(&self, employee: &CurrentEmployee) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access: self.issue(employee, TokenType::Access)?,
            refresh: self.issue(employee, TokenType::Refresh)?,
        })
    }

    /// Issue a single token of the given type.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Generation` if signing fails.
    pub fn issue(
        &self,
        employee: &CurrentEmployee,
        token_type: TokenType,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };

        self.sign(&Claims {
            sub: employee.id,
            username: employee.username.clone(),
            role: employee.role,
            token_type,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        })
    }

    /// Decode a token and check it is of the expected type.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired`, `TokenError::InvalidSignature` or
    /// `TokenError::Invalid` when decoding fails, and `TokenError::WrongType`
    /// when the token is valid but of the other type.
    pub fn validate(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Invalid(e.to_string()),
            }
        })?;

        if data.claims.token_type != expected {
            return Err(TokenError::WrongType { expected });
        }
        Ok(data.claims)
    }

    /// Extract the token from an `Authorization` header value.
    #[must_use]
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn service() -> JwtService {
        JwtService::new(&JwtConfig {
            secret: SecretString::from("kX9#mQ2$vL7@pR4!nT6&wZ8*bC3^dF5%"),
            access_token_minutes: 30,
            refresh_token_days: 7,
        })
    }

    fn employee() -> CurrentEmployee {
        CurrentEmployee {
            id: EmployeeId::generate(),
            username: "rui".to_string(),
            role: EmployeeRole::Admin,
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = service();
        let employee = employee();

        let pair = service.issue_pair(&employee).unwrap();
        let claims = service.validate(&pair.access, TokenType::Access).unwrap();

        assert_eq!(claims.sub, employee.id);
        assert_eq!(claims.role, EmployeeRole::Admin);
        assert_eq!(CurrentEmployee::from(claims), employee);
    }

    #[test]
    fn test_access_token_lifetime() {
        let service = service();
        let token = service.issue(&employee(), TokenType::Access).unwrap();
        let claims = service.validate(&token, TokenType::Access).unwrap();
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let service = service();
        let pair = service.issue_pair(&employee()).unwrap();

        let err = service.validate(&pair.refresh, TokenType::Access).unwrap_err();
        assert!(matches!(err, TokenError::WrongType { expected: TokenType::Access }));

        let err = service.validate(&pair.access, TokenType::Refresh).unwrap_err();
        assert!(matches!(err, TokenError::WrongType { expected: TokenType::Refresh }));
    }

    #[test]
    fn test_expired_token() {
        let service = service();
        let past = Utc::now() - Duration::hours(2);
        let employee = employee();
        let token = service
            .sign(&Claims {
                sub: employee.id,
                username: employee.username,
                role: employee.role,
                token_type: TokenType::Access,
                exp: (past + Duration::minutes(30)).timestamp(),
                iat: past.timestamp(),
            })
            .unwrap();

        let err = service.validate(&token, TokenType::Access).unwrap_err();
        assert!(matches!(err, TokenError::Expired));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let other = JwtService::new(&JwtConfig {
            secret: SecretString::from("Zq8!Lp3@Xv6#Nb1$Mc7%Hd2^Jf9&Kg4*"),
            access_token_minutes: 30,
            refresh_token_days: 7,
        });
        let token = other.issue(&employee(), TokenType::Access).unwrap();

        let err = service().validate(&token, TokenType::Access).unwrap_err();
        assert!(matches!(err, TokenError::InvalidSignature));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let err = service().validate("not-a-jwt", TokenType::Access).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(JwtService::extract_from_header("Bearer abc.def"), Some("abc.def"));
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
        assert_eq!(JwtService::extract_from_header("Bearer "), None);
    }
}
