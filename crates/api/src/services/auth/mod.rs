//! Authentication service.
//!
//! Provides password login, employee registration and JWT issuance.

mod error;
pub mod jwt;

pub use error::AuthError;
pub use jwt::{Claims, JwtService, TokenError, TokenPair, TokenType};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use stockroom_core::{Contact, Email, EmployeeRole, LoginStatus};

use crate::db::{EmployeeRepository, NewEmployee, RepositoryError};
use crate::models::Employee;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Unvalidated registration input.
#[derive(Debug, Clone)]
pub struct Registration<'r> {
    pub username: &'r str,
    pub email: &'r str,
    pub password: &'r str,
    pub name: &'r str,
    pub contact: &'r str,
    pub address: &'r str,
    pub role: EmployeeRole,
}

/// Authentication service.
pub struct AuthService<'a> {
    employees: EmployeeRepository<'a>,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            employees: EmployeeRepository::new(pool),
        }
    }

    /// Register a new employee.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` or `AuthError::InvalidContact` for
    /// malformed input.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::EmployeeAlreadyExists` if the username or email is taken.
    pub async fn register(&self, registration: &Registration<'_>) -> Result<Employee, AuthError> {
        let email = Email::parse(registration.email)?;
        let contact = Contact::parse(registration.contact)?;
        validate_password(registration.password)?;

        let username = registration.username.trim();
        if username.is_empty() {
            return Err(AuthError::MissingField("username"));
        }

        let new = NewEmployee {
            username: username.to_string(),
            email,
            password_hash: hash_password(registration.password)?,
            name: registration.name.trim().to_string(),
            contact,
            address: registration.address.trim().to_string(),
            role: registration.role,
        };

        self.employees.create(&new).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::EmployeeAlreadyExists,
            other => AuthError::Repository(other),
        })
    }

    /// Check a username and password and record the attempt.
    ///
    /// Inactive employees are rejected exactly like a wrong password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the login fails.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        ip_address: Option<&str>,
    ) -> Result<Employee, AuthError> {
        let employee = self.employees.get_by_username(username).await?;

        let verified = employee
            .filter(|e| e.is_active)
            .filter(|e| verify_password(password, &e.password_hash).is_ok());

        let status = if verified.is_some() {
            LoginStatus::Success
        } else {
            LoginStatus::Failure
        };
        self.employees
            .record_login(verified.as_ref().map(|e| e.id), username, status, ip_address)
            .await?;

        verified.ok_or(AuthError::InvalidCredentials)
    }
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("balcao-2026").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("balcao-2026", &hash).is_ok());
        assert!(matches!(
            verify_password("balcao-2025", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
    }
}
