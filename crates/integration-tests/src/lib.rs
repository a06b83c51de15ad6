//! Integration tests for Stockroom.
//!
//! The tests talk to a running server over HTTP and are `#[ignore]`d by
//! default.
//!
//! # Running Tests
//!
//! ```bash
//! stockroom migrate
//! stockroom employee create -u it-admin -e it-admin@example.com -n "IT Admin" \
//!     -r admin --contact 900000000
//! STOCKROOM_TRUST_PROXY=true cargo run -p stockroom-api &
//! STOCKROOM_TEST_ADMIN_PASSWORD=... cargo test -p stockroom-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOCKROOM_BASE_URL` - server root (default `http://localhost:8000`)
//! - `STOCKROOM_TEST_ADMIN_USERNAME` - admin login (default `it-admin`)
//! - `STOCKROOM_TEST_ADMIN_PASSWORD` - admin password
//!
//! Tests work inside whichever stock reference is active and create their own
//! uniquely named products, so they can share one database.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{Value, json};
use thiserror::Error;
use uuid::Uuid;

/// Server root, without the `/api` prefix.
#[must_use]
pub fn base_url() -> String {
    std::env::var("STOCKROOM_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// A short unique suffix for names that must not collide between runs.
#[must_use]
pub fn unique(prefix: &str) -> String {
    let id: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
    format!("{prefix}-{id}")
}

/// A random address in 198.18.0.0/15 so every login gets its own
/// rate-limit bucket. Only honoured when the server runs with
/// `STOCKROOM_TRUST_PROXY=true`.
#[must_use]
pub fn test_client_ip() -> String {
    let bytes = Uuid::new_v4().into_bytes();
    format!("198.{}.{}.{}", 18 + (bytes[0] & 1), bytes[1], bytes[2])
}

/// An HTTP client holding an access token.
pub struct Session {
    pub client: Client,
    pub access: String,
    pub refresh: String,
    pub employee_id: String,
}

/// Errors while setting up a session.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}: {1}")]
    Status(StatusCode, String),

    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),
}

impl Session {
    /// Log in with a username and password.
    ///
    /// # Errors
    ///
    /// Returns `SetupError` if the request fails or the login is refused.
    pub async fn login(username: &str, password: &str) -> Result<Self, SetupError> {
        let client = Client::new();
        let resp = client
            .post(format!("{}/api/token", base_url()))
            .header("x-forwarded-for", test_client_ip())
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;

        if resp.status() != StatusCode::OK {
            let status = resp.status();
            return Err(SetupError::Status(status, resp.text().await?));
        }

        let body: Value = resp.json().await?;
        let field = |v: &Value| v.as_str().unwrap_or_default().to_string();
        Ok(Self {
            client,
            access: field(&body["access"]),
            refresh: field(&body["refresh"]),
            employee_id: field(&body["employee"]["id"]),
        })
    }

    /// Log in as the bootstrap admin.
    ///
    /// # Errors
    ///
    /// Returns `SetupError` if the password is not configured or login fails.
    pub async fn admin() -> Result<Self, SetupError> {
        let username = std::env::var("STOCKROOM_TEST_ADMIN_USERNAME")
            .unwrap_or_else(|_| "it-admin".to_string());
        let password = std::env::var("STOCKROOM_TEST_ADMIN_PASSWORD")
            .map_err(|_| SetupError::MissingEnv("STOCKROOM_TEST_ADMIN_PASSWORD"))?;
        Self::login(&username, &password).await
    }

    /// Create an employee with the `employee` role and log in as them.
    ///
    /// # Errors
    ///
    /// Returns `SetupError` if creation or login fails.
    pub async fn new_employee(&self) -> Result<Self, SetupError> {
        let username = unique("clerk");
        let password = "correct-horse-battery";
        let resp = self
            .post("/employees")
            .json(&json!({
                "name": "Test Clerk",
                "username": username,
                "email": format!("{username}@example.com"),
                "password": password,
                "contact": "912345678",
                "address": "1 Test Street",
                "role": "employee",
            }))
            .send()
            .await?;

        if resp.status() != StatusCode::CREATED {
            let status = resp.status();
            return Err(SetupError::Status(status, resp.text().await?));
        }
        Self::login(&username, password).await
    }

    fn url(path: &str) -> String {
        format!("{}/api{path}", base_url())
    }

    #[must_use]
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(Self::url(path)).bearer_auth(&self.access)
    }

    #[must_use]
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(Self::url(path)).bearer_auth(&self.access)
    }

    #[must_use]
    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(Self::url(path)).bearer_auth(&self.access)
    }

    #[must_use]
    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.client.patch(Self::url(path)).bearer_auth(&self.access)
    }

    #[must_use]
    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(Self::url(path)).bearer_auth(&self.access)
    }

    /// Create a product in the active reference and place `on_ledger` units
    /// of its `reserve` on the stock ledger. Returns the product id.
    ///
    /// # Errors
    ///
    /// Returns `SetupError` if either request is refused.
    pub async fn stocked_product(
        &self,
        price: &str,
        reserve: i32,
        on_ledger: i32,
    ) -> Result<String, SetupError> {
        let resp = self
            .post("/products")
            .json(&json!({
                "name": unique("product"),
                "price": price,
                "quantity": reserve,
                "acquisition_value": "1.00",
            }))
            .send()
            .await?;
        let product = expect_status(resp, StatusCode::CREATED).await?;
        let product_id = product["id"].as_str().unwrap_or_default().to_string();

        let resp = self
            .post("/stock")
            .json(&json!({ "product_id": product_id, "quantity": on_ledger }))
            .send()
            .await?;
        expect_status(resp, StatusCode::CREATED).await?;

        Ok(product_id)
    }
}

/// Check a response's status and parse its JSON body.
///
/// # Errors
///
/// Returns `SetupError::Status` with the body when the status differs.
pub async fn expect_status(resp: Response, expected: StatusCode) -> Result<Value, SetupError> {
    let status = resp.status();
    if status != expected {
        return Err(SetupError::Status(status, resp.text().await?));
    }
    Ok(resp.json().await.unwrap_or(Value::Null))
}
