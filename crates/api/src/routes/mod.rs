//! HTTP route handlers, nested under `/api`.
//!
//! # Route Structure
//!
//! ```text
//! # Auth (token endpoints are public and rate limited)
//! POST   /token                               - Obtain access/refresh pair
//! POST   /token/refresh                       - New access token
//! GET    /login-activity                      - Login attempts (admin)
//!
//! # Employees
//! GET    /employees                           - List
//! POST   /employees                           - Create (admin)
//! GET    /employees/{id}                      - Detail
//! PUT    /employees/{id}                      - Update (admin)
//! DELETE /employees/{id}                      - Delete (admin)
//! PUT    /employees/{id}/sector               - Assign stock reference (admin)
//! GET    /employees/{id}/sales                - Unarchived sales, grouped
//! GET    /employees/{id}/action-history       - Actions of one employee
//! GET    /employee-history                    - Name/role changes
//!
//! # Stock references
//! GET    /stock-references                    - List
//! POST   /stock-references                    - Create (admin)
//! GET    /stock-references/{id}               - Detail
//! PUT    /stock-references/{id}               - Update (admin)
//! DELETE /stock-references/{id}               - Delete (admin)
//! POST   /stock-references/{id}/activate      - Make the only active one (admin)
//! POST   /stock-references/{id}/deactivate    - Deactivate (admin)
//!
//! # Catalog and stock ledger
//! GET    /products                            - Active reference's products
//! POST   /products                            - Create
//! GET    /products/{id}                       - Detail
//! PUT    /products/{id}                       - Update, quantity is a delta
//! DELETE /products/{id}                       - Delete (admin)
//! GET    /stock                               - Active ledger
//! POST   /stock                               - Place from reserve
//! PUT    /stock/{product_id}                  - Top up from reserve
//! DELETE /stock/{product_id}                  - Return to reserve
//!
//! # Sales and cart
//! GET    /sales                               - All sales
//! POST   /sales                               - Record a sale
//! GET    /sales/aggregate-by-date             - Daily totals
//! GET    /sales/by-employee                   - Totals per employee
//! POST   /sales/archive                       - Archive all (admin)
//! GET    /cart                                - Caller's cart
//! POST   /cart/add                            - Add item
//! DELETE /cart/items/{item_id}                - Remove item
//! GET    /cart/employees/{employee_id}/items  - Another employee's items
//!
//! # Notifications, audit, reports
//! GET    /notifications                       - Unread low-stock alerts
//! PATCH  /notifications/{id}/read             - Mark read
//! GET    /action-history                      - All actions
//! GET    /reports/summary                     - Profit and margin
//! GET    /reports/product-value               - Acquisition value on hand
//! GET    /reports/total-sales                 - Lifetime sales value
//! GET    /reports/employee?id=&date=          - Employee invoice (PDF)
//! GET    /reports/receipt?sale_id=            - Sale receipt (PDF)
//! ```

pub mod audit;
pub mod auth;
pub mod cart;
pub mod employees;
pub mod notifications;
pub mod products;
pub mod reports;
pub mod sales;
pub mod stock;
pub mod stock_references;

use axum::Router;
use serde::Serialize;

use crate::state::AppState;

/// Plain `{message}` body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Build the API router. `trust_proxy` is forwarded to the auth rate limiter.
pub fn routes(trust_proxy: bool) -> Router<AppState> {
    Router::new()
        .merge(auth::router(trust_proxy))
        .merge(employees::router())
        .merge(stock_references::router())
        .merge(products::router())
        .merge(stock::router())
        .merge(sales::router())
        .merge(cart::router())
        .merge(notifications::router())
        .merge(audit::router())
        .merge(reports::router())
}
