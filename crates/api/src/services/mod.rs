//! Business logic on top of the repositories.
//!
//! - [`auth`] - password login, registration and JWT issuance
//! - [`checkout`] - sale recording and cart admission
//! - [`receipt`] - PDF invoices

pub mod auth;
pub mod checkout;
pub mod receipt;
