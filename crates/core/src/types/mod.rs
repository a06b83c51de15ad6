//! Core types for Stockroom.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod email;
pub mod id;
pub mod money;
pub mod role;

pub use contact::{Contact, ContactError};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::{LOW_STOCK_THRESHOLD, ProfitSummary, TAX_RATE_PERCENT, line_total, tax_on};
pub use role::{EmployeeRole, LoginStatus};
