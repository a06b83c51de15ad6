//! Stockroom Core - Shared domain types.
//!
//! This crate provides the types shared by every Stockroom component:
//! - `api` - HTTP backend (employees, catalog, stock ledger, sales, reports)
//! - `cli` - Command-line tools for migrations and maintenance
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Database encoding is opt-in through the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, validated emails and contacts, roles, and money math

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
