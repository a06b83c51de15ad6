//! Domain models for the API.
//!
//! Row types live next to their queries in [`crate::db`]; these are the
//! validated values handlers work with and serialize.

pub mod cart;
pub mod employee;
pub mod inventory;
pub mod notification;
pub mod sale;

pub use cart::{Cart, CartItem};
pub use employee::{CurrentEmployee, Employee, EmployeeHistory, LoginActivity};
pub use inventory::{Product, ProductHistory, Stock, StockLine, StockReference};
pub use notification::Notification;
pub use sale::{
    ActionHistory, DailySales, EmployeeSaleLine, EmployeeSalesGroup, EmployeeSalesReport,
    EmployeeSalesTotal, Sale, SaleSnapshot,
};
