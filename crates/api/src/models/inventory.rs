//! Stock references, products and the stock ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use stockroom_core::{
    EmployeeId, LOW_STOCK_THRESHOLD, ProductHistoryId, ProductId, StockId, StockReferenceId,
};

/// A stock period ("sector"). At most one is active at a time.
#[derive(Debug, Clone, Serialize)]
pub struct StockReference {
    pub id: StockReferenceId,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A catalog entry.
///
/// `quantity` is the reserve not yet placed on the stock ledger.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub stock_reference_id: StockReferenceId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
    pub acquisition_value: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Acquisition record for a product, one per product.
#[derive(Debug, Clone, Serialize)]
pub struct ProductHistory {
    pub id: ProductHistoryId,
    pub product_id: ProductId,
    pub stock_reference_id: StockReferenceId,
    pub acquisition_value: Decimal,
    pub product_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductHistory {
    /// Acquisition cost of the units still on record.
    #[must_use]
    pub fn stock_value(&self) -> Decimal {
        self.acquisition_value * Decimal::from(self.product_quantity)
    }
}

/// A product's entry on a stock reference's ledger.
#[derive(Debug, Clone, Serialize)]
pub struct Stock {
    pub id: StockId,
    pub product_id: ProductId,
    pub stock_reference_id: StockReferenceId,
    pub quantity: i32,
    pub available: bool,
    pub responsible_employee_id: Option<EmployeeId>,
    pub date_added: DateTime<Utc>,
}

impl Stock {
    /// Whether this entry should raise a low-stock notification.
    #[must_use]
    pub const fn is_low(&self) -> bool {
        self.quantity < LOW_STOCK_THRESHOLD
    }

    /// Whether `quantity` more units can be sold or reserved from this entry.
    #[must_use]
    pub const fn can_supply(&self, quantity: i32) -> bool {
        quantity <= self.quantity
    }
}

/// Ledger listing row, joined with the product and responsible employee.
#[derive(Debug, Clone, Serialize)]
pub struct StockLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub is_available: bool,
    pub responsible_user: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(quantity: i32) -> Stock {
        Stock {
            id: StockId::generate(),
            product_id: ProductId::generate(),
            stock_reference_id: StockReferenceId::generate(),
            quantity,
            available: true,
            responsible_employee_id: None,
            date_added: Utc::now(),
        }
    }

    #[test]
    fn test_low_stock_is_strictly_below_threshold() {
        assert!(stock(9).is_low());
        assert!(!stock(10).is_low());
    }

    #[test]
    fn test_can_supply_allows_exact_quantity() {
        let entry = stock(5);
        assert!(entry.can_supply(5));
        assert!(!entry.can_supply(6));
    }

    #[test]
    fn test_product_history_stock_value() {
        let history = ProductHistory {
            id: ProductHistoryId::generate(),
            product_id: ProductId::generate(),
            stock_reference_id: StockReferenceId::generate(),
            acquisition_value: Decimal::new(350, 2),
            product_quantity: 4,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(history.stock_value(), Decimal::new(14, 0));
    }
}
