//! Low-stock notifications.

use chrono::{DateTime, Utc};
use serde::Serialize;

use stockroom_core::{
    EmployeeId, LOW_STOCK_THRESHOLD, NotificationId, ProductId, StockReferenceId,
};

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub employee_id: EmployeeId,
    pub stock_reference_id: StockReferenceId,
    pub product_id: Option<ProductId>,
    pub product_description: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Message stored on a low-stock notification.
#[must_use]
pub fn low_stock_message(product_name: &str) -> String {
    format!("Product '{product_name}' is below {LOW_STOCK_THRESHOLD} units in stock.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_stock_message_names_product() {
        assert_eq!(
            low_stock_message("Arroz 1kg"),
            "Product 'Arroz 1kg' is below 10 units in stock."
        );
    }
}
