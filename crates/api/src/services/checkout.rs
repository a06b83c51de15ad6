//! Sale checkout and cart admission.
//!
//! Both flows check stock against the active reference's ledger with the
//! same rule. A sale re-runs that rule inside its transaction with the stock
//! row locked, so two concurrent sales can never oversell.

use sqlx::PgPool;
use thiserror::Error;

use stockroom_core::{EmployeeId, ProductId};

use crate::db::{
    CartRepository, EmployeeRepository, ProductRepository, RecordedSale, RepositoryError,
    SaleDraft, SaleOutcome, SaleRepository, StockReferenceRepository, StockRepository,
};
use crate::models::{CartItem, Stock};

/// Why a sale or cart addition was refused.
#[derive(Debug, Error)]
pub enum SaleError {
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("no active stock reference")]
    NoActiveReference,

    #[error("product not found")]
    ProductNotFound,

    #[error("product is not in the active stock")]
    NotOnLedger,

    #[error("product history not found")]
    HistoryNotFound,

    #[error("product is not available for sale")]
    Unavailable,

    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i32, available: i32 },

    #[error("seller not found")]
    SellerNotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// The stock rule shared by sales and carts: the entry must be available and
/// hold at least `requested` units.
///
/// # Errors
///
/// Returns `SaleError::Unavailable` or `SaleError::InsufficientStock`.
pub fn check_stock(stock: &Stock, requested: i32) -> Result<(), SaleError> {
    if !stock.available {
        return Err(SaleError::Unavailable);
    }
    if !stock.can_supply(requested) {
        return Err(SaleError::InsufficientStock {
            requested,
            available: stock.quantity,
        });
    }
    Ok(())
}

fn check_quantity(quantity: i32) -> Result<(), SaleError> {
    if quantity < 1 {
        return Err(SaleError::InvalidQuantity);
    }
    Ok(())
}

pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Sell `quantity` units of a product from the active reference.
    ///
    /// # Errors
    ///
    /// Returns the first failing check as a `SaleError`, in the order:
    /// quantity, active reference, product, ledger entry, product history,
    /// availability, stock level.
    #[tracing::instrument(skip(self))]
    pub async fn sell(
        &self,
        seller_id: EmployeeId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<RecordedSale, SaleError> {
        check_quantity(quantity)?;

        let reference = StockReferenceRepository::new(self.pool)
            .get_active()
            .await?
            .ok_or(SaleError::NoActiveReference)?;

        let products = ProductRepository::new(self.pool);
        let product = products
            .get_by_id(product_id)
            .await?
            .ok_or(SaleError::ProductNotFound)?;

        let stock = StockRepository::new(self.pool)
            .get(reference.id, product_id)
            .await?
            .ok_or(SaleError::NotOnLedger)?;

        let history = products
            .get_history(product_id)
            .await?
            .ok_or(SaleError::HistoryNotFound)?;

        check_stock(&stock, quantity)?;

        let seller = EmployeeRepository::new(self.pool)
            .get_by_id(seller_id)
            .await?
            .ok_or(SaleError::SellerNotFound)?;

        let draft = SaleDraft {
            seller: &seller,
            product: &product,
            stock_id: stock.id,
            stock_reference_id: reference.id,
            acquisition_value: history.acquisition_value,
            quantity,
        };

        match SaleRepository::new(self.pool).record(&draft).await {
            Ok(SaleOutcome::Recorded(recorded)) => {
                tracing::info!(
                    sale_id = %recorded.sale.id,
                    product = %product.name,
                    quantity,
                    remaining = recorded.remaining_stock,
                    "Sale recorded"
                );
                if recorded.low_stock_notified {
                    tracing::warn!(
                        product = %product.name,
                        remaining = recorded.remaining_stock,
                        "Low stock"
                    );
                }
                Ok(recorded)
            }
            Ok(SaleOutcome::Rejected {
                available: false, ..
            }) => Err(SaleError::Unavailable),
            Ok(SaleOutcome::Rejected { quantity: left, .. }) => {
                Err(SaleError::InsufficientStock {
                    requested: quantity,
                    available: left,
                })
            }
            Err(RepositoryError::NotFound) => Err(SaleError::NotOnLedger),
            Err(e) => Err(e.into()),
        }
    }

    /// Put `quantity` units of a product in an employee's cart.
    ///
    /// The check covers what is already in the cart, so the cart as a whole
    /// never asks for more than the ledger holds.
    ///
    /// # Errors
    ///
    /// Returns `SaleError::InvalidQuantity`, `SaleError::ProductNotFound`,
    /// `SaleError::NoActiveReference`, `SaleError::NotOnLedger`,
    /// `SaleError::Unavailable` or `SaleError::InsufficientStock`.
    #[tracing::instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        employee_id: EmployeeId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, SaleError> {
        check_quantity(quantity)?;

        ProductRepository::new(self.pool)
            .get_by_id(product_id)
            .await?
            .ok_or(SaleError::ProductNotFound)?;

        let reference = StockReferenceRepository::new(self.pool)
            .get_active()
            .await?
            .ok_or(SaleError::NoActiveReference)?;

        let stock = StockRepository::new(self.pool)
            .get(reference.id, product_id)
            .await?
            .ok_or(SaleError::NotOnLedger)?;

        let carts = CartRepository::new(self.pool);
        let in_cart = carts.quantity_in_cart(employee_id, product_id).await?;
        check_stock(&stock, in_cart.saturating_add(quantity))?;

        Ok(carts.add_item(employee_id, product_id, quantity).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use stockroom_core::{StockId, StockReferenceId};

    use super::*;

    fn stock(quantity: i32, available: bool) -> Stock {
        Stock {
            id: StockId::generate(),
            product_id: ProductId::generate(),
            stock_reference_id: StockReferenceId::generate(),
            quantity,
            available,
            responsible_employee_id: None,
            date_added: Utc::now(),
        }
    }

    #[test]
    fn test_sell_exact_stock() {
        assert!(check_stock(&stock(5, true), 5).is_ok());
    }

    #[test]
    fn test_oversell_rejected() {
        let err = check_stock(&stock(5, true), 6).unwrap_err();
        assert!(matches!(
            err,
            SaleError::InsufficientStock {
                requested: 6,
                available: 5
            }
        ));
    }

    #[test]
    fn test_unavailable_checked_before_quantity() {
        let err = check_stock(&stock(0, false), 3).unwrap_err();
        assert!(matches!(err, SaleError::Unavailable));
    }

    #[test]
    fn test_quantity_must_be_positive() {
        assert!(matches!(check_quantity(0), Err(SaleError::InvalidQuantity)));
        assert!(matches!(check_quantity(-2), Err(SaleError::InvalidQuantity)));
        assert!(check_quantity(1).is_ok());
    }

    #[test]
    fn test_insufficient_stock_message() {
        let err = SaleError::InsufficientStock {
            requested: 12,
            available: 4,
        };
        assert_eq!(err.to_string(), "insufficient stock: requested 12, available 4");
    }
}
