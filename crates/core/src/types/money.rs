//! Decimal money arithmetic shared by the sale and report code.
//!
//! All amounts are `rust_decimal::Decimal` in the shop's currency unit
//! (e.g. euros, not cents) and are rounded to two places only at the edges.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stock strictly below this count raises a low-stock notification.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// Flat tax printed on receipts and employee reports.
pub const TAX_RATE_PERCENT: u32 = 15;

/// Price of `quantity` units.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Tax owed on an untaxed amount at [`TAX_RATE_PERCENT`], rounded to cents.
#[must_use]
pub fn tax_on(untaxed: Decimal) -> Decimal {
    (untaxed * Decimal::from(TAX_RATE_PERCENT) / Decimal::ONE_HUNDRED).round_dp(2)
}

/// Sales against acquisition cost for one stock period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitSummary {
    pub total_sales_value: Decimal,
    pub total_acquisition_value: Decimal,
    pub profit: Decimal,
    /// Profit as a percentage of sales, two decimal places.
    pub margin: Decimal,
}

impl ProfitSummary {
    /// Build a summary from the two totals.
    ///
    /// With no sales both profit and margin are zero, even if goods were
    /// acquired.
    #[must_use]
    pub fn from_totals(total_sales_value: Decimal, total_acquisition_value: Decimal) -> Self {
        if total_sales_value <= Decimal::ZERO {
            return Self {
                total_sales_value,
                total_acquisition_value,
                profit: Decimal::ZERO,
                margin: Decimal::ZERO,
            };
        }

        let profit = total_sales_value - total_acquisition_value;
        let margin = (profit / total_sales_value * Decimal::ONE_HUNDRED).round_dp(2);
        Self {
            total_sales_value,
            total_acquisition_value,
            profit,
            margin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(units: i64, scale: u32) -> Decimal {
        Decimal::new(units, scale)
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(d(250, 2), 4), d(1000, 2));
        assert_eq!(line_total(d(1999, 2), 0), Decimal::ZERO);
    }

    #[test]
    fn test_tax_rounds_to_cents() {
        assert_eq!(tax_on(d(100, 0)), d(15, 0));
        assert_eq!(tax_on(d(33, 2)), d(5, 2));
    }

    #[test]
    fn test_profit_summary_with_sales() {
        let summary = ProfitSummary::from_totals(d(200, 0), d(150, 0));
        assert_eq!(summary.profit, d(50, 0));
        assert_eq!(summary.margin, d(25, 0));
    }

    #[test]
    fn test_profit_summary_loss_has_negative_margin() {
        let summary = ProfitSummary::from_totals(d(80, 0), d(100, 0));
        assert_eq!(summary.profit, d(-20, 0));
        assert_eq!(summary.margin, d(-25, 0));
    }

    #[test]
    fn test_profit_summary_without_sales_is_zero() {
        let summary = ProfitSummary::from_totals(Decimal::ZERO, d(40, 0));
        assert_eq!(summary.profit, Decimal::ZERO);
        assert_eq!(summary.margin, Decimal::ZERO);
        assert_eq!(summary.total_acquisition_value, d(40, 0));
    }
}
