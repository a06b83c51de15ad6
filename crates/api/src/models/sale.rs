//! Sales, their snapshots and the aggregates built from them.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use stockroom_core::{
    ActionHistoryId, EmployeeId, ProductId, SaleId, StockReferenceId, line_total,
};

#[derive(Debug, Clone, Serialize)]
pub struct Sale {
    pub id: SaleId,
    pub product_id: ProductId,
    pub employee_id: EmployeeId,
    pub stock_reference_id: StockReferenceId,
    pub sale_quantity: i32,
    pub sale_date: NaiveDate,
    pub is_archived: bool,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Append-only copy of a sale and the product/employee details at sale time.
#[derive(Debug, Clone, Serialize)]
pub struct SaleSnapshot {
    pub id: i64,
    pub sale_id: SaleId,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_price: Decimal,
    pub product_acquisition_value: Decimal,
    pub sale_quantity: i32,
    pub sale_total_value: Decimal,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub employee_email: String,
    pub employee_address: String,
    pub stock_reference_id: StockReferenceId,
    pub sale_date: NaiveDate,
}

/// Audit entry for an employee action.
#[derive(Debug, Clone, Serialize)]
pub struct ActionHistory {
    pub id: ActionHistoryId,
    pub employee_id: EmployeeId,
    pub action: String,
    pub sale_id: Option<SaleId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub total_sales: Decimal,
    pub total_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeSalesTotal {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub total_sales: Decimal,
}

/// One unarchived sale of an employee, priced from its snapshot.
#[derive(Debug, Clone)]
pub struct EmployeeSaleLine {
    pub sale_id: SaleId,
    pub product_name: String,
    pub sale_date: NaiveDate,
    pub sale_quantity: i32,
    pub unit_price: Decimal,
}

/// Sales of one product on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeSalesGroup {
    pub product_name: String,
    pub date: NaiveDate,
    pub total_quantity: i64,
    pub ids: Vec<SaleId>,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeSalesReport {
    pub employee_id: EmployeeId,
    pub sales: Vec<EmployeeSalesGroup>,
    pub total_sales: Decimal,
}

impl EmployeeSalesReport {
    /// Group sale lines by (product name, date), ordered by date then name.
    #[must_use]
    pub fn from_lines(employee_id: EmployeeId, lines: Vec<EmployeeSaleLine>) -> Self {
        let mut groups: BTreeMap<(NaiveDate, String), EmployeeSalesGroup> = BTreeMap::new();
        let mut total_sales = Decimal::ZERO;

        for line in lines {
            let value = line_total(line.unit_price, line.sale_quantity);
            total_sales += value;

            let group = groups
                .entry((line.sale_date, line.product_name.clone()))
                .or_insert_with(|| EmployeeSalesGroup {
                    product_name: line.product_name,
                    date: line.sale_date,
                    total_quantity: 0,
                    ids: Vec::new(),
                    total_value: Decimal::ZERO,
                });
            group.total_quantity += i64::from(line.sale_quantity);
            group.ids.push(line.sale_id);
            group.total_value += value;
        }

        Self {
            employee_id,
            sales: groups.into_values().collect(),
            total_sales,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap_or_default()
    }

    fn line(product: &str, date: NaiveDate, quantity: i32, cents: i64) -> EmployeeSaleLine {
        EmployeeSaleLine {
            sale_id: SaleId::generate(),
            product_name: product.to_string(),
            sale_date: date,
            sale_quantity: quantity,
            unit_price: Decimal::new(cents, 2),
        }
    }

    #[test]
    fn test_groups_same_product_and_day() {
        let a = line("Cafe", day(2), 2, 150);
        let b = line("Cafe", day(2), 3, 150);
        let ids = vec![a.sale_id, b.sale_id];

        let report = EmployeeSalesReport::from_lines(EmployeeId::generate(), vec![a, b]);

        assert_eq!(report.sales.len(), 1);
        let group = &report.sales[0];
        assert_eq!(group.total_quantity, 5);
        assert_eq!(group.ids, ids);
        assert_eq!(group.total_value, Decimal::new(750, 2));
        assert_eq!(report.total_sales, Decimal::new(750, 2));
    }

    #[test]
    fn test_orders_by_date_then_name() {
        let report = EmployeeSalesReport::from_lines(
            EmployeeId::generate(),
            vec![
                line("Pao", day(5), 1, 20),
                line("Agua", day(5), 1, 50),
                line("Leite", day(1), 2, 90),
            ],
        );

        let order: Vec<_> = report
            .sales
            .iter()
            .map(|g| (g.date, g.product_name.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![(day(1), "Leite"), (day(5), "Agua"), (day(5), "Pao")]
        );
        assert_eq!(report.total_sales, Decimal::new(250, 2));
    }

    #[test]
    fn test_empty_report() {
        let report = EmployeeSalesReport::from_lines(EmployeeId::generate(), Vec::new());
        assert!(report.sales.is_empty());
        assert_eq!(report.total_sales, Decimal::ZERO);
    }
}
