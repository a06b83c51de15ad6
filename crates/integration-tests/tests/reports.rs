//! Report aggregates and PDF documents.
//!
//! These tests require a running server and database; see the crate docs.

use reqwest::StatusCode;
use serde_json::{Value, json};
use stockroom_integration_tests::{Session, expect_status};

async fn record_sale(session: &Session, product_id: &str, quantity: i32) -> String {
    let resp = session
        .post("/sales")
        .json(&json!({ "product": product_id, "sale_quantity": quantity }))
        .send()
        .await
        .expect("Failed to record sale");
    let body = expect_status(resp, StatusCode::CREATED)
        .await
        .expect("Sale should be recorded");
    body["sale_id"].as_str().expect("sale_id").to_string()
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_summary_has_profit_fields() {
    let admin = Session::admin().await.expect("Failed to log in as admin");

    let resp = admin
        .get("/reports/summary")
        .send()
        .await
        .expect("Failed to get summary");
    let summary = expect_status(resp, StatusCode::OK)
        .await
        .expect("Summary should load");

    for field in ["total_sales_value", "total_acquisition_value", "profit", "margin"] {
        assert!(summary[field].is_string(), "missing {field}");
    }
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_total_sales_grows_with_a_sale() {
    let admin = Session::admin().await.expect("Failed to log in as admin");
    let total = |body: &Value| {
        body["total_sales_value"]
            .as_str()
            .and_then(|s| s.parse::<f64>().ok())
            .expect("total_sales_value")
    };

    let before = expect_status(
        admin.get("/reports/total-sales").send().await.expect("Failed to get total"),
        StatusCode::OK,
    )
    .await
    .expect("Total should load");

    let product_id = admin
        .stocked_product("4.00", 20, 20)
        .await
        .expect("Failed to stock product");
    record_sale(&admin, &product_id, 2).await;

    let after = expect_status(
        admin.get("/reports/total-sales").send().await.expect("Failed to get total"),
        StatusCode::OK,
    )
    .await
    .expect("Total should load");

    assert!(total(&after) - total(&before) >= 8.0 - f64::EPSILON);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_product_value_is_reported() {
    let admin = Session::admin().await.expect("Failed to log in as admin");

    let resp = admin
        .get("/reports/product-value")
        .send()
        .await
        .expect("Failed to get product value");
    let body = expect_status(resp, StatusCode::OK)
        .await
        .expect("Product value should load");
    assert!(body["total_stock_value"].is_string());
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_sale_receipt_is_a_pdf() {
    let admin = Session::admin().await.expect("Failed to log in as admin");
    let product_id = admin
        .stocked_product("2.00", 20, 20)
        .await
        .expect("Failed to stock product");
    let sale_id = record_sale(&admin, &product_id, 1).await;

    let resp = admin
        .get(&format!("/reports/receipt?sale_id={sale_id}"))
        .send()
        .await
        .expect("Failed to get receipt");
    assert_eq!(resp.status(), StatusCode::OK);

    let headers = resp.headers().clone();
    assert_eq!(headers["content-type"], "application/pdf");
    assert_eq!(
        headers["content-disposition"],
        format!("inline; filename=\"Report-{sale_id}.pdf\"").as_str()
    );
    assert_eq!(headers["x-status"], "true");

    let body = resp.bytes().await.expect("Failed to read receipt");
    assert!(body.starts_with(b"%PDF-"));
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_employee_invoice_for_today() {
    let admin = Session::admin().await.expect("Failed to log in as admin");
    let clerk = admin.new_employee().await.expect("Failed to create employee");
    let product_id = admin
        .stocked_product("3.00", 20, 20)
        .await
        .expect("Failed to stock product");
    record_sale(&clerk, &product_id, 2).await;

    let sales: Vec<Value> = admin
        .get("/sales")
        .send()
        .await
        .expect("Failed to list sales")
        .json()
        .await
        .expect("Failed to parse sales");
    let date = sales
        .iter()
        .find(|s| s["employee_id"].as_str() == Some(clerk.employee_id.as_str()))
        .and_then(|s| s["sale_date"].as_str())
        .expect("Sale should be listed")
        .to_string();

    let resp = admin
        .get(&format!("/reports/employee?id={}&date={date}", clerk.employee_id))
        .send()
        .await
        .expect("Failed to get invoice");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.bytes().await.expect("Failed to read invoice");
    assert!(body.starts_with(b"%PDF-"));

    // Nothing sold on that day
    let resp = admin
        .get(&format!("/reports/employee?id={}&date=2001-01-01", clerk.employee_id))
        .send()
        .await
        .expect("Failed to get invoice");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_unknown_sale_receipt_is_not_found() {
    let admin = Session::admin().await.expect("Failed to log in as admin");

    let resp = admin
        .get("/reports/receipt?sale_id=00000000-0000-4000-8000-000000000000")
        .send()
        .await
        .expect("Failed to get receipt");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
