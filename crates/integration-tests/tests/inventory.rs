//! Stock references, products and the stock ledger.
//!
//! These tests require a running server and database; see the crate docs.
//! They never change which stock reference is active.

use reqwest::StatusCode;
use serde_json::{Value, json};
use stockroom_integration_tests::{Session, expect_status, unique};

async fn ledger_line(session: &Session, product_id: &str) -> Option<Value> {
    let lines: Vec<Value> = session
        .get("/stock")
        .send()
        .await
        .expect("Failed to list stock")
        .json()
        .await
        .expect("Failed to parse stock");
    lines
        .into_iter()
        .find(|line| line["product_id"].as_str() == Some(product_id))
}

async fn product(session: &Session, product_id: &str) -> Value {
    let resp = session
        .get(&format!("/products/{product_id}"))
        .send()
        .await
        .expect("Failed to get product");
    expect_status(resp, StatusCode::OK)
        .await
        .expect("Product should exist")
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_stock_reference_crud() {
    let admin = Session::admin().await.expect("Failed to log in as admin");
    let name = unique("sector");

    let resp = admin
        .post("/stock-references")
        .json(&json!({ "name": name, "description": "Back room" }))
        .send()
        .await
        .expect("Failed to create reference");
    let created = expect_status(resp, StatusCode::CREATED)
        .await
        .expect("Reference should be created");
    let id = created["id"].as_str().expect("id").to_string();
    assert_eq!(created["is_active"], false);

    let resp = admin
        .post("/stock-references")
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("Failed to create reference");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = admin
        .put(&format!("/stock-references/{id}"))
        .json(&json!({ "description": "Front room" }))
        .send()
        .await
        .expect("Failed to update reference");
    let updated = expect_status(resp, StatusCode::OK)
        .await
        .expect("Reference should update");
    assert_eq!(updated["description"], "Front room");

    let resp = admin
        .delete(&format!("/stock-references/{id}"))
        .send()
        .await
        .expect("Failed to delete reference");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = admin
        .get(&format!("/stock-references/{id}"))
        .send()
        .await
        .expect("Failed to get reference");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_product_requires_acquisition_value() {
    let admin = Session::admin().await.expect("Failed to log in as admin");

    let resp = admin
        .post("/products")
        .json(&json!({ "name": unique("product"), "price": "2.50" }))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = admin
        .post("/products")
        .json(&json!({ "name": unique("product"), "price": "-1.00", "acquisition_value": "1.00" }))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_product_quantity_update_is_a_delta() {
    let admin = Session::admin().await.expect("Failed to log in as admin");

    let resp = admin
        .post("/products")
        .json(&json!({
            "name": unique("product"),
            "price": "3.00",
            "quantity": 10,
            "acquisition_value": "1.50",
        }))
        .send()
        .await
        .expect("Failed to create product");
    let created = expect_status(resp, StatusCode::CREATED)
        .await
        .expect("Product should be created");
    let id = created["id"].as_str().expect("id").to_string();

    let resp = admin
        .put(&format!("/products/{id}"))
        .json(&json!({ "quantity": 5, "price": "3.50" }))
        .send()
        .await
        .expect("Failed to update product");
    let updated = expect_status(resp, StatusCode::OK)
        .await
        .expect("Product should update");
    assert_eq!(updated["quantity"], 15);
    assert_eq!(updated["price"], "3.50");
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_stock_moves_between_reserve_and_ledger() {
    let admin = Session::admin().await.expect("Failed to log in as admin");
    let product_id = admin
        .stocked_product("4.00", 30, 12)
        .await
        .expect("Failed to stock product");

    assert_eq!(product(&admin, &product_id).await["quantity"], 18);
    let line = ledger_line(&admin, &product_id)
        .await
        .expect("Product should be on the ledger");
    assert_eq!(line["quantity"], 12);
    assert_eq!(line["is_available"], true);

    // Placing twice is refused
    let resp = admin
        .post("/stock")
        .json(&json!({ "product_id": product_id, "quantity": 1 }))
        .send()
        .await
        .expect("Failed to place stock");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Top-up larger than the reserve is refused
    let resp = admin
        .put(&format!("/stock/{product_id}"))
        .json(&json!({ "quantity": 19 }))
        .send()
        .await
        .expect("Failed to top up");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = admin
        .put(&format!("/stock/{product_id}"))
        .json(&json!({ "quantity": 8 }))
        .send()
        .await
        .expect("Failed to top up");
    let topped = expect_status(resp, StatusCode::OK)
        .await
        .expect("Top-up should succeed");
    assert_eq!(topped["quantity"], 20);
    assert_eq!(product(&admin, &product_id).await["quantity"], 10);

    let resp = admin
        .delete(&format!("/stock/{product_id}"))
        .send()
        .await
        .expect("Failed to remove stock");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(ledger_line(&admin, &product_id).await.is_none());
    assert_eq!(product(&admin, &product_id).await["quantity"], 30);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_placing_unknown_product_is_not_found() {
    let admin = Session::admin().await.expect("Failed to log in as admin");

    let resp = admin
        .post("/stock")
        .json(&json!({ "product_id": "00000000-0000-4000-8000-000000000000", "quantity": 1 }))
        .send()
        .await
        .expect("Failed to place stock");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
