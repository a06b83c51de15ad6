//! Sales, oversell protection, low-stock notifications and carts.
//!
//! These tests require a running server and database; see the crate docs.

use reqwest::StatusCode;
use serde_json::{Value, json};
use stockroom_integration_tests::{Session, expect_status};

async fn sell(session: &Session, product_id: &str, quantity: i32) -> reqwest::Response {
    session
        .post("/sales")
        .json(&json!({ "product": product_id, "sale_quantity": quantity }))
        .send()
        .await
        .expect("Failed to record sale")
}

async fn ledger_quantity(session: &Session, product_id: &str) -> i64 {
    let lines: Vec<Value> = session
        .get("/stock")
        .send()
        .await
        .expect("Failed to list stock")
        .json()
        .await
        .expect("Failed to parse stock");
    lines
        .iter()
        .find(|line| line["product_id"].as_str() == Some(product_id))
        .and_then(|line| line["quantity"].as_i64())
        .expect("Product should be on the ledger")
}

async fn unread_for(session: &Session, product_id: &str) -> Vec<Value> {
    let notifications: Vec<Value> = session
        .get("/notifications")
        .send()
        .await
        .expect("Failed to list notifications")
        .json()
        .await
        .expect("Failed to parse notifications");
    notifications
        .into_iter()
        .filter(|n| n["product_id"].as_str() == Some(product_id))
        .collect()
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_sale_decrements_stock_and_writes_history() {
    let admin = Session::admin().await.expect("Failed to log in as admin");
    let clerk = admin.new_employee().await.expect("Failed to create employee");
    let product_id = admin
        .stocked_product("2.50", 20, 20)
        .await
        .expect("Failed to stock product");

    let created = expect_status(sell(&clerk, &product_id, 3).await, StatusCode::CREATED)
        .await
        .expect("Sale should be recorded");
    let sale_id = created["sale_id"].as_str().expect("sale_id").to_string();
    assert_eq!(ledger_quantity(&admin, &product_id).await, 17);

    let resp = clerk
        .get(&format!("/employees/{}/sales", clerk.employee_id))
        .send()
        .await
        .expect("Failed to get employee sales");
    let report = expect_status(resp, StatusCode::OK)
        .await
        .expect("Report should load");
    let groups = report["sales"].as_array().expect("sales");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["total_quantity"], 3);
    assert_eq!(groups[0]["ids"][0], sale_id.as_str());
    assert_eq!(report["total_sales"], "7.50");

    let resp = clerk
        .get(&format!("/employees/{}/action-history", clerk.employee_id))
        .send()
        .await
        .expect("Failed to get action history");
    let actions: Vec<Value> = resp.json().await.expect("Failed to parse actions");
    assert!(actions.iter().any(|a| a["sale_id"] == sale_id.as_str()));
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_oversell_is_rejected() {
    let admin = Session::admin().await.expect("Failed to log in as admin");
    let product_id = admin
        .stocked_product("1.00", 5, 5)
        .await
        .expect("Failed to stock product");

    let resp = sell(&admin, &product_id, 6).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(ledger_quantity(&admin, &product_id).await, 5);

    let resp = sell(&admin, &product_id, 0).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Exactly the remaining stock is fine
    let resp = sell(&admin, &product_id, 5).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(ledger_quantity(&admin, &product_id).await, 0);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_concurrent_sales_never_oversell() {
    let admin = Session::admin().await.expect("Failed to log in as admin");
    let product_id = admin
        .stocked_product("1.00", 4, 4)
        .await
        .expect("Failed to stock product");

    let (a, b, c) = tokio::join!(
        sell(&admin, &product_id, 2),
        sell(&admin, &product_id, 2),
        sell(&admin, &product_id, 2),
    );
    let created = [a.status(), b.status(), c.status()]
        .iter()
        .filter(|s| **s == StatusCode::CREATED)
        .count();

    assert_eq!(created, 2);
    assert_eq!(ledger_quantity(&admin, &product_id).await, 0);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_unavailable_stock_cannot_be_sold() {
    let admin = Session::admin().await.expect("Failed to log in as admin");
    let product_id = admin
        .stocked_product("1.00", 10, 5)
        .await
        .expect("Failed to stock product");

    let resp = admin
        .put(&format!("/stock/{product_id}"))
        .json(&json!({ "quantity": 0, "is_available": false }))
        .send()
        .await
        .expect("Failed to update stock");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = sell(&admin, &product_id, 1).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_low_stock_notifies_and_top_up_clears() {
    let admin = Session::admin().await.expect("Failed to log in as admin");
    let product_id = admin
        .stocked_product("1.00", 30, 12)
        .await
        .expect("Failed to stock product");

    // 12 -> 10 is not below the threshold
    let resp = sell(&admin, &product_id, 2).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(unread_for(&admin, &product_id).await.is_empty());

    // 10 -> 9 is
    let resp = sell(&admin, &product_id, 1).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let unread = unread_for(&admin, &product_id).await;
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0]["is_read"], false);

    let resp = admin
        .put(&format!("/stock/{product_id}"))
        .json(&json!({ "quantity": 5 }))
        .send()
        .await
        .expect("Failed to top up");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(unread_for(&admin, &product_id).await.is_empty());
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_mark_notification_read() {
    let admin = Session::admin().await.expect("Failed to log in as admin");
    let product_id = admin
        .stocked_product("1.00", 5, 5)
        .await
        .expect("Failed to stock product");

    let resp = sell(&admin, &product_id, 1).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let unread = unread_for(&admin, &product_id).await;
    let id = unread[0]["id"].as_str().expect("id").to_string();

    let resp = admin
        .patch(&format!("/notifications/{id}/read"))
        .send()
        .await
        .expect("Failed to mark read");
    let marked = expect_status(resp, StatusCode::OK)
        .await
        .expect("Notification should be marked");
    assert_eq!(marked["is_read"], true);
    assert!(unread_for(&admin, &product_id).await.is_empty());
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_cart_checks_cumulative_quantity_and_clears_on_sale() {
    let admin = Session::admin().await.expect("Failed to log in as admin");
    let clerk = admin.new_employee().await.expect("Failed to create employee");
    let product_id = admin
        .stocked_product("1.00", 5, 5)
        .await
        .expect("Failed to stock product");

    let add = |quantity: i32| {
        clerk
            .post("/cart/add")
            .json(&json!({ "product_id": product_id, "quantity": quantity }))
            .send()
    };

    let item = expect_status(add(3).await.expect("Failed to add"), StatusCode::CREATED)
        .await
        .expect("Item should be added");
    assert_eq!(item["quantity"], 3);

    // 3 in the cart + 3 more is above the 5 on the ledger
    let resp = add(3).await.expect("Failed to add");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let item = expect_status(add(2).await.expect("Failed to add"), StatusCode::CREATED)
        .await
        .expect("Item should be added");
    assert_eq!(item["quantity"], 5);

    let resp = admin
        .get(&format!("/cart/employees/{}/items", clerk.employee_id))
        .send()
        .await
        .expect("Failed to get cart items");
    let items: Vec<Value> = resp.json().await.expect("Failed to parse items");
    assert_eq!(items.len(), 1);

    let resp = sell(&clerk, &product_id, 1).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let cart = expect_status(
        clerk.get("/cart").send().await.expect("Failed to get cart"),
        StatusCode::OK,
    )
    .await
    .expect("Cart should load");
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_remove_cart_item_of_someone_else_is_not_found() {
    let admin = Session::admin().await.expect("Failed to log in as admin");
    let clerk = admin.new_employee().await.expect("Failed to create employee");
    let product_id = admin
        .stocked_product("1.00", 5, 5)
        .await
        .expect("Failed to stock product");

    let resp = clerk
        .post("/cart/add")
        .json(&json!({ "product_id": product_id, "quantity": 1 }))
        .send()
        .await
        .expect("Failed to add");
    let item = expect_status(resp, StatusCode::CREATED)
        .await
        .expect("Item should be added");
    let item_id = item["id"].as_str().expect("id").to_string();

    let resp = admin
        .delete(&format!("/cart/items/{item_id}"))
        .send()
        .await
        .expect("Failed to remove item");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = clerk
        .delete(&format!("/cart/items/{item_id}"))
        .send()
        .await
        .expect("Failed to remove item");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}
