//! Integration tests for the API server.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use pos_api::{create_app, AppState, SESSION_HEADER};
use pos_core::{Money, TaxRate, TokenCodec};
use pos_db::{Database, DbConfig, NewProduct};

const SECRET: &str = "integration-test-secret-0123456789abcdef";

struct TestApp {
    app: Router,
    db: Database,
    store_id: i64,
}

impl TestApp {
    async fn new() -> Self {
        let db = Database::in_memory().await.unwrap();
        Self::with_db(db).await
    }

    async fn with_db(db: Database) -> Self {
        let store_id = db.stores().insert("Ground Floor").await.unwrap();
        let app = create_app(AppState::new(db.clone(), TokenCodec::from_secret(SECRET)));
        TestApp { app, db, store_id }
    }

    async fn product(&self, name: &str, cents: i64, stock: i64, barcode: Option<&str>) -> i64 {
        self.db
            .products()
            .insert(&NewProduct {
                store_id: self.store_id,
                name: name.to_string(),
                price: Money::from_cents(cents),
                stock,
                barcode: barcode.map(str::to_string),
            })
            .await
            .unwrap()
    }

    async fn stock(&self, id: i64) -> i64 {
        self.db.products().get_stock(id).await.unwrap().unwrap()
    }

    async fn send(&self, method: &str, uri: &str, session: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        send(&self.app, method, uri, session, body).await
    }

    async fn add(&self, session: &str, product_id: i64, quantity: i64) -> (StatusCode, Value) {
        self.send(
            "POST",
            "/api/add_to_cart",
            Some(session),
            Some(json!({ "product_id": product_id, "quantity": quantity, "store_id": self.store_id })),
        )
        .await
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    session: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(session) = session {
        builder = builder.header(SESSION_HEADER, session);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn session() -> String {
    Uuid::new_v4().to_string()
}

fn tender(paid: &str, change: &str) -> Value {
    json!({
        "action": "checkout",
        "customer_name": "",
        "payment_method": "Cash",
        "date": "2024-05-01",
        "amount_paid": paid,
        "change_given": change,
    })
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let t = TestApp::new().await;
    let (status, json) = t.send("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], true);
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_cart_routes_require_session_header() {
    let t = TestApp::new().await;

    let (status, json) = t.send("GET", "/api/get_cart", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let (status, _) = t.send("GET", "/api/get_cart", Some("not-a-uuid"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_scenario_d_duplicate_adds_merge() {
    let t = TestApp::new().await;
    let milk = t.product("Milk 1L", 1000, 50, None).await;
    let s = session();

    let (status, json) = t.add(&s, milk, 2).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Milk 1L added to cart");

    let (status, json) = t.add(&s, milk, 3).await;
    assert_eq!(status, StatusCode::OK);

    let cart = json["cart"].as_array().unwrap();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0]["quantity"], 5);
    assert_eq!(cart[0]["unit_price"], "10.00");
    assert_eq!(cart[0]["subtotal"], "50.00");
    assert_eq!(json["cart_total"], "50.00");

    let (_, json) = t.send("GET", "/api/get_cart", Some(&s), None).await;
    assert_eq!(json["cart"].as_array().unwrap().len(), 1);
    assert_eq!(json["cart_total"], "50.00");
}

#[tokio::test]
async fn test_add_by_barcode_and_remove() {
    let t = TestApp::new().await;
    let milk = t.product("Milk 1L", 1000, 50, None).await;
    t.product("Bread Loaf", 550, 20, Some("6001000000028")).await;
    let s = session();

    t.add(&s, milk, 1).await;
    let (status, json) = t
        .send(
            "POST",
            "/api/add_to_cart",
            Some(&s),
            Some(json!({ "barcode": "6001000000028", "store_id": t.store_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cart"][1]["name"], "Bread Loaf");
    assert_eq!(json["cart_total"], "15.50");

    let (status, json) = t
        .send("POST", "/api/remove_from_cart", Some(&s), Some(json!({ "index": 0 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    let cart = json["cart"].as_array().unwrap();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0]["name"], "Bread Loaf");
    assert_eq!(json["cart_total"], "5.50");

    let (status, json) = t
        .send("POST", "/api/remove_from_cart", Some(&s), Some(json!({ "index": 5 })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_add_rejections() {
    let t = TestApp::new().await;
    let sold_out = t.product("Sugar 1kg", 1200, 0, None).await;
    let scarce = t.product("Rice 5kg", 8999, 3, None).await;
    let s = session();

    // Unknown product
    let (status, _) = t.add(&s, 9_999, 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Out of stock products cannot be added
    let (status, json) = t.add(&s, sold_out, 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["message"].as_str().unwrap().contains("out of stock"));

    // Advisory check runs against the merged line quantity
    let (status, _) = t.add(&s, scarce, 2).await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = t.add(&s, scarce, 2).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "INSUFFICIENT_STOCK");

    // Product belongs to another store
    let (status, _) = t
        .send(
            "POST",
            "/api/add_to_cart",
            Some(&s),
            Some(json!({ "product_id": scarce, "quantity": 1, "store_id": t.store_id + 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Zero quantity and malformed bodies are validation errors
    let (status, _) = t.add(&s, scarce, 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, json) = t
        .send("POST", "/api/add_to_cart", Some(&s), Some(json!({ "quantity": "lots" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);

    // Only the successful add reached the cart
    let (_, json) = t.send("GET", "/api/get_cart", Some(&s), None).await;
    assert_eq!(json["cart"][0]["quantity"], 2);
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_scenario_a_checkout_commits_and_decrements() {
    let t = TestApp::new().await;
    let milk = t.product("Milk 1L", 1000, 10, None).await;
    let s = session();
    t.add(&s, milk, 2).await;

    let (status, json) = t
        .send("POST", "/api/checkout", Some(&s), Some(tender("20.00", "0.00")))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Checkout completed successfully!");

    let transactions = json["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["amount"], "20.00");
    assert_eq!(transactions[0]["quantity"], 2);
    assert_eq!(transactions[0]["customer_name"], "Guest");
    assert_eq!(transactions[0]["status"], "Completed");
    assert_eq!(transactions[0]["date"], "2024-05-01");

    assert_eq!(json["updated_products"][0]["id"], milk);
    assert_eq!(json["updated_products"][0]["stock"], 8);
    assert_eq!(t.stock(milk).await, 8);

    assert_eq!(json["receipt"]["batches"][0]["total"], "20.00");

    // Cart is emptied only by a successful checkout
    let (_, json) = t.send("GET", "/api/get_cart", Some(&s), None).await;
    assert!(json["cart"].as_array().unwrap().is_empty());
    assert_eq!(json["cart_total"], "0.00");
}

#[tokio::test]
async fn test_scenario_b_underpayment_writes_nothing() {
    let t = TestApp::new().await;
    let bread = t.product("Bread Loaf", 500, 10, None).await;
    let s = session();
    t.add(&s, bread, 3).await;

    let (status, json) = t
        .send("POST", "/api/checkout", Some(&s), Some(tender("10.00", "0.00")))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "PAYMENT_MISMATCH");
    assert_eq!(t.db.sales().count().await.unwrap(), 0);
    assert_eq!(t.stock(bread).await, 10);

    // Wrong change is rejected too; within a cent is accepted
    let (status, _) = t
        .send("POST", "/api/checkout", Some(&s), Some(tender("20.00", "4.00")))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = t
        .send("POST", "/api/checkout", Some(&s), Some(tender("20.00", "4.99")))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(t.stock(bread).await, 7);
}

#[tokio::test]
async fn test_checkout_validation() {
    let t = TestApp::new().await;
    let milk = t.product("Milk 1L", 1000, 10, None).await;
    let s = session();

    let (status, json) = t
        .send("POST", "/api/checkout", Some(&s), Some(tender("0", "0")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Cart is empty");

    t.add(&s, milk, 1).await;
    let mut bad_date = tender("10.00", "0.00");
    bad_date["date"] = json!("05/01/2024");
    let (status, _) = t.send("POST", "/api/checkout", Some(&s), Some(bad_date)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut no_method = tender("10.00", "0.00");
    no_method["payment_method"] = json!("  ");
    let (status, _) = t.send("POST", "/api/checkout", Some(&s), Some(no_method)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut no_action = tender("10.00", "0.00");
    no_action.as_object_mut().unwrap().remove("action");
    let (status, json) = t.send("POST", "/api/checkout", Some(&s), Some(no_action)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let (status, _) = t
        .send("POST", "/api/checkout", Some(&s), Some(json!({ "action": "remove", "index": 0 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(t.send("GET", "/api/get_cart", Some(&s), None).await.1["cart"].as_array().unwrap().len(), 1);

    assert_eq!(t.db.sales().count().await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_scenario_c_concurrent_checkouts_of_last_unit() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(
        DbConfig::new(dir.path().join("pos.db"))
            .max_connections(4)
            .busy_timeout(Duration::from_secs(10)),
    )
    .await
    .unwrap();
    let t = TestApp::with_db(db).await;
    let milk = t.product("Milk 1L", 1000, 1, None).await;

    // Both sessions see the unit on the shelf when they add it
    let (a, b) = (session(), session());
    assert_eq!(t.add(&a, milk, 1).await.0, StatusCode::OK);
    assert_eq!(t.add(&b, milk, 1).await.0, StatusCode::OK);

    let (first, second) = tokio::join!(
        send(&t.app, "POST", "/api/checkout", Some(&a), Some(tender("10.00", "0.00"))),
        send(&t.app, "POST", "/api/checkout", Some(&b), Some(tender("10.00", "0.00"))),
    );

    let mut statuses = [first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);

    let loser = if first.0 == StatusCode::CONFLICT { &first.1 } else { &second.1 };
    assert_eq!(loser["code"], "INSUFFICIENT_STOCK");

    assert_eq!(t.stock(milk).await, 0);
    assert_eq!(t.db.sales().count().await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_session_double_checkout_commits_once() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(
        DbConfig::new(dir.path().join("pos.db"))
            .max_connections(4)
            .busy_timeout(Duration::from_secs(10)),
    )
    .await
    .unwrap();
    let t = TestApp::with_db(db).await;
    let rice = t.product("Rice 5kg", 1000, 10, None).await;

    let s = session();
    assert_eq!(t.add(&s, rice, 2).await.0, StatusCode::OK);

    // A double-click on the till: same cart, two requests in flight
    let checkouts: Vec<_> = (0..2)
        .map(|_| {
            let app = t.app.clone();
            let s = s.clone();
            tokio::spawn(async move {
                send(&app, "POST", "/api/checkout", Some(&s), Some(tender("20.00", "0.00"))).await
            })
        })
        .collect();

    let mut results = Vec::new();
    for checkout in checkouts {
        results.push(checkout.await.unwrap());
    }

    let mut statuses: Vec<_> = results.iter().map(|(status, _)| *status).collect();
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::BAD_REQUEST]);

    let loser = results
        .iter()
        .find(|(status, _)| *status == StatusCode::BAD_REQUEST)
        .map(|(_, json)| json)
        .unwrap();
    assert_eq!(loser["code"], "VALIDATION_ERROR");

    assert_eq!(t.db.sales().count().await.unwrap(), 1);
    assert_eq!(t.stock(rice).await, 8);

    let (_, json) = t.send("GET", "/api/get_cart", Some(&s), None).await;
    assert!(json["cart"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_checkout_restores_cart() {
    let t = TestApp::new().await;
    let bread = t.product("Bread", 500, 20, None).await;
    let eggs = t.product("Eggs", 300, 30, None).await;
    let s = session();

    assert_eq!(t.add(&s, bread, 1).await.0, StatusCode::OK);
    let (status, _) = t.send("POST", "/api/checkout", Some(&s), Some(tender("1.00", "0.00"))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(t.add(&s, eggs, 2).await.0, StatusCode::OK);
    let (_, json) = t.send("GET", "/api/get_cart", Some(&s), None).await;
    assert_eq!(json["cart"].as_array().unwrap().len(), 2);
    assert_eq!(json["cart"][0]["product_id"], bread);
    assert_eq!(json["cart_total"], "11.00");
}

#[tokio::test]
async fn test_pos_command_dispatch() {
    let t = TestApp::new().await;
    let milk = t.product("Milk 1L", 1000, 10, None).await;
    let s = session();

    let (status, json) = t
        .send(
            "POST",
            "/api/pos",
            Some(&s),
            Some(json!({ "action": "add", "product_id": milk, "quantity": 2, "store_id": t.store_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cart_total"], "20.00");

    let (status, json) = t.send("POST", "/api/pos", Some(&s), Some(tender("25", "5"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["transactions"][0]["change_given"], "5.00");

    let (status, json) = t
        .send("POST", "/api/pos", Some(&s), Some(json!({ "action": "edit", "index": 0 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// =============================================================================
// Sales listing, deletion, receipts
// =============================================================================

async fn sell(t: &TestApp, product: i64, quantity: i64, date: &str) -> Value {
    let s = session();
    t.add(&s, product, quantity).await;
    let mut body = tender("1000.00", "0.00");
    let total = quantity * 10;
    body["change_given"] = json!(format!("{}.00", 1000 - total));
    body["date"] = json!(date);
    let (status, json) = t.send("POST", "/api/checkout", Some(&s), Some(body)).await;
    assert_eq!(status, StatusCode::OK, "{}", json);
    json
}

#[tokio::test]
async fn test_fetch_sales_pagination_and_filters() {
    let t = TestApp::new().await;
    let milk = t.product("Milk 1L", 1000, 500, None).await;

    for day in 1..=5 {
        sell(&t, milk, 1, &format!("2024-05-0{}", day)).await;
    }

    let (status, json) = t
        .send("GET", "/api/fetch_sales?page=1&rows_per_page=2", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["current_page"], 1);
    assert_eq!(json["total_pages"], 3);
    let sales = json["sales"].as_array().unwrap();
    assert_eq!(sales.len(), 2);
    assert_eq!(sales[0]["date"], "2024-05-05");
    assert_eq!(sales[1]["date"], "2024-05-04");
    assert!(sales[0]["delete_token"].as_str().unwrap().contains('.'));
    assert_eq!(sales[0]["store_name"], "Ground Floor");

    let (_, json) = t
        .send("GET", "/api/fetch_sales?page=3&rows_per_page=2", None, None)
        .await;
    assert_eq!(json["sales"].as_array().unwrap().len(), 1);
    assert_eq!(json["sales"][0]["date"], "2024-05-01");

    let (_, json) = t
        .send("GET", "/api/fetch_sales?filter_date=2024-05-03", None, None)
        .await;
    assert_eq!(json["sales"].as_array().unwrap().len(), 1);

    let (_, json) = t
        .send(
            "GET",
            &format!("/api/fetch_sales?status=Completed&store_id={}&date_from=2024-05-02&date_to=2024-05-04", t.store_id),
            None,
            None,
        )
        .await;
    assert_eq!(json["total_rows"], 3);

    let (_, json) = t.send("GET", "/api/fetch_sales?status=Pending", None, None).await;
    assert!(json["sales"].as_array().unwrap().is_empty());
    assert_eq!(json["total_pages"], 0);

    let (status, _) = t.send("GET", "/api/fetch_sales?page=0", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = t
        .send("GET", "/api/fetch_sales?rows_per_page=0", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = t.send("GET", "/api/fetch_sales?status=Refunded", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_sale_by_token() {
    let t = TestApp::new().await;
    let milk = t.product("Milk 1L", 1000, 50, None).await;
    sell(&t, milk, 1, "2024-05-01").await;
    sell(&t, milk, 2, "2024-05-02").await;

    let (_, json) = t.send("GET", "/api/fetch_sales", None, None).await;
    let token = json["sales"][0]["delete_token"].as_str().unwrap().to_string();

    // Flip one character of the ciphertext
    let mut tampered: Vec<char> = token.chars().collect();
    tampered[0] = if tampered[0] == 'A' { 'B' } else { 'A' };
    let tampered: String = tampered.into_iter().collect();

    let (status, json) = t
        .send("GET", &format!("/api/sales/delete/{}", tampered), None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_TOKEN");
    assert_eq!(t.db.sales().count().await.unwrap(), 2);

    let (status, json) = t
        .send("GET", &format!("/api/sales/delete/{}", token), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(t.db.sales().count().await.unwrap(), 1);

    // Deleting does not put stock back
    assert_eq!(t.stock(milk).await, 47);

    let (status, _) = t
        .send("GET", &format!("/api/sales/delete/{}", token), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A token from another key never decodes
    let foreign = TokenCodec::from_secret("some-other-secret-0123456789abcdef").encode(1).unwrap();
    let (status, _) = t
        .send("GET", &format!("/api/sales/delete/{}", foreign), None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_receipt_reprint() {
    let t = TestApp::new().await;
    t.db.settings().set("store_name", "Mall Supermarket").await.unwrap();
    t.db.settings().set("currency_symbol", "₵").await.unwrap();
    t.db.settings().add_tax_rate("VAT", TaxRate::from_bps(1250)).await.unwrap();
    t.db.settings().add_tax_rate("NHIL", TaxRate::from_bps(250)).await.unwrap();

    let milk = t.product("Milk 1L", 1000, 50, None).await;
    let bread = t.product("Bread Loaf", 550, 50, None).await;

    let s = session();
    t.add(&s, milk, 2).await;
    t.add(&s, bread, 1).await;
    let (status, json) = t
        .send("POST", "/api/checkout", Some(&s), Some(tender("30.00", "4.50")))
        .await;
    assert_eq!(status, StatusCode::OK);
    let batch_id = json["transactions"][0]["batch_id"].as_str().unwrap().to_string();
    assert_eq!(json["transactions"][1]["batch_id"], batch_id.as_str());

    let (status, json) = t
        .send("GET", &format!("/api/receipts/{}", batch_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let receipt = &json["receipt"];
    assert_eq!(receipt["store_name"], "Mall Supermarket");
    let batch = &receipt["batches"][0];
    assert_eq!(batch["lines"].as_array().unwrap().len(), 2);
    assert_eq!(batch["total"], "25.50");
    assert_eq!(batch["total_display"], "₵25.50");
    assert_eq!(batch["taxes"][0]["name"], "VAT");
    assert_eq!(batch["taxes"][0]["amount"], "3.19");
    assert_eq!(batch["taxes"][1]["amount"], "0.64");
    assert_eq!(batch["subtotal"], "21.67");

    let (status, _) = t
        .send("GET", &format!("/api/receipts/{}", Uuid::new_v4()), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = t.send("GET", "/api/receipts/batch-1", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
