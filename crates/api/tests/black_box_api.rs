use std::sync::Arc;

use chrono::Utc;
use reqwest::StatusCode;
use serde_json::json;

use storders_api::app::{build_app, AppState};
use storders_infra::InMemoryStore;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, wired onto the in-memory store and bound to
        // an ephemeral port.
        let app = build_app(AppState::from_store(Arc::new(InMemoryStore::new())));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn customer_payload() -> serde_json::Value {
    json!({
        "company_name": "TechFusion GmbH",
        "contact_name": "Klaus Weber",
        "contact_email": "k.weber@techfusion.de",
        "country": "Germany",
    })
}

fn product_payload() -> serde_json::Value {
    json!({
        "part_number": "STM32F407VGT6",
        "name": "STM32F407 MCU",
        "category": "Microcontrollers",
        "unit_price": "8.5200",
        "stock_quantity": 15000,
    })
}

async fn create_customer_and_product(
    client: &reqwest::Client,
    base_url: &str,
) -> (String, String) {
    let customer: serde_json::Value = client
        .post(format!("{base_url}/api/v1/customers"))
        .json(&customer_payload())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let product: serde_json::Value = client
        .post(format!("{base_url}/api/v1/products"))
        .json(&product_payload())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    (
        customer["id"].as_str().unwrap().to_string(),
        product["id"].as_str().unwrap().to_string(),
    )
}

async fn create_order(
    client: &reqwest::Client,
    base_url: &str,
    customer_id: &str,
    product_id: &str,
    quantity: u32,
) -> serde_json::Value {
    let res = client
        .post(format!("{base_url}/api/v1/orders"))
        .json(&json!({
            "customer_id": customer_id,
            "items": [{ "product_id": product_id, "quantity": quantity }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn create_order_prices_lines_and_assigns_first_monthly_number() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (customer_id, product_id) = create_customer_and_product(&client, &srv.base_url).await;

    let res = client
        .post(format!("{}/api/v1/orders", srv.base_url))
        .json(&json!({
            "customer_id": customer_id,
            "shipping_address": "Munich, Germany",
            "items": [{ "product_id": product_id, "quantity": 100 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: serde_json::Value = res.json().await.unwrap();
    let expected_number = format!("ST-ORD-{}-0001", Utc::now().format("%Y%m"));
    assert_eq!(body["order_number"].as_str().unwrap(), expected_number);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["total_amount"], "852.00");
    assert_eq!(body["currency"], "USD");
    assert!(body["shipped_at"].is_null());
    assert!(body["delivered_at"].is_null());

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 100);
    assert_eq!(items[0]["unit_price"], "8.5200");
    assert_eq!(items[0]["line_total"], "852.00");
}

#[tokio::test]
async fn order_numbers_increment_within_the_month() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (customer_id, product_id) = create_customer_and_product(&client, &srv.base_url).await;

    let first = create_order(&client, &srv.base_url, &customer_id, &product_id, 10).await;
    let second = create_order(&client, &srv.base_url, &customer_id, &product_id, 20).await;

    let month = Utc::now().format("%Y%m").to_string();
    assert_eq!(
        first["order_number"].as_str().unwrap(),
        format!("ST-ORD-{month}-0001")
    );
    assert_eq!(
        second["order_number"].as_str().unwrap(),
        format!("ST-ORD-{month}-0002")
    );
}

#[tokio::test]
async fn get_order_returns_the_hydrated_aggregate() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (customer_id, product_id) = create_customer_and_product(&client, &srv.base_url).await;
    let order = create_order(&client, &srv.base_url, &customer_id, &product_id, 50).await;
    let order_id = order["id"].as_str().unwrap();

    let res = client
        .get(format!("{}/api/v1/orders/{}", srv.base_url, order_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["id"].as_str().unwrap(), order_id);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn update_order_status_stamps_shipped_at_exactly_once() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (customer_id, product_id) = create_customer_and_product(&client, &srv.base_url).await;
    let order = create_order(&client, &srv.base_url, &customer_id, &product_id, 50).await;
    let order_id = order["id"].as_str().unwrap();

    let res = client
        .put(format!("{}/api/v1/orders/{}", srv.base_url, order_id))
        .json(&json!({ "status": "shipped" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let first: serde_json::Value = res.json().await.unwrap();
    assert_eq!(first["status"], "shipped");
    let stamp = first["shipped_at"].as_str().unwrap().to_string();

    let second: serde_json::Value = client
        .put(format!("{}/api/v1/orders/{}", srv.base_url, order_id))
        .json(&json!({ "status": "shipped" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["shipped_at"].as_str().unwrap(), stamp);
}

#[tokio::test]
async fn delivered_status_is_stamped_independently_of_shipped() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (customer_id, product_id) = create_customer_and_product(&client, &srv.base_url).await;
    let order = create_order(&client, &srv.base_url, &customer_id, &product_id, 5).await;
    let order_id = order["id"].as_str().unwrap();

    let body: serde_json::Value = client
        .put(format!("{}/api/v1/orders/{}", srv.base_url, order_id))
        .json(&json!({ "status": "delivered" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "delivered");
    assert!(body["delivered_at"].is_string());
    assert!(body["shipped_at"].is_null());
}

#[tokio::test]
async fn cancel_order_is_a_status_update() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (customer_id, product_id) = create_customer_and_product(&client, &srv.base_url).await;
    let order = create_order(&client, &srv.base_url, &customer_id, &product_id, 50).await;
    let order_id = order["id"].as_str().unwrap();

    let res = client
        .delete(format!("{}/api/v1/orders/{}", srv.base_url, order_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "cancelled");

    // The order and its number survive cancellation.
    let reread: serde_json::Value = client
        .get(format!("{}/api/v1/orders/{}", srv.base_url, order_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reread["order_number"], order["order_number"]);
}

#[tokio::test]
async fn list_orders_filters_by_status() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (customer_id, product_id) = create_customer_and_product(&client, &srv.base_url).await;

    create_order(&client, &srv.base_url, &customer_id, &product_id, 1).await;
    let cancelled = create_order(&client, &srv.base_url, &customer_id, &product_id, 2).await;
    client
        .delete(format!(
            "{}/api/v1/orders/{}",
            srv.base_url,
            cancelled["id"].as_str().unwrap()
        ))
        .send()
        .await
        .unwrap();

    let pending: Vec<serde_json::Value> = client
        .get(format!("{}/api/v1/orders?status=pending", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["status"], "pending");

    let shipped: Vec<serde_json::Value> = client
        .get(format!("{}/api/v1/orders?status=shipped", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(shipped.is_empty());
}

#[tokio::test]
async fn order_not_found_is_404() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!(
            "{}/api/v1/orders/00000000-0000-0000-0000-000000000000",
            srv.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .delete(format!(
            "{}/api/v1/orders/00000000-0000-0000-0000-000000000000",
            srv.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_order_with_unknown_product_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let customer: serde_json::Value = client
        .post(format!("{}/api/v1/customers", srv.base_url))
        .json(&customer_payload())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let res = client
        .post(format!("{}/api/v1/orders", srv.base_url))
        .json(&json!({
            "customer_id": customer["id"],
            "items": [{
                "product_id": "00000000-0000-0000-0000-000000000000",
                "quantity": 50,
            }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Nothing was persisted.
    let orders: Vec<serde_json::Value> = client
        .get(format!("{}/api/v1/orders", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(orders.is_empty());
}

#[tokio::test]
async fn create_order_rejects_non_positive_quantity() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (customer_id, product_id) = create_customer_and_product(&client, &srv.base_url).await;

    let res = client
        .post(format!("{}/api/v1/orders", srv.base_url))
        .json(&json!({
            "customer_id": customer_id,
            "items": [{ "product_id": product_id, "quantity": 0 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn customer_update_is_partial() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let customer: serde_json::Value = client
        .post(format!("{}/api/v1/customers", srv.base_url))
        .json(&customer_payload())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = customer["id"].as_str().unwrap();

    let updated: serde_json::Value = client
        .put(format!("{}/api/v1/customers/{id}", srv.base_url))
        .json(&json!({ "contact_name": "Greta Weber" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["contact_name"], "Greta Weber");
    assert_eq!(updated["company_name"], "TechFusion GmbH");
}

#[tokio::test]
async fn soft_deleted_product_disappears_from_listing_but_stays_orderable() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (customer_id, product_id) = create_customer_and_product(&client, &srv.base_url).await;

    let res = client
        .delete(format!("{}/api/v1/products/{}", srv.base_url, product_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let listed: Vec<serde_json::Value> = client
        .get(format!("{}/api/v1/products", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.is_empty());

    // The catalog's active flag is not consulted when pricing an order.
    let order = create_order(&client, &srv.base_url, &customer_id, &product_id, 10).await;
    assert_eq!(order["total_amount"], "85.20");
}
