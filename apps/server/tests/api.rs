use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use spendquest_core::errors::Result as CoreResult;
use spendquest_core::payments::{
    sign_payment, GatewayOrder, GatewayPayment, GatewayRefund, OrderRequest, PaymentGatewayTrait,
};
use spendquest_gateway::GatewayConfig;
use spendquest_server::{api::app_router, build_state_with_gateway, config::Config};
use tempfile::TempDir;
use tower::ServiceExt;

const GATEWAY_SECRET: &str = "test_gateway_secret";

/// Gateway double that accepts every call.
#[derive(Default)]
struct StubGateway {
    orders: AtomicUsize,
}

#[async_trait]
impl PaymentGatewayTrait for StubGateway {
    async fn create_order(&self, request: OrderRequest) -> CoreResult<GatewayOrder> {
        let n = self.orders.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(GatewayOrder {
            id: format!("order_test_{n}"),
            amount: request.amount,
            currency: request.currency,
            receipt: Some(request.receipt),
            status: "created".to_string(),
        })
    }

    async fn fetch_payment(&self, payment_id: &str) -> CoreResult<GatewayPayment> {
        Ok(GatewayPayment {
            id: payment_id.to_string(),
            order_id: Some("order_test_1".to_string()),
            amount: 50000,
            currency: "INR".to_string(),
            status: "captured".to_string(),
            method: Some("upi".to_string()),
        })
    }

    async fn refund(&self, payment_id: &str, amount: Option<i64>) -> CoreResult<GatewayRefund> {
        Ok(GatewayRefund {
            id: "rfnd_test".to_string(),
            payment_id: payment_id.to_string(),
            amount: amount.unwrap_or(50000),
            status: "processed".to_string(),
        })
    }
}

struct TestApp {
    router: Router,
    _dir: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            listen_addr: "127.0.0.1:0".parse().unwrap(),
            db_path: dir.path().join("test.db").to_string_lossy().to_string(),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_secs(30),
            jwt_secret: b"spendquest-local-dev-secret-32b!".to_vec(),
            token_ttl: Duration::from_secs(3600),
            gateway: GatewayConfig {
                key_secret: GATEWAY_SECRET.to_string(),
                ..GatewayConfig::default()
            },
            order_timeout: Duration::from_secs(5),
        };
        let state = build_state_with_gateway(&config, Arc::new(StubGateway::default()))
            .await
            .unwrap();
        Self {
            router: app_router(state, &config),
            _dir: dir,
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// Registers a user and returns its access token.
    async fn register(&self, email: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(json!({ "name": "Asha", "email": email, "password": "hunter2hunter2" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["accessToken"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn health_checks_and_auth_gate() {
    let app = TestApp::new().await;

    let (status, _) = app.send(Method::GET, "/api/v1/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.send(Method::GET, "/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/auth/login"].is_object());
    for path in [
        "/api/v1/transactions",
        "/api/v1/transactions/{id}/cancel",
        "/api/v1/payments/orders",
        "/api/v1/payments/{payment_id}",
        "/api/v1/goals",
        "/api/v1/goals/settle",
        "/api/v1/spending",
        "/api/v1/games/debt-payoff/compare",
        "/api/v1/games/scenarios/submit",
    ] {
        assert!(body["paths"][path].is_object(), "{path} missing from openapi");
    }
    assert!(body["components"]["schemas"]["Goal"].is_object());
    assert!(body["components"]["schemas"]["Transaction"].is_object());

    let (status, body) = app.send(Method::GET, "/api/v1/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .send(Method::GET, "/api/v1/goals", Some("garbage"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_and_profile() {
    let app = TestApp::new().await;
    let token = app.register("Asha@Example.com").await;

    let (status, body) = app
        .send(Method::GET, "/api/v1/users/me", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], "asha@example.com");
    assert_eq!(body["data"]["coins"], 0);
    assert!(body["data"].get("passwordHash").is_none());

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({ "name": "Asha", "email": "asha@example.com", "password": "hunter2hunter2" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already registered"));

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "asha@example.com", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "ASHA@example.com", "password": "hunter2hunter2" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let login_token = body["data"]["accessToken"].as_str().unwrap();

    let (status, body) = app
        .send(
            Method::PUT,
            "/api/v1/users/me",
            Some(login_token),
            Some(json!({ "name": "Asha K" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Asha K");
}

#[tokio::test]
async fn validation_gate_reports_every_field() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({ "name": "A", "email": "not-an-email", "password": "short" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("\"name\" length must be at least 2 characters long"));
    assert!(error.contains("\"password\" length must be at least 8 characters long"));

    let token = app.register("asha@example.com").await;
    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/transactions",
            Some(&token),
            Some(json!({ "amount": 10, "category": "toys", "merchant": "Shop", "paymentMethod": "card" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("\"category\" must be one of"));
}

#[tokio::test]
async fn manual_transactions_list_and_cancel() {
    let app = TestApp::new().await;
    let token = app.register("asha@example.com").await;
    let other = app.register("ravi@example.com").await;

    for (category, amount) in [("food", 120.5), ("bills", 900.0), ("food", 80.0)] {
        let (status, body) = app
            .send(
                Method::POST,
                "/api/v1/transactions",
                Some(&token),
                Some(json!({
                    "amount": amount,
                    "category": category,
                    "merchant": "Corner Store",
                    "paymentMethod": "upi"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["status"], "pending");
        assert_eq!(body["data"]["currency"], "INR");
    }

    let (status, body) = app
        .send(
            Method::GET,
            "/api/v1/transactions?category=food&limit=1",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["totalPages"], 2);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    let tx_id = body["data"]["items"][0]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(Method::GET, "/api/v1/transactions?limit=500", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::GET,
            &format!("/api/v1/transactions/{tx_id}"),
            Some(&other),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let cancel_uri = format!("/api/v1/transactions/{tx_id}/cancel");
    let (status, body) = app
        .send(Method::POST, &cancel_uri, Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");

    let (status, _) = app
        .send(Method::POST, &cancel_uri, Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn payment_order_verify_and_refund() {
    let app = TestApp::new().await;
    let token = app.register("asha@example.com").await;
    let order_body = json!({
        "amount": 500,
        "category": "shopping",
        "merchant": "Bazaar",
        "paymentMethod": "card"
    });

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/payments/orders",
            Some(&token),
            Some(order_body.clone()),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["order"]["amount"], 50000);
    let first_order = body["data"]["order"]["id"].as_str().unwrap().to_string();
    let first_tx = body["data"]["transaction"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["transaction"]["orderId"], first_order.as_str());

    // Tampered signature fails the transaction.
    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/payments/verify",
            Some(&token),
            Some(json!({ "orderId": first_order, "paymentId": "pay_bad", "signature": "00" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    let (_, body) = app
        .send(
            Method::GET,
            &format!("/api/v1/transactions/{first_tx}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(body["data"]["status"], "failed");

    let (_, body) = app
        .send(Method::POST, "/api/v1/payments/orders", Some(&token), Some(order_body))
        .await;
    let order_id = body["data"]["order"]["id"].as_str().unwrap().to_string();
    let signature = sign_payment(&order_id, "pay_good", GATEWAY_SECRET).unwrap();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/payments/verify",
            Some(&token),
            Some(json!({ "orderId": order_id, "paymentId": "pay_good", "signature": signature })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["paymentId"], "pay_good");
    let tx_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = app
        .send(Method::GET, "/api/v1/spending", Some(&token), None)
        .await;
    assert_eq!(body["data"][0]["category"], "shopping");
    assert_eq!(body["data"][0]["amount"].as_f64(), Some(500.0));

    let (status, body) = app
        .send(Method::GET, "/api/v1/payments/pay_good", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "captured");

    // Payment ids are only visible to the user who paid.
    let other = app.register("ravi@example.com").await;
    let (status, body) = app
        .send(Method::GET, "/api/v1/payments/pay_good", Some(&other), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/payments/refunds",
            Some(&token),
            Some(json!({ "transactionId": tx_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fullRefund"], true);
    assert_eq!(body["data"]["transaction"]["status"], "cancelled");

    let (_, body) = app
        .send(Method::GET, "/api/v1/spending", Some(&token), None)
        .await;
    assert_eq!(body["data"][0]["amount"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn goals_follow_spending_snapshot() {
    let app = TestApp::new().await;
    let token = app.register("asha@example.com").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/goals",
            Some(&token),
            Some(json!({ "name": "Eat in", "category": "food", "weeklyLimit": 2000, "tzOffsetMinutes": 330 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "active");
    assert_eq!(body["data"]["reward"], 20);
    assert_eq!(body["data"]["penalty"], 10);
    let goal_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(
            Method::PUT,
            "/api/v1/spending",
            Some(&token),
            Some(json!({ "totals": [
                { "category": "food", "amount": 450 },
                { "category": "transport", "amount": 90 }
            ] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let mut synced = false;
    for _ in 0..50 {
        let (_, body) = app
            .send(Method::GET, "/api/v1/goals", Some(&token), None)
            .await;
        if body["data"][0]["currentSpending"].as_f64() == Some(450.0) {
            synced = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(synced, "goal never picked up the new spending totals");

    // The week has not ended, so nothing settles.
    let (status, body) = app
        .send(Method::POST, "/api/v1/goals/settle", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());

    let goal_uri = format!("/api/v1/goals/{goal_id}");
    let (status, body) = app
        .send(
            Method::PUT,
            &goal_uri,
            Some(&token),
            Some(json!({ "weeklyLimit": 3000 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["reward"], 30);

    let (status, body) = app
        .send(
            Method::PUT,
            &goal_uri,
            Some(&token),
            Some(json!({ "weeklyLimit": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, _) = app.send(Method::DELETE, &goal_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send(Method::DELETE, &goal_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn games_simulate_and_quiz_credit() {
    let app = TestApp::new().await;
    let token = app.register("asha@example.com").await;

    let debts = json!([
        { "name": "Card", "amount": 2000, "annualRate": 24, "minimumPayment": 100 },
        { "name": "Loan", "amount": 500, "annualRate": 10, "minimumPayment": 50 }
    ]);
    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/games/debt-payoff",
            Some(&token),
            Some(json!({ "debts": debts, "extraMonthlyPayment": 100, "strategy": "snowball" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["payoffOrder"][0], "Loan");
    assert_eq!(body["data"]["capped"], false);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/games/debt-payoff/compare",
            Some(&token),
            Some(json!({ "debts": debts, "extraMonthlyPayment": 100 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["avalanche"]["payoffOrder"][0], "Card");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/games/debt-payoff",
            Some(&token),
            Some(json!({ "debts": [], "strategy": "snowball" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/games/debt-payoff",
            Some(&token),
            Some(json!({
                "debts": [{ "name": "Shark", "amount": 100000, "annualRate": 5000, "minimumPayment": 10 }],
                "extraMonthlyPayment": 1,
                "strategy": "avalanche"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(Method::GET, "/api/v1/games/scenarios", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let scenarios = body["data"].as_array().unwrap();
    assert_eq!(scenarios.len(), 5);
    assert!(scenarios.iter().all(|s| s.get("answer").is_none()));

    let answers = json!([
        { "scenarioId": "emergency-fund", "choice": 1 },
        { "scenarioId": "card-minimum", "choice": 1 },
        { "scenarioId": "avalanche", "choice": 1 },
        { "scenarioId": "sale-impulse", "choice": 1 },
        { "scenarioId": "budget-rule", "choice": 2 }
    ]);
    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/games/scenarios/submit",
            Some(&token),
            Some(json!({ "answers": answers })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["correct"], 5);
    assert_eq!(body["data"]["coinsEarned"], 25);
    assert_eq!(body["data"]["balance"], 25);

    // Solved scenarios pay out once.
    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/games/scenarios/submit",
            Some(&token),
            Some(json!({ "answers": answers })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["correct"], 5);
    assert_eq!(body["data"]["coinsEarned"], 0);
    assert_eq!(body["data"]["balance"], 25);

    let (_, body) = app
        .send(Method::GET, "/api/v1/users/me/coins", Some(&token), None)
        .await;
    assert_eq!(body["data"]["coins"], 25);
}
