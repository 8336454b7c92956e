//! Router behaviour over a stub gateway

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chain_client::{ContractGateway, Finality, SharedSession};
use locker_api::{create_app, AppState};
use locker_core::{Address, AppConfig, GatewayError, TxHash};
use locker_tx::{encode_uint, ContractCall, ContractFunction};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Empty chain: no locks, zero allowances, every submission declined
struct EmptyChain;

#[async_trait]
impl ContractGateway for EmptyChain {
    async fn read(
        &self,
        _from: Option<&Address>,
        call: &ContractCall,
    ) -> Result<Vec<u8>, GatewayError> {
        match call.function {
            ContractFunction::GetMyLocks => {
                let mut data = encode_uint(32).to_vec();
                data.extend_from_slice(&encode_uint(0));
                Ok(data)
            }
            _ => Ok(encode_uint(0).to_vec()),
        }
    }

    async fn submit(&self, _from: &Address, _call: &ContractCall) -> Result<TxHash, GatewayError> {
        Err(GatewayError::Rpc {
            code: 4001,
            message: "User rejected the request".to_string(),
        })
    }

    async fn await_finality(&self, _tx_hash: &TxHash) -> Result<Finality, GatewayError> {
        Ok(Finality::Reverted)
    }
}

fn app() -> Router {
    let gateway: Arc<dyn ContractGateway> = Arc::new(EmptyChain);
    create_app(AppState::new(
        AppConfig::default(),
        gateway,
        SharedSession::new(),
    ))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health_and_tokens() {
    let app = app();

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["chain_id"], 42429);
    assert_eq!(body["wallet_connected"], false);
    assert_eq!(body["call_in_flight"], false);

    let (status, body) = send(&app, "GET", "/tokens", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tokens"].as_array().unwrap().len(), 4);
    assert_eq!(body["decimals"], 6);
    assert_eq!(body["default_token"], "AlphaUSD");
    assert_eq!(body["duration_presets"][0]["days"], 7);
}

#[tokio::test]
async fn test_disconnected_view_is_empty() {
    let app = app();

    let (status, body) = send(&app, "GET", "/locks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"], Value::Null);
    assert!(body["locks"].as_array().unwrap().is_empty());

    let (status, body) = send(&app, "GET", "/action", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "idle");
}

#[tokio::test]
async fn test_error_mapping() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/approve",
        Some(json!({"token": "AlphaUSD", "amount": "1.1234567"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_amount");

    let (status, body) = send(
        &app,
        "POST",
        "/approve",
        Some(json!({"token": "AlphaUSD", "amount": "5"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "wallet_disconnected");

    let (status, body) = send(&app, "GET", "/allowance/GammaUSD", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "unknown_token");

    let (status, body) = send(&app, "POST", "/action/abandon", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "precondition_not_met");
}

#[tokio::test]
async fn test_connect_then_rejected_submission() {
    let app = app();

    let (status, _) = send(
        &app,
        "POST",
        "/wallet/connect",
        Some(json!({"address": "not-an-address"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/wallet/connect",
        Some(json!({"address": "0x1111111111111111111111111111111111111111"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connected"], true);

    let (_, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(body["wallet_connected"], true);

    let (status, body) = send(&app, "GET", "/allowance/AlphaUSD?amount=500", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowance"], Value::Null);
    assert_eq!(body["amount"], "500000000");
    assert_eq!(body["needs_approval"], true);

    let (status, body) = send(&app, "POST", "/allowance/AlphaUSD/refresh?amount=500", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowance"], "0");
    assert_eq!(body["needs_approval"], true);

    let (status, body) = send(
        &app,
        "POST",
        "/approve",
        Some(json!({"token": "AlphaUSD", "amount": "500"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "submission_rejected");

    let (_, body) = send(&app, "GET", "/action", None).await;
    assert_eq!(body["state"], "failed");

    let (status, body) = send(&app, "POST", "/action/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "idle");

    let (status, body) = send(&app, "POST", "/wallet/disconnect", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connected"], false);

    let (status, body) = send(&app, "GET", "/locks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"], Value::Null);
    assert_eq!(body["refreshed_at"], Value::Null);

    let (_, body) = send(&app, "GET", "/allowance/AlphaUSD?amount=500", None).await;
    assert_eq!(body["allowance"], Value::Null);
}
