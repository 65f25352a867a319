use crate::context::{CONTRACT, EMPLOYEE_EMAIL};
use axum::extract::{Form, Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use payroll::adapter::{HttpPayrollClient, TokenStore};
use payroll::domain::ApiError;
use payroll::port::{EmployeeApi, EmployerApi};
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const TOKEN: &str = "tok-123";

type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

#[derive(Clone, Default)]
struct Backend {
    wallet_links: Arc<Mutex<Vec<(u64, Value)>>>,
}

fn authorized(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    let expected = format!("Bearer {TOKEN}");
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Not authenticated"})),
        )),
    }
}

async fn login(Form(form): Form<HashMap<String, String>>) -> Reply {
    let valid = form.get("username").map(String::as_str) == Some(EMPLOYEE_EMAIL)
        && form.get("password").map(String::as_str) == Some("secret");
    if !valid {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Incorrect email or password"})),
        ));
    }
    Ok(Json(json!({"access_token": TOKEN, "token_type": "bearer"})))
}

async fn profile(headers: HeaderMap) -> Reply {
    authorized(&headers)?;
    Ok(Json(json!({
        "email": EMPLOYEE_EMAIL,
        "role": "employee",
        "employee": {
            "id": 1,
            "name": "Asha",
            "email": EMPLOYEE_EMAIL,
            "role": "employee",
            "is_streaming": true,
            "wallet_address": "0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1"
        },
        "total_earned": 9300.5
    })))
}

async fn transactions(headers: HeaderMap) -> Reply {
    authorized(&headers)?;
    Ok(Json(json!([
        {
            "id": 2,
            "employee_id": 1,
            "amount": "4500.00",
            "tax_amount": "500.00",
            "description": "Salary",
            "timestamp": "2025-12-31T09:30:00"
        },
        {
            "id": 1,
            "employee_id": 1,
            "amount": 900,
            "tax_amount": 100,
            "description": "",
            "timestamp": "2025-11-30T18:00:00.123456Z"
        }
    ])))
}

async fn blockchain_config() -> Json<Value> {
    Json(json!({"contract_address": CONTRACT, "abi": []}))
}

async fn missing_employee(Path(_id): Path<u64>) -> Reply {
    Err((
        StatusCode::NOT_FOUND,
        Json(json!({"detail": "Employee not found"})),
    ))
}

async fn broken_withdraw() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

async fn link_wallet(
    State(backend): State<Backend>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    backend.wallet_links.lock().unwrap().push((id, body));
    Json(json!({"message": "Wallet linked"}))
}

async fn spawn_backend(backend: Backend) -> String {
    let app = Router::new()
        .route("/api/login", post(login))
        .route("/api/me/profile", get(profile))
        .route("/api/me/transactions", get(transactions))
        .route("/api/blockchain/config", get(blockchain_config))
        .route("/api/employees/:id", get(missing_employee))
        .route("/api/employees/:id/wallet", put(link_wallet))
        .route("/api/treasury/withdraw", post(broken_withdraw))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base_url: &str, tokens: TokenStore) -> HttpPayrollClient {
    HttpPayrollClient::new(base_url, Arc::new(tokens), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_login_then_bearer_requests() {
    let base = spawn_backend(Backend::default()).await;
    let api = client(&base, TokenStore::new());

    let token = api.login(EMPLOYEE_EMAIL, "secret").await.unwrap();
    assert_eq!(token.access_token, TOKEN);
    assert_eq!(api.tokens().get().await.as_deref(), Some(TOKEN));

    let profile = api.my_profile().await.unwrap();
    assert_eq!(profile.total_earned, dec!(9300.5));
    assert_eq!(
        profile.expected_wallet(),
        Some("0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1")
    );
}

#[tokio::test]
async fn test_wrong_password_is_invalid_credentials() {
    let base = spawn_backend(Backend::default()).await;
    let api = client(&base, TokenStore::new());

    assert_eq!(
        api.login(EMPLOYEE_EMAIL, "wrong").await.unwrap_err(),
        ApiError::InvalidCredentials
    );
    assert_eq!(api.tokens().get().await, None);
}

#[tokio::test]
async fn test_unauthorized_clears_token() {
    let base = spawn_backend(Backend::default()).await;
    let api = client(&base, TokenStore::with_token("expired"));

    assert_eq!(api.my_profile().await.unwrap_err(), ApiError::Unauthorized);
    assert_eq!(api.tokens().get().await, None);
}

#[tokio::test]
async fn test_transactions_accept_backend_formats() {
    let base = spawn_backend(Backend::default()).await;
    let api = client(&base, TokenStore::with_token(TOKEN));

    let txs = api.my_transactions().await.unwrap();
    assert_eq!(txs.len(), 2);
    assert_eq!(txs[0].amount, dec!(4500));
    assert_eq!(txs[0].tax_amount, dec!(500));
    assert_eq!(txs[0].timestamp.to_rfc3339(), "2025-12-31T09:30:00+00:00");
    assert_eq!(txs[1].amount, dec!(900));
    assert_eq!(txs[1].title(), "Payment");
}

#[tokio::test]
async fn test_blockchain_config_contract() {
    let base = spawn_backend(Backend::default()).await;
    let api = client(&base, TokenStore::new());

    let config = api.blockchain_config().await.unwrap();
    assert_eq!(config.contract(), Some(CONTRACT.parse().unwrap()));
}

#[tokio::test]
async fn test_error_detail_is_surfaced() {
    let base = spawn_backend(Backend::default()).await;
    let api = client(&base, TokenStore::with_token(TOKEN));

    assert_eq!(
        api.employee(42).await.unwrap_err(),
        ApiError::Rejected {
            status: 404,
            detail: "Employee not found".to_string(),
        }
    );
}

#[tokio::test]
async fn test_error_without_detail_falls_back() {
    let base = spawn_backend(Backend::default()).await;
    let api = client(&base, TokenStore::with_token(TOKEN));

    assert_eq!(
        api.withdraw_treasury(dec!(10)).await.unwrap_err(),
        ApiError::Rejected {
            status: 500,
            detail: "Request failed".to_string(),
        }
    );
}

#[tokio::test]
async fn test_link_wallet_sends_json_body() {
    let backend = Backend::default();
    let base = spawn_backend(backend.clone()).await;
    let api = client(&base, TokenStore::with_token(TOKEN));

    api.link_wallet(7, "0xabc").await.unwrap();

    let links = backend.wallet_links.lock().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].0, 7);
    assert_eq!(links[0].1, json!({"wallet_address": "0xabc"}));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = client(&format!("http://{addr}"), TokenStore::new());
    assert!(matches!(
        api.blockchain_config().await,
        Err(ApiError::Transport(_))
    ));
}
