use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

use credit_risk::config::Config;
use credit_risk::server::{self, AppState};

async fn spawn_server() -> SocketAddr {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(AppState::from_config(&Config::default()).unwrap());
    tokio::spawn(server::run(listener, state, std::future::pending()));
    addr
}

fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{}{}", addr, path)
}

#[allow(clippy::too_many_arguments)]
fn application(
    income: i64,
    loan: i64,
    term: i64,
    history: i64,
    employment: &str,
    area: &str,
    dependents: i64,
    education: &str,
    debt: i64,
) -> Value {
    json!({
        "applicant_income": income,
        "loan_amount": loan,
        "loan_term_months": term,
        "credit_history_months": history,
        "employment_status": employment,
        "property_area": area,
        "dependents": dependents,
        "education": education,
        "existing_debt": debt,
    })
}

async fn score(addr: SocketAddr, body: &Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(url(addr, "/api/v1/score"))
        .json(body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let addr = spawn_server().await;
    let response = reqwest::get(url(addr, "/health")).await.unwrap();
    assert_eq!(response.status(), 200);
    let data: Value = response.json().await.unwrap();
    assert_eq!(data["status"], "healthy");
    assert!(data["timestamp"].is_string());
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let addr = spawn_server().await;
    let data: Value = reqwest::get(url(addr, "/")).await.unwrap().json().await.unwrap();
    assert_eq!(data["score"], "/api/v1/score");
    assert_eq!(data["health"], "/health");
}

#[tokio::test]
async fn test_high_risk_application_declined() {
    let addr = spawn_server().await;
    let body = application(20000, 200000, 360, 6, "unemployed", "rural", 4, "not_graduate", 15000);
    let response = score(addr, &body).await;
    assert_eq!(response.status(), 200);
    let data: Value = response.json().await.unwrap();
    assert_eq!(data["risk_category"], "HIGH");
    assert_eq!(data["approval_recommendation"], "DECLINE");
}

#[tokio::test]
async fn test_low_risk_application_approved() {
    let addr = spawn_server().await;
    let body = application(100000, 150000, 180, 96, "employed", "urban", 1, "graduate", 5000);
    let data: Value = score(addr, &body).await.json().await.unwrap();
    assert_eq!(data["risk_category"], "LOW");
    assert_eq!(data["approval_recommendation"], "APPROVE");
    assert!(data["risk_score"].as_u64().unwrap() >= 70);
}

#[tokio::test]
async fn test_response_structure_and_ratios() {
    let addr = spawn_server().await;
    let body = application(50000, 150000, 360, 84, "employed", "urban", 2, "graduate", 15000);
    let data: Value = score(addr, &body).await.json().await.unwrap();

    for key in [
        "application_id",
        "risk_score",
        "risk_category",
        "approval_recommendation",
        "confidence",
        "key_factors",
        "debt_to_income_ratio",
        "loan_to_income_ratio",
        "processed_at",
    ] {
        assert!(data.get(key).is_some(), "missing {}", key);
    }
    assert!(data["key_factors"]["positive"].is_array());
    assert!(data["key_factors"]["negative"].is_array());
    assert!(data["application_id"].as_str().unwrap().starts_with("APP-"));
    assert_eq!(data["debt_to_income_ratio"], 30.0);
    assert_eq!(data["loan_to_income_ratio"], 3.0);

    let confidence = data["confidence"].as_f64().unwrap();
    assert!((0.75..=0.95).contains(&confidence));
}

#[tokio::test]
async fn test_negative_income_rejected() {
    let addr = spawn_server().await;
    let body = application(-1000, 150000, 360, 84, "employed", "urban", 2, "graduate", 15000);
    let response = score(addr, &body).await;
    assert_eq!(response.status(), 422);
    let data: Value = response.json().await.unwrap();
    assert_eq!(data["detail"][0]["field"], "applicant_income");
}

#[tokio::test]
async fn test_missing_field_rejected() {
    let addr = spawn_server().await;
    let mut body = application(50000, 150000, 360, 84, "employed", "urban", 2, "graduate", 15000);
    body.as_object_mut().unwrap().remove("education");
    let response = score(addr, &body).await;
    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn test_model_info() {
    let addr = spawn_server().await;
    let data: Value = reqwest::get(url(addr, "/api/v1/model/info"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(data["version"], "1.0.0");
    assert_eq!(data["features"].as_array().unwrap().len(), 9);
}

#[tokio::test]
async fn test_model_features_example_scores() {
    let addr = spawn_server().await;
    let data: Value = reqwest::get(url(addr, "/api/v1/model/features"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        data["required_features"]["employment_status"]["enum"],
        json!(["employed", "self_employed", "unemployed"])
    );

    // The advertised example is itself a valid application
    let response = score(addr, &data["example"]).await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let addr = spawn_server().await;
    let response = reqwest::get(url(addr, "/api/v2/score")).await.unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_cors_allowed_origin() {
    let addr = spawn_server().await;
    let response = reqwest::Client::new()
        .get(url(addr, "/health"))
        .header("Origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "http://localhost:3000");
    assert_eq!(headers["access-control-allow-credentials"], "true");
}

#[tokio::test]
async fn test_cors_preflight() {
    let addr = spawn_server().await;
    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, url(addr, "/api/v1/score"))
        .header("Origin", "https://creditrisk-frontend.vercel.app")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "https://creditrisk-frontend.vercel.app");
    assert!(headers["access-control-allow-methods"]
        .to_str()
        .unwrap()
        .contains("POST"));
}

#[tokio::test]
async fn test_cors_unknown_origin_gets_no_grant() {
    let addr = spawn_server().await;
    let response = reqwest::Client::new()
        .get(url(addr, "/health"))
        .header("Origin", "https://evil.example")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().get("access-control-allow-origin").is_none());
}
