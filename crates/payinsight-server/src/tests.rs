//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Local, NaiveDateTime};
use http_body_util::BodyExt;
use payinsight_core::db::Database;
use payinsight_core::models::{RefundRecord, TransactionRecord, TransactionStatus};
use tower::ServiceExt;

fn setup_test_app() -> Router {
    create_router(Database::in_memory().unwrap())
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Noon of the previous local day, inside every reporting window
fn yesterday_noon() -> String {
    let day = Local::now().date_naive() - Duration::days(1);
    let at: NaiveDateTime = day.and_hms_opt(12, 0, 0).unwrap();
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn seeded_db() -> Database {
    let db = Database::in_memory().unwrap();
    let ts = yesterday_noon();

    for (amount, status, method) in [
        (1000.0, TransactionStatus::Completed, "UPI"),
        (250.0, TransactionStatus::Completed, "CARD"),
        (400.0, TransactionStatus::Failed, "UPI"),
    ] {
        db.insert_transaction(&TransactionRecord {
            timestamp: ts.clone(),
            amount,
            status,
            payment_method: method.to_string(),
        })
        .unwrap();
    }

    db.insert_refund(&RefundRecord {
        refund_id: Some("R1".to_string()),
        timestamp: ts,
        reason: "Damaged".to_string(),
        amount: 120.0,
    })
    .unwrap();

    db
}

async fn ask(app: Router, query: &str) -> (StatusCode, serde_json::Value) {
    let body = serde_json::json!({ "query": query });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/get-insight")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    (status, get_body_json(response).await)
}

// ========== Health Tests ==========

#[tokio::test]
async fn test_health() {
    let app = setup_test_app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["message"], "Welcome to the Merchant Insights API!");
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header("origin", "http://dashboard.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}

// ========== Insight API Tests ==========

#[tokio::test]
async fn test_unknown_question_falls_back() {
    let (status, json) = ask(setup_test_app(), "what's the weather?").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["insight_text"],
        "Sorry, I can't answer that question yet. Try asking about 'refunds yesterday' or 'sales performance this week'."
    );
    assert_eq!(json["chart_json"], "{}");
    assert_eq!(json["query_used"], "N/A");
}

#[tokio::test]
async fn test_refunds_on_empty_store() {
    let (status, json) = ask(setup_test_app(), "refunds yesterday").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["insight_text"],
        "No refund data found for the specified period."
    );
    assert_eq!(json["chart_json"], "{}");
    assert!(json["query_used"].as_str().unwrap().contains("FROM refunds"));
}

#[tokio::test]
async fn test_sales_on_empty_store() {
    let (status, json) = ask(setup_test_app(), "sales performance upi this week").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["insight_text"],
        "No sales data found for UPI in the last 7 days."
    );
    assert_eq!(json["chart_json"], "{}");
}

#[tokio::test]
async fn test_refunds_with_data() {
    let (status, json) = ask(create_router(seeded_db()), "Refunds yesterday").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["insight_text"],
        "Found 1 refunds totaling ₹120.00 yesterday. The primary reasons for refunds were: Damaged."
    );

    // chart_json is a string holding the chart document
    let chart: serde_json::Value =
        serde_json::from_str(json["chart_json"].as_str().unwrap()).unwrap();
    assert_eq!(chart["data"][0]["type"], "bar");
    assert_eq!(chart["layout"]["title"]["text"], "Refunds by Reason (Yesterday)");
}

#[tokio::test]
async fn test_sales_with_data() {
    let (status, json) = ask(create_router(seeded_db()), "sales performance this week").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["insight_text"],
        "In the last 7 days, you've had total sales of ₹1,250.00 across all payment methods. \
         Your transaction success rate was 66.67%."
    );

    let chart: serde_json::Value =
        serde_json::from_str(json["chart_json"].as_str().unwrap()).unwrap();
    assert_eq!(chart["data"][0]["mode"], "lines+markers");
}

#[tokio::test]
async fn test_sales_filtered_by_upi() {
    let (status, json) = ask(create_router(seeded_db()), "UPI sales").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["insight_text"],
        "In the last 7 days, you've had total sales of ₹1,000.00 for UPI. \
         Your transaction success rate was 50.00%."
    );
    assert!(json["query_used"]
        .as_str()
        .unwrap()
        .contains("payment_method = :method"));
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/get-insight")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"question": "refunds"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_get_insight_requires_post() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/get-insight")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// ========== Error Handling Tests ==========

#[tokio::test]
async fn test_internal_errors_are_sanitized() {
    let err: AppError = anyhow::anyhow!("disk I/O error at /secret/path").into();
    let response = err.into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "An internal error occurred");
}
