// SPDX-License-Identifier: Apache-2.0

use crate::{build_router, ApiConfig, AppState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::routing::any;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use verdant_store::Store;

const BOUNDARY: &str = "verdant-test-boundary";

fn state_with_workflow(workflow_url: &str) -> AppState {
    let api = ApiConfig {
        workflow_url: workflow_url.to_string(),
        ..ApiConfig::default()
    };
    AppState::with_config(Store::open_in_memory().expect("store"), api)
}

async fn spawn_upstream(status: StatusCode, content_type: &'static str, body: &'static str) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind upstream");
    let addr = listener.local_addr().expect("upstream addr");
    let app = Router::new().route(
        "/",
        any(move || async move { (status, [(header::CONTENT_TYPE, content_type)], body) }),
    );
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve upstream");
    });
    format!("http://{addr}/")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

fn multipart_upload_body(period: Option<&str>) -> String {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
         filename=\"activity.xlsx\"\r\nContent-Type: application/octet-stream\r\n\r\n\
         fake-spreadsheet-bytes\r\n"
    );
    if let Some(period) = period {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"reporting_period\"\r\n\r\n{period}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

fn upload_request(period: Option<&str>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/uploads")
        .header("x-user-id", "user-1")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_upload_body(period)))
        .expect("request")
}

// ---- proxy ---------------------------------------------------------------

#[tokio::test]
async fn proxy_options_preflight_is_empty_with_cors_headers() {
    let app = build_router(state_with_workflow("http://127.0.0.1:9/"));
    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/calculate-emissions")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-methods")
            .and_then(|v| v.to_str().ok()),
        Some("POST, OPTIONS")
    );
    assert!(body_text(response).await.is_empty());
}

#[tokio::test]
async fn proxy_rejects_non_post_methods() {
    let app = build_router(state_with_workflow("http://127.0.0.1:9/"));
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/calculate-emissions")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn proxy_relays_upstream_errors_with_status_and_excerpt() {
    let upstream = spawn_upstream(
        StatusCode::INTERNAL_SERVER_ERROR,
        "text/plain",
        "server error",
    )
    .await;
    let app = build_router(state_with_workflow(&upstream));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/calculate-emissions")
                .header(header::CONTENT_TYPE, "multipart/form-data; boundary=x")
                .body(Body::from("payload"))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "n8n returned error: 500");
    assert_eq!(body["details"], "server error");
}

#[tokio::test]
async fn proxy_relays_successful_json_bodies() {
    let upstream = spawn_upstream(
        StatusCode::OK,
        "application/json",
        r#"{"total_emissions": 42.0}"#,
    )
    .await;
    let app = build_router(state_with_workflow(&upstream));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/calculate-emissions")
                .body(Body::from("payload"))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("access-control-allow-origin"));
    let body = body_json(response).await;
    assert_eq!(body["total_emissions"], 42.0);
}

#[tokio::test]
async fn proxy_relays_non_json_success_as_raw_text() {
    let upstream = spawn_upstream(StatusCode::OK, "text/plain", "queued for processing").await;
    let app = build_router(state_with_workflow(&upstream));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/calculate-emissions")
                .body(Body::from("payload"))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "queued for processing");
}

#[tokio::test]
async fn proxy_maps_network_failure_to_500() {
    // Nothing listens on this port.
    let app = build_router(state_with_workflow("http://127.0.0.1:1/"));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/calculate-emissions")
                .body(Body::from("payload"))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "failed to reach calculation workflow");
    assert!(body["details"].is_string());
}

// ---- upload flow ---------------------------------------------------------

#[tokio::test]
async fn upload_normalizes_persists_and_returns_the_record() {
    let upstream = spawn_upstream(
        StatusCode::OK,
        "application/json",
        r#"[{"data": {"totalEmissions": 224.0,
                      "scopes": {"scope1": 73.0, "scope2": 120.0, "scope3": 31.0},
                      "emissions": {"electricity": 120.0, "gas": 40.0, "fuel": 33.0,
                                    "flights": 18.0, "water": 3.0, "waste": 10.0}}}]"#,
    )
    .await;
    let app = build_router(state_with_workflow(&upstream));

    let response = app
        .clone()
        .oneshot(upload_request(Some("Q1 2025")))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let record = &body["record"]["record"];
    assert_eq!(record["total_emissions"], 224.0);
    assert_eq!(record["scopes"]["scope1"], 73.0);
    assert_eq!(record["categories"]["electricity"], 120.0);
    assert_eq!(record["period"]["label"], "Q1 2025");
    assert_eq!(record["period"]["start"], "2025-01-01");
    assert_eq!(record["source_file"], "activity.xlsx");

    // The record is persisted and now the latest.
    let latest = app
        .oneshot(
            Request::builder()
                .uri("/v1/records/latest")
                .header("x-user-id", "user-1")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(latest.status(), StatusCode::OK);
    let latest_body = body_json(latest).await;
    assert_eq!(latest_body["record"]["record"]["total_emissions"], 224.0);
}

#[tokio::test]
async fn upload_requires_identity_before_any_upstream_call() {
    // The workflow URL points nowhere; an unauthenticated upload must fail
    // fast without touching it.
    let app = build_router(state_with_workflow("http://127.0.0.1:1/"));
    let request = Request::builder()
        .method("POST")
        .uri("/v1/uploads")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_upload_body(Some("Q1 2025"))))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn upload_with_unusable_workflow_response_persists_nothing() {
    let upstream = spawn_upstream(
        StatusCode::OK,
        "application/json",
        r#"{"status": "ok", "rows": 3}"#,
    )
    .await;
    let app = build_router(state_with_workflow(&upstream));

    let response = app
        .clone()
        .oneshot(upload_request(None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "workflow_response_invalid");
    let details = body["error"]["details"]["details"]
        .as_str()
        .expect("details");
    assert!(details.contains("total_emissions"), "{details}");
    assert!(details.contains("rows"), "{details}");

    let latest = app
        .oneshot(
            Request::builder()
                .uri("/v1/records/latest")
                .header("x-user-id", "user-1")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(latest.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_relays_upstream_error_status_detail() {
    let upstream = spawn_upstream(StatusCode::BAD_GATEWAY, "text/plain", "workflow crashed").await;
    let app = build_router(state_with_workflow(&upstream));
    let response = app
        .oneshot(upload_request(None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "n8n returned error: 502");
    assert_eq!(body["error"]["details"]["details"], "workflow crashed");
}

// ---- profile, scenarios, progress ---------------------------------------

#[tokio::test]
async fn profile_upserts_and_reads_back() {
    let app = build_router(state_with_workflow("http://127.0.0.1:9/"));
    let profile = json!({
        "company_name": "Acme Logistics",
        "industry": "logistics",
        "employee_count": 120,
        "site_count": 3,
        "energy_sources": ["grid", "solar"],
        "fleet_description": "12 diesel vans",
        "sustainability_initiatives": ["LED retrofit"],
        "reduction_target": "20% by 2030",
        "budget_posture": "moderate"
    });

    let put = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/v1/profile")
                .header("x-user-id", "user-1")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(profile.to_string()))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(put.status(), StatusCode::OK);

    let get = app
        .oneshot(
            Request::builder()
                .uri("/v1/profile")
                .header("x-user-id", "user-1")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(get.status(), StatusCode::OK);
    let body = body_json(get).await;
    assert_eq!(body["profile"]["company_name"], "Acme Logistics");
}

#[tokio::test]
async fn profile_validation_rejects_blank_company_names() {
    let app = build_router(state_with_workflow("http://127.0.0.1:9/"));
    let profile = json!({
        "company_name": "   ",
        "industry": "",
        "employee_count": 0,
        "site_count": 0,
        "energy_sources": [],
        "fleet_description": "",
        "sustainability_initiatives": [],
        "reduction_target": "",
        "budget_posture": ""
    });
    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/v1/profile")
                .header("x-user-id", "user-1")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(profile.to_string()))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unauthenticated_requests_are_rejected() {
    let app = build_router(state_with_workflow("http://127.0.0.1:9/"));
    for uri in ["/v1/records", "/v1/profile", "/v1/scenarios", "/v1/progress"] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "unauthenticated", "{uri}");
    }
}

#[tokio::test]
async fn scenario_lifecycle_and_progress_readout() {
    let upstream = spawn_upstream(
        StatusCode::OK,
        "application/json",
        r#"{"total_emissions": 202.0, "scope1_total": 100.0, "scope2_total": 80.0, "scope3_total": 22.0}"#,
    )
    .await;
    let app = build_router(state_with_workflow(&upstream));

    // Upload one record so progress has a current total.
    let upload = app
        .clone()
        .oneshot(upload_request(Some("Q1 2025")))
        .await
        .expect("response");
    assert_eq!(upload.status(), StatusCode::OK);

    let scenario = json!({
        "name": "Fleet electrification",
        "baseline_total": 224.0,
        "target_total": 180.0,
        "category_reductions": {"fuel": 40.0},
        "overall_reduction_pct": 20.0,
        "timeline_months": 18
    });
    let created = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/scenarios")
                .header("x-user-id", "user-1")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(scenario.to_string()))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(created.status(), StatusCode::OK);
    let created_body = body_json(created).await;
    let id = created_body["scenario"]["id"].as_i64().expect("id");

    // No active scenario yet: progress is null.
    let empty_progress = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/progress")
                .header("x-user-id", "user-1")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let empty_body = body_json(empty_progress).await;
    assert!(empty_body["progress"].is_null());

    let activated = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/v1/scenarios/{id}/activate"))
                .header("x-user-id", "user-1")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(activated.status(), StatusCode::OK);

    let progress = app
        .oneshot(
            Request::builder()
                .uri("/v1/progress")
                .header("x-user-id", "user-1")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(progress.status(), StatusCode::OK);
    let body = body_json(progress).await;
    assert_eq!(body["progress"]["progress_pct"], 50.0);
    assert_eq!(body["progress"]["current_total"], 202.0);
    assert_eq!(body["progress"]["status"], "off_track");
}

#[tokio::test]
async fn activating_an_unknown_scenario_is_404() {
    let app = build_router(state_with_workflow("http://127.0.0.1:9/"));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/scenarios/999/activate")
                .header("x-user-id", "user-1")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---- reports and chat ----------------------------------------------------

#[tokio::test]
async fn reports_round_trip_by_source_file() {
    let app = build_router(state_with_workflow("http://127.0.0.1:9/"));
    let put = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/v1/reports/q1.xlsx")
                .header("x-user-id", "user-1")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"body": "<h1>Q1</h1>"}).to_string()))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(put.status(), StatusCode::OK);

    let get = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/reports/q1.xlsx")
                .header("x-user-id", "user-1")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(get.status(), StatusCode::OK);
    let body = body_json(get).await;
    assert_eq!(body["report"]["body"], "<h1>Q1</h1>");

    let missing = app
        .oneshot(
            Request::builder()
                .uri("/v1/reports/q2.xlsx")
                .header("x-user-id", "user-1")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn chat_relays_to_the_webhook_with_context() {
    let chat_upstream = spawn_upstream(
        StatusCode::OK,
        "application/json",
        r#"{"response": "Your scope 2 emissions dominate."}"#,
    )
    .await;
    let api = ApiConfig {
        workflow_url: "http://127.0.0.1:9/".to_string(),
        chat_url: Some(chat_upstream),
        ..ApiConfig::default()
    };
    let app = build_router(AppState::with_config(
        Store::open_in_memory().expect("store"),
        api,
    ));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/chat")
                .header("x-user-id", "user-1")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"message": "What drives my footprint?"}).to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["response"], "Your scope 2 emissions dominate.");
}

#[tokio::test]
async fn chat_without_a_configured_webhook_is_bad_gateway() {
    let app = build_router(state_with_workflow("http://127.0.0.1:9/"));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/chat")
                .header("x-user-id", "user-1")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"message": "hello"}).to_string()))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

// ---- service plumbing ----------------------------------------------------

#[tokio::test]
async fn health_and_version_endpoints_answer() {
    let app = build_router(state_with_workflow("http://127.0.0.1:9/"));

    let health = app
        .clone()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(health.status(), StatusCode::OK);

    let version = app
        .clone()
        .oneshot(Request::builder().uri("/v1/version").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let body = body_json(version).await;
    assert_eq!(body["name"], "verdant-server");

    let metrics = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(metrics.status(), StatusCode::OK);
    let text = body_text(metrics).await;
    assert!(text.contains("verdant_requests_total"));
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = build_router(state_with_workflow("http://127.0.0.1:9/"));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .header("x-request-id", "req-fixed")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-fixed")
    );
}
