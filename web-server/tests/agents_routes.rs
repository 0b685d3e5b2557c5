// tests/agents_routes.rs
mod support;

use actix_web::http::{header, StatusCode};
use actix_web::{test, App};
use common::UpstreamResult;
use reqwest::Method;
use serde_json::{json, Value};
use support::*;
use web_server::error::GatewayError;

fn authed_get(uri: &str, token: &str) -> test::TestRequest {
    test::TestRequest::get().uri(uri).cookie(access_cookie(token))
}

fn upload_request(file_name: &str, contents: &[u8]) -> test::TestRequest {
    let (content_type, body) = multipart_file(file_name, contents);
    test::TestRequest::post()
        .uri("/agent/upload")
        .cookie(access_cookie(&valid_token()))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
}

#[actix_web::test]
async fn test_filter_without_params_skips_upstream() {
    let dir = tempfile::tempdir().unwrap();
    let token = valid_token();
    let upstream = FakeUpstream::ok();
    let gateway = gateway(&test_config(dir.path()), upstream.clone());
    let app = test::init_service(App::new().configure(|cfg| gateway.configure(cfg))).await;

    let resp = test::call_service(&app, authed_get("/agent/agents", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({
            "status": 200,
            "message": "No filters provided, returning empty dataset.",
            "data": []
        })
    );
    assert!(upstream.calls().is_empty());
}

#[actix_web::test]
async fn test_filter_forwards_only_filled_criteria() {
    let dir = tempfile::tempdir().unwrap();
    let token = valid_token();
    let upstream = FakeUpstream::new(|_| {
        Ok(UpstreamResult::new(200, "Agents found", json!([{ "name": "Kofi" }])))
    });
    let gateway = gateway(&test_config(dir.path()), upstream.clone());
    let app = test::init_service(App::new().configure(|cfg| gateway.configure(cfg))).await;

    let resp = test::call_service(
        &app,
        authed_get(
            "/agent/agents?branch_id=3&dateRange=&fromDate=2024-01-01&unrelated=x",
            &token,
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["statusCode"], 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Filtered results retrieved successfully.");
    assert_eq!(body["data"]["data"], json!([{ "name": "Kofi" }]));
    assert_eq!(body["data"]["message"], "Agents found");

    let calls = upstream.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, Method::GET);
    assert_eq!(calls[0].path, "/upload?branch_id=3&fromDate=2024-01-01");
    assert_eq!(calls[0].token.as_deref(), Some(token.as_str()));
}

#[actix_web::test]
async fn test_filter_with_only_empty_values() {
    let dir = tempfile::tempdir().unwrap();
    let token = valid_token();
    let upstream = FakeUpstream::ok();
    let gateway = gateway(&test_config(dir.path()), upstream.clone());
    let app = test::init_service(App::new().configure(|cfg| gateway.configure(cfg))).await;

    let resp = test::call_service(&app, authed_get("/agent/agents?branch_id=&toDate=", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(upstream.calls()[0].path, "/upload");
}

#[actix_web::test]
async fn test_filter_expired_upstream_token_redirects() {
    let dir = tempfile::tempdir().unwrap();
    let token = valid_token();
    let gateway = gateway(
        &test_config(dir.path()),
        FakeUpstream::failing(401, "Invalid or expired token"),
    );
    let app = test::init_service(App::new().configure(|cfg| gateway.configure(cfg))).await;

    let resp = test::call_service(&app, authed_get("/agent/agents?branch_id=3", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp).as_deref(), Some("/"));
}

#[actix_web::test]
async fn test_filter_upstream_error_is_enveloped() {
    let dir = tempfile::tempdir().unwrap();
    let token = valid_token();
    let gateway = gateway(&test_config(dir.path()), FakeUpstream::failing(502, "Bad gateway"));
    let app = test::init_service(App::new().configure(|cfg| gateway.configure(cfg))).await;

    let resp = test::call_service(&app, authed_get("/agent/agents?branch_id=3", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["statusCode"], 502);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Bad gateway");
}

#[actix_web::test]
async fn test_report_renders_agents() {
    let dir = tempfile::tempdir().unwrap();
    let token = valid_token();
    let upstream = FakeUpstream::new(|_| {
        Ok(UpstreamResult::new(
            200,
            "ok",
            json!([
                { "name": "Kofi <Boateng>", "branch": "Accra" },
                { "name": "Esi", "branch": "Kumasi" }
            ]),
        ))
    });
    let gateway = gateway(&test_config(dir.path()), upstream.clone());
    let app = test::init_service(App::new().configure(|cfg| gateway.configure(cfg))).await;

    let resp = test::call_service(&app, authed_get("/agent/report", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("Kofi &lt;Boateng&gt;"));
    assert!(html.contains("Kumasi"));
    let calls = upstream.calls();
    assert_eq!(calls[0].path, "/upload/agents");
    assert_eq!(calls[0].token.as_deref(), Some(token.as_str()));
}

#[actix_web::test]
async fn test_report_without_data_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let token = valid_token();
    let gateway = gateway(&test_config(dir.path()), FakeUpstream::ok());
    let app = test::init_service(App::new().configure(|cfg| gateway.configure(cfg))).await;

    let resp = test::call_service(&app, authed_get("/agent/report", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("No agents found."));
}

#[actix_web::test]
async fn test_report_expired_upstream_token_redirects() {
    let dir = tempfile::tempdir().unwrap();
    let token = valid_token();
    let gateway = gateway(
        &test_config(dir.path()),
        FakeUpstream::failing(401, "Invalid or expired token"),
    );
    let app = test::init_service(App::new().configure(|cfg| gateway.configure(cfg))).await;

    let resp = test::call_service(&app, authed_get("/agent/report", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp).as_deref(), Some("/"));
}

#[actix_web::test]
async fn test_upload_without_file() {
    let dir = tempfile::tempdir().unwrap();
    let upstream = FakeUpstream::ok();
    let gateway = gateway(&test_config(dir.path()), upstream.clone());
    let app = test::init_service(App::new().configure(|cfg| gateway.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/agent/upload")
        .cookie(access_cookie(&valid_token()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({
            "statusCode": 400,
            "success": false,
            "message": "Excel file is required.",
            "data": null
        })
    );
    assert!(upstream.calls().is_empty());
}

#[actix_web::test]
async fn test_upload_forwards_file_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let upstream = FakeUpstream::new(|_| {
        Ok(UpstreamResult::new(201, "Agents created", json!({ "inserted": 2 })))
    });
    let gateway = gateway(&test_config(dir.path()), upstream.clone());
    let app = test::init_service(App::new().configure(|cfg| gateway.configure(cfg))).await;

    let contents = b"name,branch\nKofi,Accra\nEsi,Kumasi\n";
    let resp = test::call_service(&app, upload_request("agents.csv", contents).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Excel uploaded and agents added successfully.");
    assert_eq!(body["data"], json!({ "inserted": 2 }));

    let calls = upstream.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, Method::POST);
    assert_eq!(calls[0].path, "/upload");
    let file = calls[0].file.as_ref().expect("file forwarded");
    assert_eq!(file.field_name, "file");
    assert_eq!(file.file_name, "agents.csv");
    assert_eq!(file.contents, contents.to_vec());

    assert!(dir_is_empty(dir.path()), "temporary upload left behind");
}

#[actix_web::test]
async fn test_upload_failure_still_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = gateway(
        &test_config(dir.path()),
        FakeUpstream::new(|_| Err(GatewayError::Transport("connection refused".into()))),
    );
    let app = test::init_service(App::new().configure(|cfg| gateway.configure(cfg))).await;

    let resp = test::call_service(&app, upload_request("agents.xlsx", b"PK\x03\x04").to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "API request failed: connection refused");
    assert!(dir_is_empty(dir.path()));
}

#[actix_web::test]
async fn test_upload_rejects_other_extensions() {
    let dir = tempfile::tempdir().unwrap();
    let upstream = FakeUpstream::ok();
    let gateway = gateway(&test_config(dir.path()), upstream.clone());
    let app = test::init_service(App::new().configure(|cfg| gateway.configure(cfg))).await;

    let resp = test::call_service(&app, upload_request("agents.pdf", b"%PDF-1.4").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["message"],
        "Only Excel or CSV files (.xlsx, .xls, .csv) are allowed."
    );
    assert!(upstream.calls().is_empty());
}

#[actix_web::test]
async fn test_upload_over_limit() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.uploads.max_bytes = 16;
    let upstream = FakeUpstream::ok();
    let gateway = gateway(&config, upstream.clone());
    let app = test::init_service(App::new().configure(|cfg| gateway.configure(cfg))).await;

    let resp = test::call_service(&app, upload_request("agents.csv", &[b'x'; 64]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(upstream.calls().is_empty());
    assert!(dir_is_empty(dir.path()));
}

#[actix_web::test]
async fn test_debug_endpoints_follow_flag() {
    let dir = tempfile::tempdir().unwrap();

    let gateway_off = gateway(&test_config(dir.path()), FakeUpstream::ok());
    let app = test::init_service(App::new().configure(|cfg| gateway_off.configure(cfg))).await;
    let resp = test::call_service(&app, test::TestRequest::get().uri("/cookie-data").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let mut config = test_config(dir.path());
    config.expose_debug_endpoints = true;
    let gateway_on = gateway(&config, FakeUpstream::ok());
    let app = test::init_service(App::new().configure(|cfg| gateway_on.configure(cfg))).await;

    let req = test::TestRequest::get()
        .uri("/cookie-data")
        .cookie(access_cookie("abc"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "accessToken": "abc" }));

    let req = test::TestRequest::get().uri("/session-data").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({}));
}
