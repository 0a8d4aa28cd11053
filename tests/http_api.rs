mod common;

use actix_web::{
    http::{header, Method, StatusCode},
    test, web, App,
};
use serde_json::{json, Value};
use std::sync::Arc;

use common::*;
use study_buddy_api::config::{Config, PRIMARY_ORIGIN};
use study_buddy_api::handlers::not_found;
use study_buddy_api::middleware::CorsMiddleware;
use study_buddy_api::models::{ApiResponse, SearchHits, SourceKind};
use study_buddy_api::routes::api;
use study_buddy_api::AppState;

macro_rules! init_app {
    ($service:expr) => {{
        let service = $service;
        let policy = service.cors_policy();
        let state = AppState::new(Config::default(), service);
        test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .wrap(CorsMiddleware::new(policy))
                .configure(api::configure)
                .default_service(web::route().to(not_found)),
        )
        .await
    }};
}

fn allow_origin<B>(resp: &actix_web::dev::ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

#[actix_web::test]
async fn preflight_returns_cors_headers_and_empty_body() {
    let app = init_app!(service_with(&Config::default(), vec![], MockInference::new()));

    let req = test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri("/api/ask")
        .insert_header((header::ORIGIN, "https://preview-123.vercel.app"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(allow_origin(&resp), "https://preview-123.vercel.app");
    let methods = resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    assert!(methods.contains("POST"));
    assert!(test::read_body(resp).await.is_empty());
}

#[actix_web::test]
async fn ask_returns_answer_json() {
    let web = provider(
        "web",
        SourceKind::Web,
        5,
        Ok(SearchHits {
            results: web_results(2),
            answer: None,
        }),
    );
    let app = init_app!(service_with(
        &Config::default(),
        vec![Arc::new(web)],
        answering("Rust is memory safe [1].")
    ));

    let req = test::TestRequest::post()
        .uri("/api/ask")
        .insert_header((header::ORIGIN, "https://evil.com"))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload(r#"{"prompt": "Why Rust?"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(allow_origin(&resp), PRIMARY_ORIGIN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["answer"], "Rust is memory safe [1].");
    assert_eq!(body["sources"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn ask_without_question_is_bad_request() {
    let app = init_app!(service_with(&Config::default(), vec![], MockInference::new()));

    let req = test::TestRequest::post()
        .uri("/api/ask")
        .set_payload(r#"{"topic": "nothing"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("prompt"));
}

#[actix_web::test]
async fn invoke_wraps_gateway_envelope() {
    let app = init_app!(service_with(&Config::default(), vec![], answering("hello")));

    let event = json!({
        "httpMethod": "POST",
        "headers": {"Origin": "http://localhost:3000"},
        "body": "{\"query\": \"say hello\"}"
    });
    let req = test::TestRequest::post()
        .uri("/invoke")
        .set_json(&event)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let envelope: ApiResponse = test::read_body_json(resp).await;
    assert_eq!(envelope.status_code, 200);
    assert_eq!(
        envelope.header("Access-Control-Allow-Origin"),
        Some("http://localhost:3000")
    );
    let body: Value = serde_json::from_str(&envelope.body).unwrap();
    assert_eq!(body["answer"], "hello");
}

#[actix_web::test]
async fn invoke_preflight_event() {
    let app = init_app!(service_with(&Config::default(), vec![], MockInference::new()));

    let req = test::TestRequest::post()
        .uri("/invoke")
        .set_json(json!({"requestContext": {"http": {"method": "OPTIONS"}}}))
        .to_request();
    let envelope: ApiResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(envelope.status_code, 200);
    assert_eq!(envelope.body, "");
    assert_eq!(envelope.header("Access-Control-Allow-Origin"), Some(PRIMARY_ORIGIN));
}

#[actix_web::test]
async fn invoke_rejects_non_json_event() {
    let app = init_app!(service_with(&Config::default(), vec![], MockInference::new()));

    let req = test::TestRequest::post()
        .uri("/invoke")
        .set_payload("definitely not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn health_reports_configuration_with_cors() {
    let mut inference = MockInference::new();
    inference.expect_model_id().return_const(MODEL.to_string());
    let news = provider(
        "news",
        SourceKind::News,
        3,
        Ok(SearchHits::empty()),
    );
    let app = init_app!(service_with(&Config::default(), vec![Arc::new(news)], inference));

    let req = test::TestRequest::get()
        .uri("/api/health")
        .insert_header((header::ORIGIN, "http://127.0.0.1:5173"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(allow_origin(&resp), "http://127.0.0.1:5173");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["web_search"], false);
    assert_eq!(body["news_search"], true);
    assert_eq!(body["model"], MODEL);
}

#[actix_web::test]
async fn unknown_route_is_404_with_cors() {
    let app = init_app!(service_with(&Config::default(), vec![], MockInference::new()));

    let req = test::TestRequest::get().uri("/nope").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(allow_origin(&resp), PRIMARY_ORIGIN);
}
