//! HTTP contract of the phone verification endpoints

mod common;

use actix_web::{http::header, http::StatusCode, test};
use chrono::Duration;
use serde_json::{json, Value};

use common::{context, context_with, test_config, wrong_code, PHONE};
use pv_api::app::create_app;
use pv_core::domain::{OwnerId, PhoneNumber};
use pv_core::repositories::UserDirectory;
use pv_infra::InMemoryUserDirectory;

fn send(phone: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/phone/send-code")
        .set_json(json!({ "phone_number": phone }))
}

fn resend(phone: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/phone/resend-code")
        .set_json(json!({ "phone_number": phone }))
}

fn verify(phone: &str, code: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/phone/verify-code")
        .set_json(json!({ "phone_number": phone, "code": code }))
}

#[actix_web::test]
async fn send_code_returns_policy_without_code() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let resp = test::call_service(&app, send(PHONE).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["expires_in"], 300);
    assert_eq!(body["resend_after"], 30);
    assert!(body.get("code").is_none());

    let sent = ctx.channel.last_message().unwrap();
    assert_eq!(sent.to, PHONE);
    assert_eq!(ctx.channel.message_count(), 1);
}

#[actix_web::test]
async fn send_code_over_whatsapp_prefixes_destination() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/phone/send-code")
        .set_json(json!({ "phone_number": PHONE, "channel": "whatsapp" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(ctx.channel.last_message().unwrap().to, "whatsapp:+15551234567");
}

#[actix_web::test]
async fn send_code_rejects_bad_input() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let resp = test::call_service(&app, send("not-a-number").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_phone_format");

    let req = test::TestRequest::post()
        .uri("/api/v1/phone/send-code")
        .set_json(json!({ "phone_number": PHONE, "channel": "fax" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");

    let req = test::TestRequest::post()
        .uri("/api/v1/phone/send-code")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"phone_number\":")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");

    assert_eq!(ctx.channel.message_count(), 0);
}

#[actix_web::test]
async fn delivered_code_verifies_once() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    test::call_service(&app, send(PHONE).to_request()).await;
    let code = ctx.channel.last_code().unwrap();

    let resp = test::call_service(&app, verify(PHONE, &code).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["verified"], true);
    assert_eq!(body["phone_number"], PHONE);

    let resp = test::call_service(&app, verify(PHONE, &code).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "code_not_found");
}

#[actix_web::test]
async fn three_wrong_guesses_exhaust_the_code() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    test::call_service(&app, send(PHONE).to_request()).await;
    let code = ctx.channel.last_code().unwrap();
    let wrong = wrong_code(&code);

    for remaining in [2, 1] {
        let resp = test::call_service(&app, verify(PHONE, wrong).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "incorrect_code");
        assert_eq!(body["details"]["remaining_attempts"], remaining);
    }

    let resp = test::call_service(&app, verify(PHONE, wrong).to_request()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "attempts_exhausted");

    let resp = test::call_service(&app, verify(PHONE, &code).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn expired_code_is_gone() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    test::call_service(&app, send(PHONE).to_request()).await;
    let code = ctx.channel.last_code().unwrap();
    ctx.clock.advance(Duration::seconds(300));

    let resp = test::call_service(&app, verify(PHONE, &code).to_request()).await;
    assert_eq!(resp.status(), StatusCode::GONE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "code_expired");
}

#[actix_web::test]
async fn resend_is_throttled_inside_cooldown() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    test::call_service(&app, send(PHONE).to_request()).await;
    let first_code = ctx.channel.last_code().unwrap();
    ctx.clock.advance(Duration::seconds(10));

    let resp = test::call_service(&app, resend(PHONE).to_request()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(resp.headers().get(header::RETRY_AFTER).unwrap(), "20");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "resend_throttled");
    assert_eq!(body["details"]["wait_seconds"], 20);
    assert_eq!(ctx.channel.message_count(), 1);

    ctx.clock.advance(Duration::seconds(20));
    let resp = test::call_service(&app, resend(PHONE).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Verification code resent successfully");

    let second_code = ctx.channel.last_code().unwrap();
    if second_code != first_code {
        let resp = test::call_service(&app, verify(PHONE, &first_code).to_request()).await;
        assert_ne!(resp.status(), StatusCode::OK);
    }
    let resp = test::call_service(&app, verify(PHONE, &second_code).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn number_owned_by_another_account_is_refused() {
    let phone = PhoneNumber::parse(PHONE).unwrap();
    let directory = InMemoryUserDirectory::with_binding(phone, OwnerId::from("alice"));
    let ctx = context_with(test_config(), directory);
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = send(PHONE).insert_header(("X-User-Id", "bob")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "phone_already_registered");

    let resp = test::call_service(&app, send(PHONE).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = send(PHONE).insert_header(("X-User-Id", "alice")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn verification_binds_number_to_caller() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = send(PHONE).insert_header(("X-User-Id", "carol")).to_request();
    test::call_service(&app, req).await;
    let code = ctx.channel.last_code().unwrap();

    let resp = test::call_service(&app, verify(PHONE, &code).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let phone = PhoneNumber::parse(PHONE).unwrap();
    let owner = ctx.directory.lookup_verified_owner(&phone).await.unwrap();
    assert_eq!(owner, Some(OwnerId::from("carol")));
}

#[actix_web::test]
async fn delivery_failure_is_service_unavailable() {
    let ctx = context();
    ctx.channel.set_simulate_failure(true);
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let resp = test::call_service(&app, send(PHONE).to_request()).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "delivery_failed");
}
