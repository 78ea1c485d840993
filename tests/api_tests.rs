mod common;

use actix_web::{App, ResponseError, http::StatusCode, test, web};
use common::*;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use wellness_backend::config::{AdminConfig, MediaConfig};
use wellness_backend::handlers;
use wellness_backend::middlewares::ADMIN_TOKEN_HEADER;
use wellness_backend::services::*;

const ADMIN_TOKEN: &str = "s3cret";

fn app_config(db: DatabaseConnection, admin_token: &str) -> impl FnOnce(&mut web::ServiceConfig) {
    let admin = AdminConfig {
        api_token: admin_token.to_string(),
    };
    move |cfg| {
        cfg.app_data(handlers::json_config())
            .app_data(web::Data::new(admin))
            .app_data(web::Data::new(UserService::new(db.clone())))
            .app_data(web::Data::new(ConsentService::new(db.clone())))
            .app_data(web::Data::new(SubscriptionService::new(db.clone())))
            .app_data(web::Data::new(PaymentService::new(db.clone())))
            .app_data(web::Data::new(SupportService::new(db.clone())))
            .app_data(web::Data::new(ContentService::new(
                db.clone(),
                &MediaConfig::default(),
            )))
            .app_data(web::Data::new(ClientService::new(db)))
            .service(web::scope("/api/v1").configure(handlers::api_v1_config));
    }
}

#[actix_web::test]
async fn test_register_status_codes_and_envelope() {
    let db = setup_db().await;
    let app = test::init_service(App::new().configure(app_config(db, ADMIN_TOKEN))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/register/")
        .set_json(json!({"telegram_id": 100, "username": "alice"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["created"], true);
    assert_eq!(body["data"]["consent_given"], false);

    let req = test::TestRequest::post()
        .uri("/api/v1/register/")
        .set_json(json!({"telegram_id": "100"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["message"], "User already registered");
}

#[actix_web::test]
async fn test_error_envelope_and_statuses() {
    let db = setup_db().await;
    create_user(&db, "100", "alice").await;
    let app = test::init_service(App::new().configure(app_config(db, ADMIN_TOKEN))).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/profile/999/")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["error"]["message"].is_string());

    let req = test::TestRequest::post()
        .uri("/api/v1/register/")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);

    let req = test::TestRequest::get()
        .uri("/api/v1/consent-status/100/")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["consent_given"], false);
    assert!(body["data"]["consent_date"].is_null());
}

#[actix_web::test]
async fn test_payment_flow_over_http() {
    let db = setup_db().await;
    create_user(&db, "100", "alice").await;
    let method = create_payment_method(&db, "Card").await;
    let app = test::init_service(App::new().configure(app_config(db, ADMIN_TOKEN))).await;

    let payload = json!({
        "payment_method": method.id.to_string(),
        "transaction_id": "tx-http-1",
        "amount": 25.5
    });
    let req = test::TestRequest::post()
        .uri("/api/v1/make-payment/100/")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "pending");

    let req = test::TestRequest::post()
        .uri("/api/v1/make-payment/100/")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get()
        .uri("/api/v1/payment-status/tx-http-1/")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/v1/payment-status/unknown/")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

macro_rules! admin_status {
    ($app:expr, $token:expr) => {{
        let mut req = test::TestRequest::post()
            .uri("/api/v1/admin/payments/tx-admin/status/")
            .set_json(json!({"status": "completed"}));
        let token: Option<&str> = $token;
        if let Some(token) = token {
            req = req.insert_header((ADMIN_TOKEN_HEADER, token));
        }
        match test::try_call_service(&$app, req.to_request()).await {
            Ok(resp) => resp.status(),
            Err(err) => err.as_response_error().status_code(),
        }
    }};
}

#[actix_web::test]
async fn test_admin_guard() {
    let db = setup_db().await;
    create_user(&db, "100", "alice").await;
    let method = create_payment_method(&db, "Card").await;
    PaymentService::new(db.clone())
        .submit(
            "100",
            wellness_backend::models::MakePaymentRequest {
                payment_method: Some(method.id.into()),
                transaction_id: Some("tx-admin".to_string()),
                amount: Some("10".into()),
                subscription_plan: None,
            },
        )
        .await
        .unwrap();
    let app = test::init_service(App::new().configure(app_config(db, ADMIN_TOKEN))).await;

    assert_eq!(admin_status!(app, None), StatusCode::UNAUTHORIZED);
    assert_eq!(admin_status!(app, Some("wrong")), StatusCode::UNAUTHORIZED);
    assert_eq!(admin_status!(app, Some(ADMIN_TOKEN)), StatusCode::OK);
    // completed is final
    assert_eq!(admin_status!(app, Some(ADMIN_TOKEN)), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_admin_disabled_without_token() {
    let db = setup_db().await;
    let app = test::init_service(App::new().configure(app_config(db, ""))).await;
    assert_eq!(admin_status!(app, Some("anything")), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_support_routes() {
    let db = setup_db().await;
    let app = test::init_service(App::new().configure(app_config(db, ADMIN_TOKEN))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/support/start-session/777/")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let session_id = body["data"]["session_id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/support/send-message/")
        .set_json(json!({
            "session_id": session_id.to_string(),
            "sender": "alice",
            "message_text": "help"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/support/get-messages/{session_id}/"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["messages"][0]["message_text"], "help");
}
