use crate::models::*;
use crate::services::PaymentService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/payment-methods/",
    tag = "payment",
    responses(
        (status = 200, description = "All payment methods", body = [PaymentMethodResponse])
    )
)]
pub async fn list_methods(payment_service: web::Data<PaymentService>) -> Result<HttpResponse> {
    match payment_service.list_methods().await {
        Ok(methods) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": methods
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/make-payment/{telegram_id}/",
    tag = "payment",
    params(("telegram_id" = String, Path, description = "Telegram user id")),
    request_body = MakePaymentRequest,
    responses(
        (status = 201, description = "Payment recorded as pending", body = PaymentResponse),
        (status = 400, description = "Invalid amount or transaction id"),
        (status = 404, description = "User, method or plan not found"),
        (status = 409, description = "Duplicate transaction id")
    )
)]
pub async fn make_payment(
    payment_service: web::Data<PaymentService>,
    path: web::Path<String>,
    request: web::Json<MakePaymentRequest>,
) -> Result<HttpResponse> {
    match payment_service
        .submit(&path.into_inner(), request.into_inner())
        .await
    {
        Ok(payment) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": payment
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/payment-status/{transaction_id}/",
    tag = "payment",
    params(("transaction_id" = String, Path, description = "External transaction id")),
    responses(
        (status = 200, description = "Payment found", body = PaymentResponse),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn payment_status(
    payment_service: web::Data<PaymentService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match payment_service.status(&path.into_inner()).await {
        Ok(payment) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": payment
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn payment_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/payment-methods/", web::get().to(list_methods))
        .route("/make-payment/{telegram_id}/", web::post().to(make_payment))
        .route(
            "/payment-status/{transaction_id}/",
            web::get().to(payment_status),
        );
}
