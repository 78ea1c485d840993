use crate::models::*;
use crate::services::SubscriptionService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/subscription-plans/",
    tag = "subscription",
    responses(
        (status = 200, description = "All plans", body = [SubscriptionPlanResponse])
    )
)]
pub async fn list_plans(
    subscription_service: web::Data<SubscriptionService>,
) -> Result<HttpResponse> {
    match subscription_service.list_plans().await {
        Ok(plans) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": plans
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/subscribe/{telegram_id}/",
    tag = "subscription",
    params(("telegram_id" = String, Path, description = "Telegram user id")),
    request_body = SubscribeRequest,
    responses(
        (status = 201, description = "Subscription created", body = UserSubscriptionResponse),
        (status = 400, description = "Missing plan_id"),
        (status = 404, description = "User or plan not found")
    )
)]
pub async fn subscribe(
    subscription_service: web::Data<SubscriptionService>,
    path: web::Path<String>,
    request: web::Json<SubscribeRequest>,
) -> Result<HttpResponse> {
    match subscription_service
        .subscribe(&path.into_inner(), request.into_inner())
        .await
    {
        Ok(sub) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": sub
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/gift-subscription/{telegram_id}/",
    tag = "subscription",
    params(("telegram_id" = String, Path, description = "Telegram id of the sender")),
    request_body = GiftSubscriptionRequest,
    responses(
        (status = 201, description = "Gift recorded and granted", body = GiftSubscriptionResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Sender, recipient or plan not found"),
        (status = 500, description = "Write failed")
    )
)]
pub async fn gift_subscription(
    subscription_service: web::Data<SubscriptionService>,
    path: web::Path<String>,
    request: web::Json<GiftSubscriptionRequest>,
) -> Result<HttpResponse> {
    match subscription_service
        .gift(&path.into_inner(), request.into_inner())
        .await
    {
        Ok(gift) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": gift
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscription-status/{telegram_id}/",
    tag = "subscription",
    params(("telegram_id" = String, Path, description = "Telegram user id")),
    responses(
        (status = 200, description = "Current subscription or a not-subscribed message", body = SubscriptionStatusResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn subscription_status(
    subscription_service: web::Data<SubscriptionService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match subscription_service.status(&path.into_inner()).await {
        Ok(status) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": status
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/subscription-plans/", web::get().to(list_plans))
        .route("/subscribe/{telegram_id}/", web::post().to(subscribe))
        .route(
            "/gift-subscription/{telegram_id}/",
            web::post().to(gift_subscription),
        )
        .route(
            "/subscription-status/{telegram_id}/",
            web::get().to(subscription_status),
        );
}
