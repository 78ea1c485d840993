use crate::models::*;
use crate::services::UserService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/register/",
    tag = "user",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = RegisterResponse),
        (status = 200, description = "User already registered", body = RegisterResponse),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn register(
    user_service: web::Data<UserService>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    match user_service.register(request.into_inner()).await {
        Ok(resp) => {
            let mut builder = if resp.created {
                HttpResponse::Created()
            } else {
                HttpResponse::Ok()
            };
            Ok(builder.json(json!({
                "success": true,
                "data": resp
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/profile/{telegram_id}/",
    tag = "user",
    params(("telegram_id" = String, Path, description = "Telegram user id")),
    responses(
        (status = 200, description = "Account overview", body = ProfileResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_profile(
    user_service: web::Data<UserService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match user_service.profile(&path.into_inner()).await {
        Ok(profile) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": profile
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/statistics/{telegram_id}/",
    tag = "user",
    params(("telegram_id" = String, Path, description = "Telegram user id")),
    responses(
        (status = 200, description = "Subscription and payment counters", body = StatisticsResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_statistics(
    user_service: web::Data<UserService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match user_service.statistics(&path.into_inner()).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/add-card/{telegram_id}/",
    tag = "user",
    params(("telegram_id" = String, Path, description = "Telegram user id")),
    request_body = AddCardRequest,
    responses(
        (status = 201, description = "Card stored (masked)", body = UserCardResponse),
        (status = 400, description = "Invalid card data"),
        (status = 404, description = "User not found")
    )
)]
pub async fn add_card(
    user_service: web::Data<UserService>,
    path: web::Path<String>,
    request: web::Json<AddCardRequest>,
) -> Result<HttpResponse> {
    match user_service
        .add_card(&path.into_inner(), request.into_inner())
        .await
    {
        Ok(card) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": card,
            "message": "Card added successfully"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/register/", web::post().to(register))
        .route("/profile/{telegram_id}/", web::get().to(get_profile))
        .route("/statistics/{telegram_id}/", web::get().to(get_statistics))
        .route("/add-card/{telegram_id}/", web::post().to(add_card));
}
