use crate::models::*;
use crate::services::ClientService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/client-cards/{telegram_id}/",
    tag = "client",
    params(("telegram_id" = String, Path, description = "Telegram user id")),
    responses(
        (status = 200, description = "Most recent client card", body = ClientCardResponse),
        (status = 404, description = "User or card not found")
    )
)]
pub async fn get_client_card(
    client_service: web::Data<ClientService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match client_service.latest_card(&path.into_inner()).await {
        Ok(card) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": card
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/client-cards/{telegram_id}/",
    tag = "client",
    params(("telegram_id" = String, Path, description = "Telegram user id")),
    request_body = ClientCardRequest,
    responses(
        (status = 201, description = "Client card created", body = ClientCardResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "User not found")
    )
)]
pub async fn create_client_card(
    client_service: web::Data<ClientService>,
    path: web::Path<String>,
    request: web::Json<ClientCardRequest>,
) -> Result<HttpResponse> {
    match client_service
        .create_card(&path.into_inner(), request.into_inner())
        .await
    {
        Ok(card) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": card
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/sessions/{telegram_id}/",
    tag = "client",
    params(("telegram_id" = String, Path, description = "Telegram user id")),
    request_body = ChatSessionRequest,
    responses(
        (status = 201, description = "Chat history stored", body = ChatSessionResponse),
        (status = 400, description = "chat_history missing"),
        (status = 404, description = "User not found")
    )
)]
pub async fn save_chat_session(
    client_service: web::Data<ClientService>,
    path: web::Path<String>,
    request: web::Json<ChatSessionRequest>,
) -> Result<HttpResponse> {
    match client_service
        .save_chat_session(&path.into_inner(), request.into_inner())
        .await
    {
        Ok(resp) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": resp
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/feedback/",
    tag = "client",
    request_body = FeedbackRequest,
    responses(
        (status = 201, description = "Feedback stored", body = FeedbackResponse),
        (status = 400, description = "Empty feedback")
    )
)]
pub async fn submit_feedback(
    client_service: web::Data<ClientService>,
    request: web::Json<FeedbackRequest>,
) -> Result<HttpResponse> {
    match client_service.submit_feedback(request.into_inner()).await {
        Ok(feedback) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": feedback,
            "message": "Thank you for your feedback"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn client_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/client-cards/{telegram_id}/")
            .route(web::get().to(get_client_card))
            .route(web::post().to(create_client_card)),
    )
    .route("/sessions/{telegram_id}/", web::post().to(save_chat_session))
    .route("/feedback/", web::post().to(submit_feedback));
}
