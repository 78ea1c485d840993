use crate::models::*;
use crate::services::SupportService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/support/start-session/{telegram_id}/",
    tag = "support",
    params(("telegram_id" = String, Path, description = "Telegram user id; unknown ids are registered")),
    responses(
        (status = 200, description = "Active session id", body = StartSessionResponse)
    )
)]
pub async fn start_session(
    support_service: web::Data<SupportService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match support_service.start_session(&path.into_inner()).await {
        Ok(session) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": session
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/support/send-message/",
    tag = "support",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message appended", body = SupportMessageResponse),
        (status = 400, description = "Missing fields"),
        (status = 404, description = "Session missing or inactive")
    )
)]
pub async fn send_message(
    support_service: web::Data<SupportService>,
    request: web::Json<SendMessageRequest>,
) -> Result<HttpResponse> {
    match support_service.post_message(request.into_inner()).await {
        Ok(message) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": message,
            "message": "Message sent"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/support/get-messages/{session_id}/",
    tag = "support",
    params(("session_id" = i32, Path, description = "Support session id")),
    responses(
        (status = 200, description = "Transcript ordered by time", body = SupportMessagesResponse),
        (status = 404, description = "Session not found")
    )
)]
pub async fn get_messages(
    support_service: web::Data<SupportService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match support_service.list_messages(path.into_inner()).await {
        Ok(messages) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": messages
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn support_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/support")
            .route("/start-session/{telegram_id}/", web::post().to(start_session))
            .route("/send-message/", web::post().to(send_message))
            .route("/get-messages/{session_id}/", web::get().to(get_messages)),
    );
}
