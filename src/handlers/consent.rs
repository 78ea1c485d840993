use crate::models::*;
use crate::services::ConsentService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/consent/{telegram_id}/",
    tag = "consent",
    params(("telegram_id" = String, Path, description = "Telegram user id")),
    responses(
        (status = 200, description = "Stored consent, created as not given when missing", body = ConsentResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_consent(
    consent_service: web::Data<ConsentService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match consent_service.get_or_create(&path.into_inner()).await {
        Ok(consent) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": consent
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/consent/{telegram_id}/",
    tag = "consent",
    params(("telegram_id" = String, Path, description = "Telegram user id")),
    request_body = SetConsentRequest,
    responses(
        (status = 200, description = "Consent updated", body = ConsentResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn set_consent(
    consent_service: web::Data<ConsentService>,
    path: web::Path<String>,
    request: web::Json<SetConsentRequest>,
) -> Result<HttpResponse> {
    match consent_service
        .set(&path.into_inner(), request.consent_given)
        .await
    {
        Ok(consent) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": consent,
            "message": "Consent updated"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/consent-status/{telegram_id}/",
    tag = "consent",
    params(("telegram_id" = String, Path, description = "Telegram user id")),
    responses(
        (status = 200, description = "Consent snapshot", body = ConsentStatusResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn consent_status(
    consent_service: web::Data<ConsentService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match consent_service.status(&path.into_inner()).await {
        Ok(status) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": status
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn consent_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/consent/{telegram_id}/")
            .route(web::get().to(get_consent))
            .route(web::post().to(set_consent)),
    )
    .route("/consent-status/{telegram_id}/", web::get().to(consent_status));
}
