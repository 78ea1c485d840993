use crate::models::*;
use crate::services::ContentService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/advice/",
    tag = "content",
    responses(
        (status = 200, description = "Advice articles", body = AdviceListResponse)
    )
)]
pub async fn list_advice(content_service: web::Data<ContentService>) -> Result<HttpResponse> {
    match content_service.advice().await {
        Ok(advice) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": advice
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/methods/",
    tag = "content",
    responses(
        (status = 200, description = "Method catalog", body = [MethodResponse])
    )
)]
pub async fn list_methods(content_service: web::Data<ContentService>) -> Result<HttpResponse> {
    match content_service.methods().await {
        Ok(methods) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": methods
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/methods/{id}/",
    tag = "content",
    params(("id" = i32, Path, description = "Method id")),
    responses(
        (status = 200, description = "Method details", body = MethodResponse),
        (status = 404, description = "Method not found")
    )
)]
pub async fn get_method(
    content_service: web::Data<ContentService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match content_service.method(path.into_inner()).await {
        Ok(method) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": method
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/materials/",
    tag = "content",
    params(MaterialQuery),
    responses(
        (status = 200, description = "Materials, optionally filtered by type", body = [MaterialResponse]),
        (status = 400, description = "Unknown material type")
    )
)]
pub async fn list_materials(
    content_service: web::Data<ContentService>,
    query: web::Query<MaterialQuery>,
) -> Result<HttpResponse> {
    match content_service
        .materials(query.material_type.as_deref())
        .await
    {
        Ok(materials) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": materials
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/materials/{material_type}/",
    tag = "content",
    params(("material_type" = String, Path, description = "`methodichka` or `workbook`")),
    responses(
        (status = 200, description = "First material of the type", body = MaterialResponse),
        (status = 404, description = "No material of that type")
    )
)]
pub async fn get_material(
    content_service: web::Data<ContentService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match content_service.material_by_type(&path.into_inner()).await {
        Ok(material) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": material
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn content_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/advice/", web::get().to(list_advice))
        .route("/methods/", web::get().to(list_methods))
        .route("/methods/{id}/", web::get().to(get_method))
        .route("/materials/", web::get().to(list_materials))
        .route("/materials/{material_type}/", web::get().to(get_material));
}
