use crate::middlewares::AdminGuard;
use crate::models::*;
use crate::services::PaymentService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/admin/payments/{transaction_id}/status/",
    tag = "admin",
    params(("transaction_id" = String, Path, description = "External transaction id")),
    request_body = UpdatePaymentStatusRequest,
    security(
        ("admin_token" = [])
    ),
    responses(
        (status = 200, description = "Status changed", body = PaymentResponse),
        (status = 400, description = "Transition not allowed"),
        (status = 401, description = "Missing or wrong admin token"),
        (status = 403, description = "Admin surface disabled"),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Balance too low to reverse a failed top-up")
    )
)]
pub async fn update_payment_status(
    payment_service: web::Data<PaymentService>,
    path: web::Path<String>,
    request: web::Json<UpdatePaymentStatusRequest>,
) -> Result<HttpResponse> {
    match payment_service
        .update_status(&path.into_inner(), request.status)
        .await
    {
        Ok(payment) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": payment
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(AdminGuard)
            .route(
                "/payments/{transaction_id}/status/",
                web::post().to(update_payment_status),
            ),
    );
}
