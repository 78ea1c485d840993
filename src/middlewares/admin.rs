use crate::config::AdminConfig;
use crate::error::AppError;
use actix_web::http::Method;
use actix_web::{
    Error, web,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Guards the admin scope with the shared token from `AdminConfig`, read
/// from app data. Without a configured token every request is refused.
pub struct AdminGuard;

impl<S, B> Transform<S, ServiceRequest> for AdminGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminGuardService { service }))
    }
}

pub struct AdminGuardService<S> {
    service: S,
}

/// Compares every byte whatever the first mismatch; only the length leaks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn check_token(req: &ServiceRequest) -> Result<(), AppError> {
    let expected = req
        .app_data::<web::Data<AdminConfig>>()
        .filter(|config| config.is_enabled())
        .map(|config| config.api_token.clone())
        .ok_or(AppError::Forbidden)?;

    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::AuthError("Missing admin token".to_string()))?;

    if !constant_time_eq(provided.as_bytes(), expected.as_bytes()) {
        return Err(AppError::AuthError("Invalid admin token".to_string()));
    }
    Ok(())
}

impl<S, B> Service<ServiceRequest> for AdminGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS preflight carries no custom headers
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        match check_token(&req) {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(error) => Box::pin(async move { Err(error.into()) }),
        }
    }
}
