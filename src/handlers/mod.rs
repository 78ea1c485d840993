pub mod admin;
pub mod client;
pub mod consent;
pub mod content;
pub mod payment;
pub mod subscription;
pub mod support;
pub mod user;

pub use admin::admin_config;
pub use client::client_config;
pub use consent::consent_config;
pub use content::content_config;
pub use payment::payment_config;
pub use subscription::subscription_config;
pub use support::support_config;
pub use user::user_config;

use crate::error::AppError;
use actix_web::{ResponseError, error::InternalError, web};

/// Malformed JSON bodies get the same error envelope as any other
/// validation failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let app_err = AppError::ValidationError(format!("Invalid JSON body: {err}"));
        let resp = app_err.error_response();
        InternalError::from_response(err, resp).into()
    })
}

/// Everything served under `/api/v1`.
pub fn api_v1_config(cfg: &mut web::ServiceConfig) {
    cfg.configure(user_config)
        .configure(consent_config)
        .configure(subscription_config)
        .configure(payment_config)
        .configure(support_config)
        .configure(content_config)
        .configure(client_config)
        .configure(admin_config);
}
