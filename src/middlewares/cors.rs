use crate::middlewares::ADMIN_TOKEN_HEADER;
use actix_cors::Cors;
use actix_web::http::header;

pub fn create_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .allowed_header(ADMIN_TOKEN_HEADER)
        .max_age(3600)
}
