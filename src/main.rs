use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use wellness_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::create_cors,
    services::*,
    swagger::swagger_config,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let user_service = UserService::new(pool.clone());
    let consent_service = ConsentService::new(pool.clone());
    let subscription_service = SubscriptionService::new(pool.clone());
    let payment_service = PaymentService::new(pool.clone());
    let support_service = SupportService::new(pool.clone());
    let content_service = ContentService::new(pool.clone(), &config.media);
    let client_service = ClientService::new(pool.clone());
    let admin_config = config.admin.clone();

    if !admin_config.is_enabled() {
        log::warn!("Admin API token is not configured; admin endpoints are disabled");
    }

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(handlers::json_config())
            .app_data(web::Data::new(admin_config.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(consent_service.clone()))
            .app_data(web::Data::new(subscription_service.clone()))
            .app_data(web::Data::new(payment_service.clone()))
            .app_data(web::Data::new(support_service.clone()))
            .app_data(web::Data::new(content_service.clone()))
            .app_data(web::Data::new(client_service.clone()))
            .configure(swagger_config)
            .service(web::scope("/api/v1").configure(handlers::api_v1_config))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
