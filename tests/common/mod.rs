#![allow(dead_code)]

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use wellness_backend::database::run_migrations;
use wellness_backend::entities::{
    MaterialType, advice_entity, material_entity, method_entity, payment_method_entity,
    subscription_plan_entity, user_entity,
};
use wellness_backend::services::UserService;

/// Fresh in-memory database with the production schema. A single
/// connection keeps every query on the same SQLite memory database.
pub async fn setup_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_string());
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.expect("connect sqlite");
    run_migrations(&db).await.expect("run migrations");
    db
}

pub async fn create_user(
    db: &DatabaseConnection,
    telegram_id: &str,
    username: &str,
) -> user_entity::Model {
    let (user, created) = UserService::new(db.clone())
        .get_or_create(telegram_id, Some(username))
        .await
        .expect("create user");
    assert!(created);
    user
}

pub async fn create_plan(
    db: &DatabaseConnection,
    name: &str,
    price: Decimal,
    duration_days: i32,
) -> subscription_plan_entity::Model {
    subscription_plan_entity::ActiveModel {
        name: Set(name.to_string()),
        description: Set(format!("{name} plan")),
        price: Set(price),
        duration_days: Set(duration_days),
        renewable: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert plan")
}

pub async fn create_payment_method(
    db: &DatabaseConnection,
    name: &str,
) -> payment_method_entity::Model {
    payment_method_entity::ActiveModel {
        name: Set(name.to_string()),
        description: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert payment method")
}

pub async fn create_material(
    db: &DatabaseConnection,
    title: &str,
    material_type: MaterialType,
    document: &str,
) -> material_entity::Model {
    material_entity::ActiveModel {
        title: Set(title.to_string()),
        document: Set(document.to_string()),
        material_type: Set(material_type),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert material")
}

pub async fn create_advice(
    db: &DatabaseConnection,
    title: &str,
    content: &str,
) -> advice_entity::Model {
    advice_entity::ActiveModel {
        title: Set(title.to_string()),
        content: Set(content.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert advice")
}

pub async fn create_method(db: &DatabaseConnection, name: &str) -> method_entity::Model {
    method_entity::ActiveModel {
        name: Set(name.to_string()),
        description: Set(format!("About {name}")),
        details: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert method")
}

pub fn dec(s: &str) -> Decimal {
    s.parse().expect("decimal literal")
}
