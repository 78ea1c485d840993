pub use sea_orm_migration::prelude::*;

mod m20241015_000001_create_users;
mod m20241015_000002_create_subscriptions;
mod m20241015_000003_create_payments;
mod m20241016_000001_create_support;
mod m20241016_000002_create_content;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241015_000001_create_users::Migration),
            Box::new(m20241015_000002_create_subscriptions::Migration),
            Box::new(m20241015_000003_create_payments::Migration),
            Box::new(m20241016_000001_create_support::Migration),
            Box::new(m20241016_000002_create_content::Migration),
        ]
    }
}
