use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum SubscriptionPlans {
    Table,
    Id,
    Name,
    Description,
    Price,
    DurationDays,
    Renewable,
}

#[derive(DeriveIden)]
enum UserSubscriptions {
    Table,
    Id,
    UserId,
    PlanId,
    StartDate,
    EndDate,
}

#[derive(DeriveIden)]
enum GiftedSubscriptions {
    Table,
    Id,
    SenderId,
    RecipientId,
    PlanId,
    TransactionId,
    GiftedOn,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SubscriptionPlans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubscriptionPlans::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::Name)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::Description)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::Price)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::DurationDays)
                            .integer()
                            .not_null()
                            .check(Expr::col(SubscriptionPlans::DurationDays).gt(0)),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::Renewable)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserSubscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserSubscriptions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserSubscriptions::UserId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserSubscriptions::PlanId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserSubscriptions::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserSubscriptions::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_subscriptions_user")
                            .from(UserSubscriptions::Table, UserSubscriptions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_subscriptions_plan")
                            .from(UserSubscriptions::Table, UserSubscriptions::PlanId)
                            .to(SubscriptionPlans::Table, SubscriptionPlans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // "current subscription" lookups scan a user's rows by end date
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_subscriptions_user_end")
                    .table(UserSubscriptions::Table)
                    .col(UserSubscriptions::UserId)
                    .col(UserSubscriptions::EndDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GiftedSubscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GiftedSubscriptions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GiftedSubscriptions::SenderId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GiftedSubscriptions::RecipientId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GiftedSubscriptions::PlanId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GiftedSubscriptions::TransactionId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GiftedSubscriptions::GiftedOn)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gifted_subscriptions_sender")
                            .from(GiftedSubscriptions::Table, GiftedSubscriptions::SenderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gifted_subscriptions_recipient")
                            .from(
                                GiftedSubscriptions::Table,
                                GiftedSubscriptions::RecipientId,
                            )
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gifted_subscriptions_plan")
                            .from(GiftedSubscriptions::Table, GiftedSubscriptions::PlanId)
                            .to(SubscriptionPlans::Table, SubscriptionPlans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(GiftedSubscriptions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(UserSubscriptions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(SubscriptionPlans::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
