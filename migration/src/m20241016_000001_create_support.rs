use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum SupportSessions {
    Table,
    Id,
    UserId,
    IsActive,
    StartedAt,
    EndedAt,
}

#[derive(DeriveIden)]
enum SupportMessages {
    Table,
    Id,
    SessionId,
    Sender,
    MessageText,
    Timestamp,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SupportSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SupportSessions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SupportSessions::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(SupportSessions::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SupportSessions::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SupportSessions::EndedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_support_sessions_user")
                            .from(SupportSessions::Table, SupportSessions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // at most one active session per user; both Postgres and SQLite
        // accept partial indexes in this form
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_support_sessions_active_user \
                 ON support_sessions (user_id) WHERE is_active",
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SupportMessages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SupportMessages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SupportMessages::SessionId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SupportMessages::Sender)
                            .string_len(250)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SupportMessages::MessageText)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SupportMessages::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_support_messages_session")
                            .from(SupportMessages::Table, SupportMessages::SessionId)
                            .to(SupportSessions::Table, SupportSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_support_messages_session_ts")
                    .table(SupportMessages::Table)
                    .col(SupportMessages::SessionId)
                    .col(SupportMessages::Timestamp)
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
                    .table(SupportMessages::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(SupportSessions::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
