use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    TelegramId,
    Username,
    Balance,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Consents {
    Table,
    Id,
    UserId,
    ConsentGiven,
    ConsentDate,
}

#[derive(DeriveIden)]
enum UserCards {
    Table,
    Id,
    UserId,
    MaskedNumber,
    CardExpiry,
    CardholderName,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ClientCards {
    Table,
    Id,
    UserId,
    Name,
    Age,
    Goals,
    Challenges,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ChatSessions {
    Table,
    Id,
    UserId,
    ChatHistory,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Feedback {
    Table,
    Id,
    Content,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

fn user_fk(
    name: &str,
    from: impl IntoIden + 'static,
    col: impl IntoIden + 'static,
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(from, col)
        .to(Users::Table, Users::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::TelegramId)
                            .string_len(200)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string_len(200)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Users::Balance)
                            .decimal_len(10, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_username")
                    .table(Users::Table)
                    .col(Users::Username)
                    .to_owned(),
            )
            .await?;

        // one consent row per user; writes go through an upsert on this key
        manager
            .create_table(
                Table::create()
                    .table(Consents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Consents::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Consents::UserId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Consents::ConsentGiven)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Consents::ConsentDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(&mut user_fk(
                        "fk_consents_user",
                        Consents::Table,
                        Consents::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserCards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserCards::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserCards::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(UserCards::MaskedNumber)
                            .string_len(19)
                            .not_null(),
                    )
                    .col(ColumnDef::new(UserCards::CardExpiry).string_len(5).not_null())
                    .col(
                        ColumnDef::new(UserCards::CardholderName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserCards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut user_fk(
                        "fk_user_cards_user",
                        UserCards::Table,
                        UserCards::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClientCards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClientCards::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClientCards::UserId).integer().not_null())
                    .col(ColumnDef::new(ClientCards::Name).string_len(100).not_null())
                    .col(ColumnDef::new(ClientCards::Age).integer().not_null())
                    .col(ColumnDef::new(ClientCards::Goals).text().not_null())
                    .col(ColumnDef::new(ClientCards::Challenges).text().not_null())
                    .col(
                        ColumnDef::new(ClientCards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut user_fk(
                        "fk_client_cards_user",
                        ClientCards::Table,
                        ClientCards::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_client_cards_user")
                    .table(ClientCards::Table)
                    .col(ClientCards::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ChatSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChatSessions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChatSessions::UserId).integer().not_null())
                    .col(ColumnDef::new(ChatSessions::ChatHistory).json().not_null())
                    .col(
                        ColumnDef::new(ChatSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut user_fk(
                        "fk_chat_sessions_user",
                        ChatSessions::Table,
                        ChatSessions::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Feedback::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Feedback::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Feedback::Content).text().not_null())
                    .col(
                        ColumnDef::new(Feedback::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Feedback::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(ChatSessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(ClientCards::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(UserCards::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Consents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
