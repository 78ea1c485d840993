use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Advice {
    Table,
    Id,
    Title,
    Content,
}

#[derive(DeriveIden)]
enum Methods {
    Table,
    Id,
    Name,
    Description,
    Details,
}

#[derive(DeriveIden)]
enum Materials {
    Table,
    Id,
    Title,
    Document,
    MaterialType,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Advice::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Advice::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Advice::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Advice::Content).text().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Methods::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Methods::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Methods::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Methods::Description).text().not_null())
                    .col(ColumnDef::new(Methods::Details).text().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Materials::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Materials::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Materials::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Materials::Document).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Materials::MaterialType)
                            .string_len(20)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_materials_type")
                    .table(Materials::Table)
                    .col(Materials::MaterialType)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Materials::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Methods::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Advice::Table).to_owned())
            .await?;
        Ok(())
    }
}
