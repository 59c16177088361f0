use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Employee {
    #[sea_orm(iden = "Employee")]
    Table,
    Id,
    Name,
    Email,
    Department,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employee::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Employee::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Employee::Name).text().not_null())
                    .col(ColumnDef::new(Employee::Email).text().not_null())
                    .col(ColumnDef::new(Employee::Department).text().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(Employee::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}
