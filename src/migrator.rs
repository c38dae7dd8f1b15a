use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_customers_table::Migration),
            Box::new(m20240101_000002_create_accounts_table::Migration),
            Box::new(m20240101_000003_create_transactions_table::Migration),
            Box::new(m20240101_000004_create_favorite_recipients_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_customers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_customers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(
                            ColumnDef::new(Customers::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Customers::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Customers::Country).string().null())
                        .col(ColumnDef::new(Customers::PhoneNumber).string().null())
                        .col(ColumnDef::new(Customers::DateOfBirth).date().null())
                        .col(
                            ColumnDef::new(Customers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Customers::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Customers {
        Table,
        Id,
        Name,
        Email,
        PasswordHash,
        Country,
        PhoneNumber,
        DateOfBirth,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_accounts_table {
    use sea_orm_migration::prelude::*;

    use super::m20240101_000001_create_customers_table::Customers;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_accounts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Accounts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Accounts::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Accounts::AccountNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Accounts::CustomerId).big_integer().not_null())
                        .col(ColumnDef::new(Accounts::AccountType).string_len(32).not_null())
                        .col(ColumnDef::new(Accounts::Currency).string_len(3).not_null())
                        .col(
                            ColumnDef::new(Accounts::Balance)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Accounts::AccountName).string().not_null())
                        .col(ColumnDef::new(Accounts::Description).string().null())
                        .col(
                            ColumnDef::new(Accounts::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Accounts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Accounts::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_accounts_customer")
                                .from(Accounts::Table, Accounts::CustomerId)
                                .to(Customers::Table, Customers::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            // One account per currency per customer, enforced at the schema
            // level in addition to the service check.
            manager
                .create_index(
                    Index::create()
                        .name("idx_accounts_customer_currency")
                        .table(Accounts::Table)
                        .col(Accounts::CustomerId)
                        .col(Accounts::Currency)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Accounts::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Accounts {
        Table,
        Id,
        AccountNumber,
        CustomerId,
        AccountType,
        Currency,
        Balance,
        AccountName,
        Description,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_transactions_table {
    use sea_orm_migration::prelude::*;

    use super::m20240101_000002_create_accounts_table::Accounts;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_transactions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Transactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Transactions::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Transactions::SenderAccountId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Transactions::Currency).string_len(3).not_null())
                        .col(
                            ColumnDef::new(Transactions::AmountTransferred)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Transactions::ReceiverAccountNumber)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Transactions::ReceiverAccountName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Transactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_transactions_sender_account")
                                .from(Transactions::Table, Transactions::SenderAccountId)
                                .to(Accounts::Table, Accounts::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_transactions_sender_account_id")
                        .table(Transactions::Table)
                        .col(Transactions::SenderAccountId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Transactions::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Transactions {
        Table,
        Id,
        SenderAccountId,
        Currency,
        AmountTransferred,
        ReceiverAccountNumber,
        ReceiverAccountName,
        CreatedAt,
    }
}

mod m20240101_000004_create_favorite_recipients_table {
    use sea_orm_migration::prelude::*;

    use super::m20240101_000001_create_customers_table::Customers;
    use super::m20240101_000002_create_accounts_table::Accounts;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_favorite_recipients_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(FavoriteRecipients::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(FavoriteRecipients::CustomerId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FavoriteRecipients::RecipientAccountId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FavoriteRecipients::RecipientName)
                                .string()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(FavoriteRecipients::CustomerId)
                                .col(FavoriteRecipients::RecipientAccountId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_favorite_recipients_customer")
                                .from(FavoriteRecipients::Table, FavoriteRecipients::CustomerId)
                                .to(Customers::Table, Customers::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_favorite_recipients_account")
                                .from(
                                    FavoriteRecipients::Table,
                                    FavoriteRecipients::RecipientAccountId,
                                )
                                .to(Accounts::Table, Accounts::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(FavoriteRecipients::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum FavoriteRecipients {
        Table,
        CustomerId,
        RecipientAccountId,
        RecipientName,
    }
}
