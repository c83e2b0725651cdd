use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Default API key (regenerate after first login)
pub const DEFAULT_API_KEY: &str = "lexshare_default_api_key_please_regenerate";

/// Email of the seeded demo account
pub const DEFAULT_EMAIL: &str = "demo@lexshare.dev";

/// Hash the default password using Argon2id
fn hash_default_password() -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let password = b"password";
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password, &salt)
        .expect("Failed to hash default password")
        .to_string()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Customers)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Comparisons)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ComparisonFavs)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Prompts)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(PromptFavs)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // One favorite row per (item, customer) pair
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_comparison_favs_unique")
                    .table(ComparisonFavs)
                    .col(crate::entities::comparison_favs::Column::ComparisonId)
                    .col(crate::entities::comparison_favs::Column::CustomerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_prompt_favs_unique")
                    .table(PromptFavs)
                    .col(crate::entities::prompt_favs::Column::PromptId)
                    .col(crate::entities::prompt_favs::Column::CustomerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Seed a demo customer with a hashed password
        let now = chrono::Utc::now().to_rfc3339();
        let password_hash = hash_default_password();

        let insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Customers)
            .columns([
                crate::entities::customers::Column::Email,
                crate::entities::customers::Column::PasswordHash,
                crate::entities::customers::Column::ApiKey,
                crate::entities::customers::Column::CreatedAt,
                crate::entities::customers::Column::UpdatedAt,
            ])
            .values_panic([
                DEFAULT_EMAIL.into(),
                password_hash.into(),
                DEFAULT_API_KEY.into(),
                now.clone().into(),
                now.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PromptFavs).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Prompts).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ComparisonFavs).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comparisons).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers).to_owned())
            .await?;

        Ok(())
    }
}
