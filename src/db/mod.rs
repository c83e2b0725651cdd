use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::entities::{comparisons, prompts};

pub mod migrator;
pub mod repositories;

pub use repositories::SharedOrder;
pub use repositories::comparison::{ComparisonEdit, NewComparison, SharedComparisonRow};
pub use repositories::customer::Customer;
pub use repositories::prompt::{NewPrompt, PromptEdit, SharedPromptRow};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") && !db_url.contains("memory") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn comparison_repo(&self) -> repositories::comparison::ComparisonRepository {
        repositories::comparison::ComparisonRepository::new(self.conn.clone())
    }

    fn prompt_repo(&self) -> repositories::prompt::PromptRepository {
        repositories::prompt::PromptRepository::new(self.conn.clone())
    }

    fn customer_repo(&self) -> repositories::customer::CustomerRepository {
        repositories::customer::CustomerRepository::new(self.conn.clone())
    }

    // ========== Glossaries ==========

    pub async fn list_comparisons(&self, customer_id: i32) -> Result<Vec<comparisons::Model>> {
        self.comparison_repo().list_for_customer(customer_id).await
    }

    pub async fn list_shared_comparisons(
        &self,
        order: Option<SharedOrder>,
    ) -> Result<Vec<SharedComparisonRow>> {
        self.comparison_repo().list_shared(order).await
    }

    pub async fn comparison_fav_ids(&self, customer_id: i32) -> Result<HashSet<i32>> {
        self.comparison_repo()
            .fav_ids_for_customer(customer_id)
            .await
    }

    pub async fn get_comparison(&self, id: i32) -> Result<Option<comparisons::Model>> {
        self.comparison_repo().get(id).await
    }

    pub async fn get_owned_comparison(
        &self,
        id: i32,
        customer_id: i32,
    ) -> Result<Option<comparisons::Model>> {
        self.comparison_repo().get_owned(id, customer_id).await
    }

    pub async fn get_shared_comparison(&self, id: i32) -> Result<Option<comparisons::Model>> {
        self.comparison_repo().get_shared(id).await
    }

    pub async fn create_comparison(&self, new: NewComparison) -> Result<comparisons::Model> {
        self.comparison_repo().create(new).await
    }

    pub async fn edit_comparison(
        &self,
        model: comparisons::Model,
        edit: ComparisonEdit,
    ) -> Result<()> {
        self.comparison_repo().apply_edit(model, edit).await
    }

    pub async fn set_comparison_share(
        &self,
        model: comparisons::Model,
        share_flag: &str,
    ) -> Result<()> {
        self.comparison_repo()
            .set_share_flag(model, share_flag)
            .await
    }

    pub async fn delete_comparison(&self, model: comparisons::Model) -> Result<()> {
        self.comparison_repo().delete(model).await
    }

    pub async fn toggle_comparison_fav(
        &self,
        comparison_id: i32,
        customer_id: i32,
    ) -> Result<bool> {
        self.comparison_repo()
            .toggle_fav(comparison_id, customer_id)
            .await
    }

    // ========== Prompts ==========

    pub async fn list_prompts(&self, customer_id: i32) -> Result<Vec<prompts::Model>> {
        self.prompt_repo().list_for_customer(customer_id).await
    }

    pub async fn list_shared_prompts(
        &self,
        order: Option<SharedOrder>,
    ) -> Result<Vec<SharedPromptRow>> {
        self.prompt_repo().list_shared(order).await
    }

    pub async fn get_prompt(&self, id: i32) -> Result<Option<prompts::Model>> {
        self.prompt_repo().get(id).await
    }

    pub async fn get_owned_prompt(
        &self,
        id: i32,
        customer_id: i32,
    ) -> Result<Option<prompts::Model>> {
        self.prompt_repo().get_owned(id, customer_id).await
    }

    pub async fn get_owned_live_prompt(
        &self,
        id: i32,
        customer_id: i32,
    ) -> Result<Option<prompts::Model>> {
        self.prompt_repo().get_owned_live(id, customer_id).await
    }

    pub async fn get_shared_live_prompt(&self, id: i32) -> Result<Option<prompts::Model>> {
        self.prompt_repo().get_shared_live(id).await
    }

    pub async fn create_prompt(&self, new: NewPrompt) -> Result<prompts::Model> {
        self.prompt_repo().create(new).await
    }

    pub async fn copy_prompt(
        &self,
        original: &prompts::Model,
        customer_id: i32,
    ) -> Result<prompts::Model> {
        self.prompt_repo()
            .copy_for_customer(original, customer_id)
            .await
    }

    pub async fn edit_prompt(&self, model: prompts::Model, edit: PromptEdit) -> Result<()> {
        self.prompt_repo().apply_edit(model, edit).await
    }

    pub async fn set_prompt_share(&self, model: prompts::Model, share_flag: &str) -> Result<()> {
        self.prompt_repo().set_share_flag(model, share_flag).await
    }

    pub async fn soft_delete_prompt(&self, model: prompts::Model) -> Result<()> {
        self.prompt_repo().soft_delete(model).await
    }

    pub async fn toggle_prompt_fav(
        &self,
        prompt: prompts::Model,
        customer_id: i32,
    ) -> Result<bool> {
        self.prompt_repo().toggle_fav(prompt, customer_id).await
    }

    // ========== Customers ==========

    pub async fn get_customer(&self, id: i32) -> Result<Option<Customer>> {
        self.customer_repo().get_by_id(id).await
    }

    pub async fn get_customer_by_email(&self, email: &str) -> Result<Option<Customer>> {
        self.customer_repo().get_by_email(email).await
    }

    pub async fn verify_customer_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Customer>> {
        self.customer_repo().verify_password(email, password).await
    }

    pub async fn verify_customer_api_key(&self, api_key: &str) -> Result<Option<Customer>> {
        self.customer_repo().verify_api_key(api_key).await
    }

    pub async fn create_customer(
        &self,
        email: &str,
        password: &str,
        config: Option<&crate::config::SecurityConfig>,
    ) -> Result<Customer> {
        self.customer_repo().create(email, password, config).await
    }

    pub async fn regenerate_customer_api_key(&self, id: i32) -> Result<String> {
        self.customer_repo().regenerate_api_key(id).await
    }
}
