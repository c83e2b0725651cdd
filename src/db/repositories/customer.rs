use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::customers;

/// Customer data returned from the repository (without the password hash)
#[derive(Debug, Clone)]
pub struct Customer {
    pub id: i32,
    pub email: String,
    pub api_key: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<customers::Model> for Customer {
    fn from(model: customers::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            api_key: model.api_key,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct CustomerRepository {
    conn: DatabaseConnection,
}

impl CustomerRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<Customer>> {
        let customer = customers::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query customer by id")?;

        Ok(customer.map(Customer::from))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<Customer>> {
        let customer = customers::Entity::find()
            .filter(customers::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query customer by email")?;

        Ok(customer.map(Customer::from))
    }

    /// Verify a password and return the customer on success.
    /// Note: This uses `spawn_blocking` because Argon2 verification is
    /// CPU-intensive and would block the async runtime if run directly.
    pub async fn verify_password(&self, email: &str, password: &str) -> Result<Option<Customer>> {
        let customer = customers::Entity::find()
            .filter(customers::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query customer for password verification")?;

        let Some(customer) = customer else {
            return Ok(None);
        };

        let password_hash = customer.password_hash.clone();
        let password = password.to_string();

        // Run CPU-intensive password verification in a blocking task
        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid.then(|| Customer::from(customer)))
    }

    /// Verify an API key and return the associated customer
    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<Customer>> {
        let customer = customers::Entity::find()
            .filter(customers::Column::ApiKey.eq(api_key))
            .one(&self.conn)
            .await
            .context("Failed to query customer by API key")?;

        Ok(customer.map(Customer::from))
    }

    /// Register a new customer with a hashed password and a fresh API key.
    pub async fn create(
        &self,
        email: &str,
        password: &str,
        config: Option<&SecurityConfig>,
    ) -> Result<Customer> {
        let password = password.to_string();
        let config = config.cloned();
        let password_hash =
            task::spawn_blocking(move || hash_password(&password, config.as_ref()))
                .await
                .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().to_rfc3339();

        let model = customers::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set(password_hash),
            api_key: Set(generate_api_key()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let inserted = model
            .insert(&self.conn)
            .await
            .context("Failed to insert customer")?;

        Ok(Customer::from(inserted))
    }

    pub async fn regenerate_api_key(&self, id: i32) -> Result<String> {
        let customer = customers::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query customer for API key regeneration")?
            .ok_or_else(|| anyhow::anyhow!("Customer not found: {id}"))?;

        let new_api_key = generate_api_key();
        let now = chrono::Utc::now().to_rfc3339();

        let mut active: customers::ActiveModel = customer.into();
        active.api_key = Set(new_api_key.clone());
        active.updated_at = Set(now);
        active.update(&self.conn).await?;

        Ok(new_api_key)
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the argon2 crate defaults.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Generate a random API key (64 character hex string)
#[must_use]
pub fn generate_api_key() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}
