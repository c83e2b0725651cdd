use anyhow::{Context, Result};
use sea_orm::sea_query::{Alias, Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    ModelTrait, Order, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};

use crate::entities::{customers, prompt_favs, prompts};

use super::SharedOrder;

/// One row of the shared prompt list.
#[derive(Debug, Clone, FromQueryResult)]
pub struct SharedPromptRow {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub share_flag: String,
    pub added_count: i32,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub fav_count: i64,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPrompt {
    pub title: String,
    pub content: String,
    pub share_flag: String,
    pub customer_id: i32,
    pub created_at: Option<String>,
}

/// Partial update applied by the edit endpoint; only sent fields change.
#[derive(Debug, Clone, Default)]
pub struct PromptEdit {
    pub title: Option<String>,
    pub content: Option<String>,
}

pub struct PromptRepository {
    conn: DatabaseConnection,
}

impl PromptRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Non-deleted prompts owned by a customer.
    pub async fn list_for_customer(&self, customer_id: i32) -> Result<Vec<prompts::Model>> {
        prompts::Entity::find()
            .filter(prompts::Column::CustomerId.eq(customer_id))
            .filter(prompts::Column::DeletedFlag.eq("N"))
            .all(&self.conn)
            .await
            .context("Failed to list prompts for customer")
    }

    /// Shared, non-deleted prompts with favorite counts and owner emails.
    pub async fn list_shared(&self, order: Option<SharedOrder>) -> Result<Vec<SharedPromptRow>> {
        let mut query = prompts::Entity::find()
            .select_only()
            .column(prompts::Column::Id)
            .column(prompts::Column::Title)
            .column(prompts::Column::Content)
            .column(prompts::Column::ShareFlag)
            .column(prompts::Column::AddedCount)
            .column(prompts::Column::CreatedAt)
            .column(prompts::Column::UpdatedAt)
            .column_as(customers::Column::Email, "email")
            .expr_as(
                Func::count(Expr::col((prompt_favs::Entity, prompt_favs::Column::Id))),
                "fav_count",
            )
            .join(JoinType::LeftJoin, prompts::Relation::PromptFavs.def())
            .join(JoinType::LeftJoin, prompts::Relation::Customer.def())
            .filter(prompts::Column::ShareFlag.eq("Y"))
            .filter(prompts::Column::DeletedFlag.eq("N"))
            .group_by(prompts::Column::Id);

        query = match order {
            Some(SharedOrder::Latest) => query.order_by(prompts::Column::CreatedAt, Order::Desc),
            Some(SharedOrder::Added) => query.order_by(prompts::Column::AddedCount, Order::Desc),
            Some(SharedOrder::Fav) => {
                let fav_count: SimpleExpr = Expr::col(Alias::new("fav_count")).into();
                query.order_by(fav_count, Order::Desc)
            }
            None => query,
        };

        query
            .into_model::<SharedPromptRow>()
            .all(&self.conn)
            .await
            .context("Failed to list shared prompts")
    }

    pub async fn get(&self, id: i32) -> Result<Option<prompts::Model>> {
        prompts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query prompt by id")
    }

    /// Owned, non-deleted prompt for the edit and share endpoints.
    pub async fn get_owned_live(
        &self,
        id: i32,
        customer_id: i32,
    ) -> Result<Option<prompts::Model>> {
        prompts::Entity::find_by_id(id)
            .filter(prompts::Column::CustomerId.eq(customer_id))
            .filter(prompts::Column::DeletedFlag.eq("N"))
            .one(&self.conn)
            .await
            .context("Failed to query owned prompt")
    }

    /// Owned prompt regardless of deletion state; the delete endpoint
    /// matches on ownership alone.
    pub async fn get_owned(&self, id: i32, customer_id: i32) -> Result<Option<prompts::Model>> {
        prompts::Entity::find_by_id(id)
            .filter(prompts::Column::CustomerId.eq(customer_id))
            .one(&self.conn)
            .await
            .context("Failed to query owned prompt")
    }

    pub async fn get_shared_live(&self, id: i32) -> Result<Option<prompts::Model>> {
        prompts::Entity::find_by_id(id)
            .filter(prompts::Column::ShareFlag.eq("Y"))
            .filter(prompts::Column::DeletedFlag.eq("N"))
            .one(&self.conn)
            .await
            .context("Failed to query shared prompt")
    }

    pub async fn create(&self, new: NewPrompt) -> Result<prompts::Model> {
        let model = prompts::ActiveModel {
            title: Set(new.title),
            content: Set(new.content),
            share_flag: Set(new.share_flag),
            deleted_flag: Set("N".to_string()),
            added_count: Set(0),
            customer_id: Set(new.customer_id),
            created_at: Set(new.created_at),
            updated_at: Set(None),
            ..Default::default()
        };

        model
            .insert(&self.conn)
            .await
            .context("Failed to insert prompt")
    }

    /// Copy a shared prompt into another customer's library: fresh favorite
    /// count, not shared.
    pub async fn copy_for_customer(
        &self,
        original: &prompts::Model,
        customer_id: i32,
    ) -> Result<prompts::Model> {
        let model = prompts::ActiveModel {
            title: Set(format!("{} (copy)", original.title)),
            content: Set(original.content.clone()),
            share_flag: Set("N".to_string()),
            deleted_flag: Set("N".to_string()),
            added_count: Set(0),
            customer_id: Set(customer_id),
            created_at: Set(original.created_at.clone()),
            updated_at: Set(None),
            ..Default::default()
        };

        model
            .insert(&self.conn)
            .await
            .context("Failed to insert copied prompt")
    }

    pub async fn apply_edit(&self, model: prompts::Model, edit: PromptEdit) -> Result<()> {
        let mut active: prompts::ActiveModel = model.into();

        if let Some(title) = edit.title {
            active.title = Set(title);
        }
        if let Some(content) = edit.content {
            active.content = Set(content);
        }

        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn set_share_flag(&self, model: prompts::Model, share_flag: &str) -> Result<()> {
        let mut active: prompts::ActiveModel = model.into();
        active.share_flag = Set(share_flag.to_string());
        active.update(&self.conn).await?;

        Ok(())
    }

    /// Soft delete; the row stays behind the `deleted_flag` filter.
    pub async fn soft_delete(&self, model: prompts::Model) -> Result<()> {
        let mut active: prompts::ActiveModel = model.into();
        active.deleted_flag = Set("Y".to_string());
        active.update(&self.conn).await?;

        Ok(())
    }

    /// Toggle a favorite row and move `added_count` with it. Returns true
    /// when the prompt is now faved.
    pub async fn toggle_fav(&self, prompt: prompts::Model, customer_id: i32) -> Result<bool> {
        let existing = prompt_favs::Entity::find()
            .filter(prompt_favs::Column::PromptId.eq(prompt.id))
            .filter(prompt_favs::Column::CustomerId.eq(customer_id))
            .one(&self.conn)
            .await
            .context("Failed to query prompt favorite")?;

        let now_faved = if let Some(fav) = existing {
            fav.delete(&self.conn).await?;
            false
        } else {
            let fav = prompt_favs::ActiveModel {
                prompt_id: Set(prompt.id),
                customer_id: Set(customer_id),
                ..Default::default()
            };
            fav.insert(&self.conn)
                .await
                .context("Failed to insert prompt favorite")?;
            true
        };

        let delta = if now_faved { 1 } else { -1 };
        let added_count = prompt.added_count + delta;

        let mut active: prompts::ActiveModel = prompt.into();
        active.added_count = Set(added_count);
        active.update(&self.conn).await?;

        Ok(now_faved)
    }
}
