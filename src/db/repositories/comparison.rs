use std::collections::HashSet;

use anyhow::{Context, Result};
use sea_orm::sea_query::{Alias, Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    ModelTrait, Order, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};

use crate::entities::{comparison_favs, comparisons, customers};

use super::SharedOrder;

/// One row of the shared browse list: the glossary plus its live favorite
/// count and the owner's email.
#[derive(Debug, Clone, FromQueryResult)]
pub struct SharedComparisonRow {
    pub id: i32,
    pub title: String,
    pub origin_lang: String,
    pub target_lang: String,
    pub content: String,
    pub added_count: i32,
    pub created_at: Option<String>,
    pub fav_count: i64,
    pub email: Option<String>,
}

/// Fields for a freshly created glossary.
#[derive(Debug, Clone)]
pub struct NewComparison {
    pub title: String,
    pub origin_lang: String,
    pub target_lang: String,
    pub content: String,
    pub share_flag: String,
    pub customer_id: i32,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Partial update applied by the edit endpoint. `content` and `updated_at`
/// are always rewritten; the rest only when the field was sent.
#[derive(Debug, Clone, Default)]
pub struct ComparisonEdit {
    pub title: Option<String>,
    pub origin_lang: Option<String>,
    pub target_lang: Option<String>,
    pub share_flag: Option<String>,
    pub added_count: Option<i32>,
    pub content: String,
    pub updated_at: Option<String>,
}

pub struct ComparisonRepository {
    conn: DatabaseConnection,
}

impl ComparisonRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// All glossaries owned by a customer, in insertion order.
    pub async fn list_for_customer(&self, customer_id: i32) -> Result<Vec<comparisons::Model>> {
        comparisons::Entity::find()
            .filter(comparisons::Column::CustomerId.eq(customer_id))
            .all(&self.conn)
            .await
            .context("Failed to list glossaries for customer")
    }

    /// Shared, non-deleted glossaries with favorite counts and owner emails.
    pub async fn list_shared(&self, order: Option<SharedOrder>) -> Result<Vec<SharedComparisonRow>> {
        let mut query = comparisons::Entity::find()
            .select_only()
            .column(comparisons::Column::Id)
            .column(comparisons::Column::Title)
            .column(comparisons::Column::OriginLang)
            .column(comparisons::Column::TargetLang)
            .column(comparisons::Column::Content)
            .column(comparisons::Column::AddedCount)
            .column(comparisons::Column::CreatedAt)
            .column_as(customers::Column::Email, "email")
            .expr_as(
                Func::count(Expr::col((
                    comparison_favs::Entity,
                    comparison_favs::Column::Id,
                ))),
                "fav_count",
            )
            .join(
                JoinType::LeftJoin,
                comparisons::Relation::ComparisonFavs.def(),
            )
            .join(JoinType::LeftJoin, comparisons::Relation::Customer.def())
            .filter(comparisons::Column::ShareFlag.eq("Y"))
            .filter(comparisons::Column::DeletedFlag.eq("N"))
            .group_by(comparisons::Column::Id);

        query = match order {
            Some(SharedOrder::Latest) => {
                query.order_by(comparisons::Column::CreatedAt, Order::Desc)
            }
            Some(SharedOrder::Added) => {
                query.order_by(comparisons::Column::AddedCount, Order::Desc)
            }
            Some(SharedOrder::Fav) => {
                let fav_count: SimpleExpr = Expr::col(Alias::new("fav_count")).into();
                query.order_by(fav_count, Order::Desc)
            }
            None => query,
        };

        query
            .into_model::<SharedComparisonRow>()
            .all(&self.conn)
            .await
            .context("Failed to list shared glossaries")
    }

    /// Ids of the shared glossaries this customer has favorited, fetched in
    /// one query so the browse list can annotate rows without per-row
    /// lookups.
    pub async fn fav_ids_for_customer(&self, customer_id: i32) -> Result<HashSet<i32>> {
        let ids: Vec<i32> = comparison_favs::Entity::find()
            .select_only()
            .column(comparison_favs::Column::ComparisonId)
            .filter(comparison_favs::Column::CustomerId.eq(customer_id))
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to list glossary favorites for customer")?;

        Ok(ids.into_iter().collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<comparisons::Model>> {
        comparisons::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query glossary by id")
    }

    pub async fn get_owned(
        &self,
        id: i32,
        customer_id: i32,
    ) -> Result<Option<comparisons::Model>> {
        comparisons::Entity::find_by_id(id)
            .filter(comparisons::Column::CustomerId.eq(customer_id))
            .one(&self.conn)
            .await
            .context("Failed to query owned glossary")
    }

    pub async fn get_shared(&self, id: i32) -> Result<Option<comparisons::Model>> {
        comparisons::Entity::find_by_id(id)
            .filter(comparisons::Column::ShareFlag.eq("Y"))
            .one(&self.conn)
            .await
            .context("Failed to query shared glossary")
    }

    pub async fn create(&self, new: NewComparison) -> Result<comparisons::Model> {
        let model = comparisons::ActiveModel {
            title: Set(new.title),
            origin_lang: Set(new.origin_lang),
            target_lang: Set(new.target_lang),
            content: Set(new.content),
            share_flag: Set(new.share_flag),
            deleted_flag: Set("N".to_string()),
            added_count: Set(0),
            customer_id: Set(new.customer_id),
            created_at: Set(new.created_at),
            updated_at: Set(new.updated_at),
            ..Default::default()
        };

        model
            .insert(&self.conn)
            .await
            .context("Failed to insert glossary")
    }

    pub async fn apply_edit(&self, model: comparisons::Model, edit: ComparisonEdit) -> Result<()> {
        let mut active: comparisons::ActiveModel = model.into();

        if let Some(title) = edit.title {
            active.title = Set(title);
        }
        if let Some(origin_lang) = edit.origin_lang {
            active.origin_lang = Set(origin_lang);
        }
        if let Some(target_lang) = edit.target_lang {
            active.target_lang = Set(target_lang);
        }
        if let Some(share_flag) = edit.share_flag {
            active.share_flag = Set(share_flag);
        }
        if let Some(added_count) = edit.added_count {
            active.added_count = Set(added_count);
        }

        active.content = Set(edit.content);
        active.updated_at = Set(edit.updated_at);

        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn set_share_flag(&self, model: comparisons::Model, share_flag: &str) -> Result<()> {
        let mut active: comparisons::ActiveModel = model.into();
        active.share_flag = Set(share_flag.to_string());
        active.update(&self.conn).await?;

        Ok(())
    }

    /// Hard delete; favorites go with the row via the cascade.
    pub async fn delete(&self, model: comparisons::Model) -> Result<()> {
        model.delete(&self.conn).await?;

        Ok(())
    }

    /// Toggle a favorite row. Returns true when the glossary is now faved.
    pub async fn toggle_fav(&self, comparison_id: i32, customer_id: i32) -> Result<bool> {
        let existing = comparison_favs::Entity::find()
            .filter(comparison_favs::Column::ComparisonId.eq(comparison_id))
            .filter(comparison_favs::Column::CustomerId.eq(customer_id))
            .one(&self.conn)
            .await
            .context("Failed to query glossary favorite")?;

        if let Some(fav) = existing {
            fav.delete(&self.conn).await?;
            return Ok(false);
        }

        let fav = comparison_favs::ActiveModel {
            comparison_id: Set(comparison_id),
            customer_id: Set(customer_id),
            ..Default::default()
        };
        fav.insert(&self.conn)
            .await
            .context("Failed to insert glossary favorite")?;

        Ok(true)
    }
}
