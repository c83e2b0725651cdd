use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "prompts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Display name, at most 255 characters.
    pub title: String,

    /// Template body, at most 5000 characters.
    pub content: String,

    #[sea_orm(default_value = "N")]
    pub share_flag: String,

    /// Soft-delete marker; reads filter on it, rows are never removed.
    #[sea_orm(default_value = "N")]
    pub deleted_flag: String,

    /// Tracks the net favorite count: adjusted on every favorite toggle.
    #[sea_orm(default_value = 0)]
    pub added_count: i32,

    pub customer_id: i32,

    pub created_at: Option<String>,

    pub updated_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::prompt_favs::Entity")]
    PromptFavs,

    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Customer,
}

impl Related<super::prompt_favs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PromptFavs.def()
    }
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
