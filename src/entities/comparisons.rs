use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "comparisons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    pub origin_lang: String,

    pub target_lang: String,

    /// Term pairs in the delimited encoding (see `crate::terms`).
    pub content: String,

    #[sea_orm(default_value = "N")]
    pub share_flag: String,

    /// Stored but never consulted by the list-mine query; glossaries are
    /// removed by hard delete.
    #[sea_orm(default_value = "N")]
    pub deleted_flag: String,

    #[sea_orm(default_value = 0)]
    pub added_count: i32,

    pub customer_id: i32,

    pub created_at: Option<String>,

    pub updated_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comparison_favs::Entity")]
    ComparisonFavs,

    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Customer,
}

impl Related<super::comparison_favs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ComparisonFavs.def()
    }
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
