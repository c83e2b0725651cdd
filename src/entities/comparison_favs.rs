use sea_orm::entity::prelude::*;

/// One row per (glossary, customer) favorite; existence means "faved".
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "comparison_favs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub comparison_id: i32,

    pub customer_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::comparisons::Entity",
        from = "Column::ComparisonId",
        to = "super::comparisons::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Comparison,
}

impl Related<super::comparisons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comparison.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
