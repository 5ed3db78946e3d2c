use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A tag is shared by every user's snippets; the label is globally unique and
/// case-sensitive.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub label: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::snippet::Entity> for Entity {
    fn to() -> RelationDef {
        super::snippet_tag::Relation::Snippet.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::snippet_tag::Relation::Tag.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
