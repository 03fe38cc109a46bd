use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "actor")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::movie_actor::Entity")]
    MovieActor,
}

impl Related<super::movie::Entity> for Entity {
    fn to() -> RelationDef {
        super::movie_actor::Relation::Movie.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::movie_actor::Relation::Actor.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
