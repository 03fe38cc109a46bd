use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "movie")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub imdb_id: i64,
    pub title: String,
    /// Lowercased title, matched by title search.
    pub title_folded: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub overview: Option<String>,
    pub release_date: Option<String>,
    #[sea_orm(column_type = "Double")]
    pub vote_average: f64,
    pub vote_count: i32,
    #[sea_orm(column_type = "Double")]
    pub popularity: f64,
    pub original_language: Option<String>,
    pub original_title: Option<String>,
    pub backdrop_path: Option<String>,
    pub poster_path: Option<String>,
    pub adult: bool,
    pub director_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::director::Entity",
        from = "Column::DirectorId",
        to = "super::director::Column::Id",
        on_delete = "SetNull"
    )]
    Director,
    #[sea_orm(has_many = "super::movie_genre::Entity")]
    MovieGenre,
    #[sea_orm(has_many = "super::movie_actor::Entity")]
    MovieActor,
}

impl Related<super::director::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Director.def()
    }
}

impl Related<super::genre::Entity> for Entity {
    fn to() -> RelationDef {
        super::movie_genre::Relation::Genre.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::movie_genre::Relation::Movie.def().rev())
    }
}

impl Related<super::actor::Entity> for Entity {
    fn to() -> RelationDef {
        super::movie_actor::Relation::Actor.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::movie_actor::Relation::Movie.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
