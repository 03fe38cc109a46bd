use sea_orm_migration::{prelude::*, schema::*, sea_orm::ConnectionTrait};

use crate::m20241016_000001_create_catalog::Movie;

/// Adds a lowercased copy of the title for case-insensitive search. SQLite's
/// `lower()` only folds ASCII, so the value is computed in Rust.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Movie::Table)
                    .add_column(string(TitleFolded::TitleFolded).default(""))
                    .to_owned(),
            )
            .await?;

        let db = manager.get_connection();
        let select = Query::select().columns([Movie::Id, Movie::Title]).from(Movie::Table).to_owned();
        let rows = db.query_all(db.get_database_backend().build(&select)).await?;
        for row in rows {
            let id: i32 = row.try_get("", "id")?;
            let title: String = row.try_get("", "title")?;
            manager
                .exec_stmt(
                    Query::update()
                        .table(Movie::Table)
                        .value(TitleFolded::TitleFolded, title.to_lowercase())
                        .and_where(Expr::col(Movie::Id).eq(id))
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_title_folded")
                    .table(Movie::Table)
                    .col(TitleFolded::TitleFolded)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_movie_title_folded").table(Movie::Table).to_owned())
            .await?;
        manager
            .alter_table(
                Table::alter().table(Movie::Table).drop_column(TitleFolded::TitleFolded).to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum TitleFolded {
    TitleFolded,
}
