use sea_orm_migration::{prelude::*, schema::*};

use crate::m20241016_000001_create_catalog::{Actor, Genre, Movie};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MovieGenre::Table)
                    .if_not_exists()
                    .col(integer(MovieGenre::MovieId))
                    .col(integer(MovieGenre::GenreId))
                    .primary_key(Index::create().col(MovieGenre::MovieId).col(MovieGenre::GenreId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_genre_movie")
                            .from(MovieGenre::Table, MovieGenre::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_genre_genre")
                            .from(MovieGenre::Table, MovieGenre::GenreId)
                            .to(Genre::Table, Genre::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_genre_genre")
                    .table(MovieGenre::Table)
                    .col(MovieGenre::GenreId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieActor::Table)
                    .if_not_exists()
                    .col(integer(MovieActor::MovieId))
                    .col(integer(MovieActor::ActorId))
                    .primary_key(Index::create().col(MovieActor::MovieId).col(MovieActor::ActorId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_actor_movie")
                            .from(MovieActor::Table, MovieActor::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_actor_actor")
                            .from(MovieActor::Table, MovieActor::ActorId)
                            .to(Actor::Table, Actor::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_actor_actor")
                    .table(MovieActor::Table)
                    .col(MovieActor::ActorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MovieActor::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MovieGenre::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum MovieGenre {
    Table,
    MovieId,
    GenreId,
}

#[derive(DeriveIden)]
enum MovieActor {
    Table,
    MovieId,
    ActorId,
}
