use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Director::Table)
                    .if_not_exists()
                    .col(pk_auto(Director::Id))
                    .col(string(Director::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_director_name")
                    .table(Director::Table)
                    .col(Director::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Genre::Table)
                    .if_not_exists()
                    .col(pk_auto(Genre::Id))
                    .col(integer_null(Genre::TmdbId))
                    .col(string(Genre::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_genre_tmdb_id")
                    .table(Genre::Table)
                    .col(Genre::TmdbId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_genre_name")
                    .table(Genre::Table)
                    .col(Genre::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Actor::Table)
                    .if_not_exists()
                    .col(pk_auto(Actor::Id))
                    .col(string(Actor::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_actor_name")
                    .table(Actor::Table)
                    .col(Actor::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(pk_auto(Movie::Id))
                    .col(big_integer(Movie::ImdbId))
                    .col(string(Movie::Title))
                    .col(text_null(Movie::Overview))
                    .col(string_null(Movie::ReleaseDate))
                    .col(double(Movie::VoteAverage))
                    .col(integer(Movie::VoteCount))
                    .col(double(Movie::Popularity))
                    .col(string_null(Movie::OriginalLanguage))
                    .col(string_null(Movie::OriginalTitle))
                    .col(string_null(Movie::BackdropPath))
                    .col(string_null(Movie::PosterPath))
                    .col(boolean(Movie::Adult))
                    .col(integer_null(Movie::DirectorId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_director")
                            .from(Movie::Table, Movie::DirectorId)
                            .to(Director::Table, Director::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_imdb_id")
                    .table(Movie::Table)
                    .col(Movie::ImdbId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_title")
                    .table(Movie::Table)
                    .col(Movie::Title)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_release_date")
                    .table(Movie::Table)
                    .col(Movie::ReleaseDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Movie::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Actor::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Genre::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Director::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Movie {
    Table,
    Id,
    ImdbId,
    Title,
    Overview,
    ReleaseDate,
    VoteAverage,
    VoteCount,
    Popularity,
    OriginalLanguage,
    OriginalTitle,
    BackdropPath,
    PosterPath,
    Adult,
    DirectorId,
}

#[derive(DeriveIden)]
pub(crate) enum Genre {
    Table,
    Id,
    TmdbId,
    Name,
}

#[derive(DeriveIden)]
pub(crate) enum Actor {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Director {
    Table,
    Id,
    Name,
}
