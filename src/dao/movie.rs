use std::collections::HashSet;

use anyhow::anyhow;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
};
use tracing::{debug, info};

use super::{actor as actor_dao, director as director_dao, genre as genre_dao};
use crate::{
    entities::{actor, director, genre, movie, movie_actor, movie_genre},
    error::AppResult,
    models::{MovieDetails, NewMovie},
};

const TOP_LIMIT: u64 = 10;

#[derive(Clone, Debug)]
pub struct MovieDao {
    db: DatabaseConnection,
}

impl MovieDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Stores the movie, resolving its director, genres and actors by natural
    /// key and creating the ones that do not exist yet. Runs in one
    /// transaction.
    pub async fn create_new_movie(&self, new: NewMovie) -> AppResult<MovieDetails> {
        let release_date = new.release_date.as_deref().map(normalize_release_date).transpose()?;

        let txn = self.db.begin().await?;

        let director = match new.director.as_deref() {
            Some(name) => Some(director_dao::resolve(&txn, name).await?),
            None => None,
        };

        let mut genres = Vec::with_capacity(new.genres.len());
        let mut seen = HashSet::new();
        for wanted in &new.genres {
            let genre = genre_dao::resolve(&txn, wanted).await?;
            if seen.insert(genre.id) {
                genres.push(genre);
            }
        }

        let mut actors = Vec::with_capacity(new.actors.len());
        let mut seen = HashSet::new();
        for name in &new.actors {
            let actor = actor_dao::resolve(&txn, name).await?;
            if seen.insert(actor.id) {
                actors.push(actor);
            }
        }

        let model = movie::ActiveModel {
            id: Default::default(),
            imdb_id: Set(new.imdb_id),
            title_folded: Set(fold_title(&new.title)),
            title: Set(new.title),
            overview: Set(new.overview),
            release_date: Set(release_date),
            vote_average: Set(new.vote_average),
            vote_count: Set(new.vote_count),
            popularity: Set(new.popularity),
            original_language: Set(new.original_language),
            original_title: Set(new.original_title),
            backdrop_path: Set(new.backdrop_path),
            poster_path: Set(new.poster_path),
            adult: Set(new.adult),
            director_id: Set(director.as_ref().map(|d| d.id)),
        };
        let movie = model.insert(&txn).await?;

        if !genres.is_empty() {
            movie_genre::Entity::insert_many(genres.iter().map(|g| movie_genre::ActiveModel {
                movie_id: Set(movie.id),
                genre_id: Set(g.id),
            }))
            .exec_without_returning(&txn)
            .await?;
        }

        if !actors.is_empty() {
            movie_actor::Entity::insert_many(actors.iter().map(|a| movie_actor::ActiveModel {
                movie_id: Set(movie.id),
                actor_id: Set(a.id),
            }))
            .exec_without_returning(&txn)
            .await?;
        }

        txn.commit().await?;

        info!(
            id = movie.id,
            imdb_id = movie.imdb_id,
            title = %movie.title,
            genres = genres.len(),
            actors = actors.len(),
            "created movie"
        );

        genres.sort_by(|a, b| a.name.cmp(&b.name));
        actors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(MovieDetails { movie, director, genres, actors })
    }

    /// Deletes every movie with exactly this title together with its genre
    /// and cast links. Returns the number of movies removed.
    pub async fn delete_by_title(&self, title: &str) -> AppResult<u64> {
        let txn = self.db.begin().await?;

        let ids: Vec<i32> = movie::Entity::find()
            .select_only()
            .column(movie::Column::Id)
            .filter(movie::Column::Title.eq(title))
            .into_tuple()
            .all(&txn)
            .await?;

        if ids.is_empty() {
            debug!(title = %title, "no movie to delete");
            return Ok(0);
        }

        movie_genre::Entity::delete_many()
            .filter(movie_genre::Column::MovieId.is_in(ids.clone()))
            .exec(&txn)
            .await?;
        movie_actor::Entity::delete_many()
            .filter(movie_actor::Column::MovieId.is_in(ids.clone()))
            .exec(&txn)
            .await?;
        let res = movie::Entity::delete_many()
            .filter(movie::Column::Id.is_in(ids))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        info!(title = %title, deleted = res.rows_affected, "deleted movie");
        Ok(res.rows_affected)
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<movie::Model>> {
        Ok(movie::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn find_by_imdb_id(&self, imdb_id: i64) -> AppResult<Option<movie::Model>> {
        Ok(movie::Entity::find().filter(movie::Column::ImdbId.eq(imdb_id)).one(&self.db).await?)
    }

    pub async fn find_by_title(&self, title: &str) -> AppResult<Option<movie::Model>> {
        Ok(movie::Entity::find()
            .filter(movie::Column::Title.eq(title))
            .order_by_asc(movie::Column::Id)
            .one(&self.db)
            .await?)
    }

    pub async fn count_movies(&self) -> AppResult<u64> {
        Ok(movie::Entity::find().count(&self.db).await?)
    }

    pub async fn get_all_movies(&self) -> AppResult<Vec<movie::Model>> {
        Ok(movie::Entity::find().order_by_asc(movie::Column::Title).all(&self.db).await?)
    }

    /// Zero-based page of all movies in insertion order.
    pub async fn get_movies(&self, page: u64, size: u64) -> AppResult<Vec<movie::Model>> {
        let query = movie::Entity::find().order_by_asc(movie::Column::Id);
        self.fetch_page(query, page, size).await
    }

    pub async fn get_movies_by_genre(&self, genre: &str) -> AppResult<Vec<movie::Model>> {
        Ok(by_genre(genre).all(&self.db).await?)
    }

    pub async fn get_movies_by_genre_paged(
        &self,
        genre: &str,
        page: u64,
        size: u64,
    ) -> AppResult<Vec<movie::Model>> {
        self.fetch_page(by_genre(genre), page, size).await
    }

    /// Movies rated at or above `threshold`, best first.
    pub async fn get_movies_by_rating(&self, threshold: f64) -> AppResult<Vec<movie::Model>> {
        Ok(by_rating(threshold).all(&self.db).await?)
    }

    pub async fn get_movies_by_rating_paged(
        &self,
        threshold: f64,
        page: u64,
        size: u64,
    ) -> AppResult<Vec<movie::Model>> {
        self.fetch_page(by_rating(threshold), page, size).await
    }

    pub async fn get_movies_by_release_year(&self, year: i32) -> AppResult<Vec<movie::Model>> {
        Ok(by_release_year(year).all(&self.db).await?)
    }

    pub async fn get_movies_by_release_year_paged(
        &self,
        year: i32,
        page: u64,
        size: u64,
    ) -> AppResult<Vec<movie::Model>> {
        self.fetch_page(by_release_year(year), page, size).await
    }

    pub async fn get_movies_by_director(&self, name: &str) -> AppResult<Vec<movie::Model>> {
        Ok(movie::Entity::find()
            .inner_join(director::Entity)
            .filter(director::Column::Name.eq(name))
            .order_by_asc(movie::Column::ReleaseDate)
            .order_by_asc(movie::Column::Title)
            .all(&self.db)
            .await?)
    }

    /// Every movie the actor appears in, oldest release first.
    pub async fn get_movies_by_actor(&self, name: &str) -> AppResult<Vec<movie::Model>> {
        Ok(movie::Entity::find()
            .inner_join(actor::Entity)
            .filter(actor::Column::Name.eq(name))
            .order_by_asc(movie::Column::ReleaseDate)
            .order_by_asc(movie::Column::Title)
            .all(&self.db)
            .await?)
    }

    /// Case-insensitive substring match on the title, including non-ASCII
    /// letters such as Æ, Ø and Å.
    pub async fn search_movies_by_title(&self, fragment: &str) -> AppResult<Vec<movie::Model>> {
        let escaped = fold_title(fragment).replace('!', "!!").replace('%', "!%").replace('_', "!_");
        let pattern = LikeExpr::new(format!("%{escaped}%")).escape('!');

        Ok(movie::Entity::find()
            .filter(Expr::col((movie::Entity, movie::Column::TitleFolded)).like(pattern))
            .order_by_asc(movie::Column::Title)
            .all(&self.db)
            .await?)
    }

    /// Sets the release date of the first movie with this title. Returns the
    /// updated row, or `None` when no movie has that title.
    pub async fn update_movie_release_date(
        &self,
        title: &str,
        release_date: &str,
    ) -> AppResult<Option<movie::Model>> {
        let release_date = normalize_release_date(release_date)?;

        let Some(found) = self.find_by_title(title).await? else {
            debug!(title = %title, "no movie to update");
            return Ok(None);
        };

        let mut active: movie::ActiveModel = found.into();
        active.release_date = Set(Some(release_date));
        let updated = active.update(&self.db).await?;

        info!(title = %title, release_date = ?updated.release_date, "updated release date");
        Ok(Some(updated))
    }

    /// Mean vote average over all movies, `None` when there are none.
    pub async fn get_total_average_rating(&self) -> AppResult<Option<f64>> {
        let average = SimpleExpr::from(Func::avg(Expr::col((
            movie::Entity,
            movie::Column::VoteAverage,
        ))));

        let row: Option<Option<f64>> = movie::Entity::find()
            .select_only()
            .column_as(average, "average")
            .into_tuple()
            .one(&self.db)
            .await?;

        Ok(row.flatten())
    }

    pub async fn get_top10_lowest_rated_movies(&self) -> AppResult<Vec<movie::Model>> {
        Ok(movie::Entity::find()
            .order_by_asc(movie::Column::VoteAverage)
            .order_by_asc(movie::Column::Title)
            .limit(TOP_LIMIT)
            .all(&self.db)
            .await?)
    }

    pub async fn get_top10_highest_rated_movies(&self) -> AppResult<Vec<movie::Model>> {
        Ok(movie::Entity::find()
            .order_by_desc(movie::Column::VoteAverage)
            .order_by_asc(movie::Column::Title)
            .limit(TOP_LIMIT)
            .all(&self.db)
            .await?)
    }

    pub async fn get_top10_most_popular_movies(&self) -> AppResult<Vec<movie::Model>> {
        Ok(movie::Entity::find()
            .order_by_desc(movie::Column::Popularity)
            .order_by_asc(movie::Column::Title)
            .limit(TOP_LIMIT)
            .all(&self.db)
            .await?)
    }

    /// Batch-loads director, genres and actors for each movie, keeping the
    /// input order.
    pub async fn load_details(&self, movies: Vec<movie::Model>) -> AppResult<Vec<MovieDetails>> {
        if movies.is_empty() {
            return Ok(Vec::new());
        }

        let directors = movies.load_one(director::Entity, &self.db).await?;
        let genres = movies.load_many_to_many(genre::Entity, movie_genre::Entity, &self.db).await?;
        let actors = movies.load_many_to_many(actor::Entity, movie_actor::Entity, &self.db).await?;

        Ok(movies
            .into_iter()
            .zip(directors)
            .zip(genres)
            .zip(actors)
            .map(|(((movie, director), mut genres), mut actors)| {
                genres.sort_by(|a, b| a.name.cmp(&b.name));
                actors.sort_by(|a, b| a.name.cmp(&b.name));
                MovieDetails { movie, director, genres, actors }
            })
            .collect())
    }

    pub async fn load_movie_details(&self, movie: movie::Model) -> AppResult<MovieDetails> {
        self.load_details(vec![movie])
            .await?
            .pop()
            .ok_or_else(|| anyhow!("movie details went missing while loading").into())
    }

    async fn fetch_page(
        &self,
        query: Select<movie::Entity>,
        page: u64,
        size: u64,
    ) -> AppResult<Vec<movie::Model>> {
        let size = size.max(1);
        if page.checked_mul(size).is_none_or(|offset| offset > i64::MAX as u64) {
            debug!(page = page, size = size, "page offset out of range");
            return Ok(Vec::new());
        }
        debug!(page = page, size = size, "fetching movie page");
        Ok(query.paginate(&self.db, size).fetch_page(page).await?)
    }
}

/// The form of a title stored in `title_folded` and compared by search.
fn fold_title(title: &str) -> String {
    title.to_lowercase()
}

fn by_genre(genre: &str) -> Select<movie::Entity> {
    movie::Entity::find()
        .inner_join(genre::Entity)
        .filter(genre::Column::Name.eq(genre))
        .order_by_asc(movie::Column::Title)
        .order_by_asc(movie::Column::Id)
}

fn by_rating(threshold: f64) -> Select<movie::Entity> {
    movie::Entity::find()
        .filter(movie::Column::VoteAverage.gte(threshold))
        .order_by_desc(movie::Column::VoteAverage)
        .order_by_asc(movie::Column::Title)
}

fn by_release_year(year: i32) -> Select<movie::Entity> {
    movie::Entity::find()
        .filter(movie::Column::ReleaseDate.starts_with(format!("{year:04}-")))
        .order_by_asc(movie::Column::ReleaseDate)
        .order_by_asc(movie::Column::Title)
}

/// Parses a calendar date and renders it back as `YYYY-MM-DD`.
fn normalize_release_date(raw: &str) -> AppResult<String> {
    let date: jiff::civil::Date =
        raw.trim().parse().map_err(|err| anyhow!("invalid release date {raw:?}: {err}"))?;
    Ok(date.to_string())
}
