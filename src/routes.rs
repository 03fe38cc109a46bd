use std::{str::FromStr, sync::Arc};

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::{
    AppState,
    entities::movie,
    error::{ApiError, ApiResult},
    models::MovieApi,
};

pub const DEFAULT_PAGE: u64 = 0;
pub const DEFAULT_SIZE: u64 = 20;
pub const MAX_SIZE: u64 = 100;

/// Raw `page`/`size` query parameters. Kept as text so malformed values get
/// our own 400 message.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
    size: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub page: u64,
    pub size: u64,
}

impl PageQuery {
    pub fn resolve(&self) -> ApiResult<Page> {
        let page = match self.page.as_deref() {
            Some(raw) => parse_param::<u64>("page", raw)?,
            None => DEFAULT_PAGE,
        };
        let size = match self.size.as_deref() {
            Some(raw) => parse_param::<u64>("size", raw)?,
            None => DEFAULT_SIZE,
        };
        if !(1..=MAX_SIZE).contains(&size) {
            return Err(ApiError::BadRequest(format!("size must be between 1 and {MAX_SIZE}")));
        }
        // The row offset is page * size and must fit a signed SQL integer.
        if page.checked_mul(size).is_none_or(|offset| offset > i64::MAX as u64) {
            return Err(ApiError::BadRequest(format!("page {page} is out of range")));
        }
        Ok(Page { page, size })
    }
}

fn parse_param<T: FromStr>(name: &str, raw: &str) -> ApiResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid value for {name}: {raw:?}")))
}

async fn to_api(state: &AppState, movies: Vec<movie::Model>) -> ApiResult<Vec<MovieApi>> {
    let details = state.films.movies.load_details(movies).await?;
    Ok(details.into_iter().map(MovieApi::from).collect())
}

async fn listing(
    state: &AppState,
    movies: Vec<movie::Model>,
    not_found: impl FnOnce() -> String,
) -> ApiResult<Json<Vec<MovieApi>>> {
    if movies.is_empty() {
        return Err(ApiError::NotFound(not_found()));
    }
    Ok(Json(to_api(state, movies).await?))
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn movie_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MovieApi>> {
    let id: i32 = parse_param("id", &id)?;
    let Some(movie) = state.films.movies.find_by_id(id).await? else {
        return Err(ApiError::NotFound(format!("no movie found with id {id}")));
    };
    let details = state.films.movies.load_movie_details(movie).await?;
    Ok(Json(details.into()))
}

pub async fn movie_by_imdb_id(
    State(state): State<Arc<AppState>>,
    Path(imdb_id): Path<String>,
) -> ApiResult<Json<MovieApi>> {
    let imdb_id: i64 = parse_param("imdb id", &imdb_id)?;
    let Some(movie) = state.films.movies.find_by_imdb_id(imdb_id).await? else {
        return Err(ApiError::NotFound(format!("no movie found with IMDB id {imdb_id}")));
    };
    let details = state.films.movies.load_movie_details(movie).await?;
    Ok(Json(details.into()))
}

pub async fn all_movies(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PageQuery>,
) -> ApiResult<Json<Vec<MovieApi>>> {
    let Page { page, size } = q.resolve()?;
    let movies = state.films.movies.get_movies(page, size).await?;
    listing(&state, movies, || format!("no movies on page {page}")).await
}

pub async fn movies_by_genre(
    State(state): State<Arc<AppState>>,
    Path(genre): Path<String>,
    Query(q): Query<PageQuery>,
) -> ApiResult<Json<Vec<MovieApi>>> {
    let Page { page, size } = q.resolve()?;
    let movies = state.films.movies.get_movies_by_genre_paged(&genre, page, size).await?;
    listing(&state, movies, || format!("no movies found in genre {genre} on page {page}")).await
}

pub async fn movies_by_rating(
    State(state): State<Arc<AppState>>,
    Path(rating): Path<String>,
    Query(q): Query<PageQuery>,
) -> ApiResult<Json<Vec<MovieApi>>> {
    let rating: f64 = parse_param("rating", &rating)?;
    if !rating.is_finite() {
        return Err(ApiError::BadRequest(format!("invalid value for rating: {rating}")));
    }
    let Page { page, size } = q.resolve()?;
    let movies = state.films.movies.get_movies_by_rating_paged(rating, page, size).await?;
    listing(&state, movies, || format!("no movies rated {rating} or higher on page {page}")).await
}

pub async fn movies_by_year(
    State(state): State<Arc<AppState>>,
    Path(year): Path<String>,
    Query(q): Query<PageQuery>,
) -> ApiResult<Json<Vec<MovieApi>>> {
    let year: i32 = parse_param("year", &year)?;
    let Page { page, size } = q.resolve()?;
    let movies = state.films.movies.get_movies_by_release_year_paged(year, page, size).await?;
    listing(&state, movies, || format!("no movies released in {year} on page {page}")).await
}

/// Movies with a known release date, oldest first.
pub async fn movies_by_actor(
    State(state): State<Arc<AppState>>,
    Path(actor): Path<String>,
) -> ApiResult<Json<Vec<MovieApi>>> {
    let movies: Vec<movie::Model> = state
        .films
        .find_movies_by_actor(&actor)
        .await?
        .into_iter()
        .filter(|m| m.release_date.is_some())
        .collect();
    listing(&state, movies, || format!("no movies found with actor {actor}")).await
}

pub async fn movies_by_instructor(
    State(state): State<Arc<AppState>>,
    Path(instructor): Path<String>,
) -> ApiResult<Json<Vec<MovieApi>>> {
    let movies = state.films.movies.get_movies_by_director(&instructor).await?;
    listing(&state, movies, || format!("no movies found directed by {instructor}")).await
}
