pub mod config;
pub mod dao;
pub mod db;
pub mod demo;
pub mod entities;
pub mod error;
pub mod importer;
pub mod models;
pub mod report;
pub mod routes;
pub mod service;
pub mod tmdb;

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::service::FilmService;

pub struct AppState {
    pub films: FilmService,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/movies/all", get(routes::all_movies))
        .route("/movies/{id}", get(routes::movie_by_id))
        .route("/movies/imdb/{imdb_id}", get(routes::movie_by_imdb_id))
        .route("/movies/genre/{genre}", get(routes::movies_by_genre))
        .route("/movies/rating/{rating}", get(routes::movies_by_rating))
        .route("/movies/year/{year}", get(routes::movies_by_year))
        .route("/moviesbyactor/{actor}", get(routes::movies_by_actor))
        .route("/moviesbyinstructor/{instructor}", get(routes::movies_by_instructor))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
