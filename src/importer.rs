use std::collections::HashMap;

use futures::{StreamExt, stream};
use tracing::{debug, info, warn};

use crate::{
    error::AppResult,
    models::{NewGenre, NewMovie},
    service::FilmService,
    tmdb::{Credits, TmdbClient, TmdbMovie},
};

/// One-shot batch import of TMDB genres and movies into the catalog.
pub struct Importer<'a> {
    tmdb: &'a TmdbClient,
    films: &'a FilmService,
    max_concurrent: usize,
}

impl<'a> Importer<'a> {
    pub fn new(tmdb: &'a TmdbClient, films: &'a FilmService, max_concurrent: usize) -> Self {
        Self { tmdb, films, max_concurrent }
    }

    /// Stores every TMDB movie genre. Returns how many were written.
    pub async fn populate_genres(&self) -> AppResult<usize> {
        let genres = self.tmdb.movie_genres().await?;
        for genre in &genres {
            self.films.genres.upsert(genre.id, &genre.name).await?;
        }
        info!(genres = genres.len(), "populated genres");
        Ok(genres.len())
    }

    /// Walks the discover pages and stores each movie not seen before,
    /// together with its director and top-billed cast. Returns how many
    /// movies were stored.
    pub async fn fetch_and_save_movies(&self) -> AppResult<usize> {
        let genres: HashMap<i32, String> = self
            .films
            .genres
            .get_all_genres()
            .await?
            .into_iter()
            .filter_map(|g| g.tmdb_id.map(|id| (id, g.name)))
            .collect();
        if genres.is_empty() {
            warn!("no genres stored yet, movies will be saved without genres");
        }

        let config = self.tmdb.config();
        let mut stored = 0;

        for page in 1..=config.max_pages.max(1) {
            let discovered = self.tmdb.discover_movies(page).await?;
            if discovered.results.is_empty() {
                break;
            }

            let mut fresh = Vec::with_capacity(discovered.results.len());
            for movie in discovered.results {
                if self.films.movies.find_by_imdb_id(movie.id).await?.is_some() {
                    debug!(imdb_id = movie.id, title = %movie.title, "already stored");
                    continue;
                }
                fresh.push(movie);
            }

            let with_credits: Vec<(TmdbMovie, AppResult<Credits>)> = stream::iter(fresh)
                .map(|movie| async move {
                    let credits = self.tmdb.movie_credits(movie.id).await;
                    (movie, credits)
                })
                .buffer_unordered(self.max_concurrent.max(1))
                .collect()
                .await;

            for (movie, credits) in with_credits {
                let credits = match credits {
                    Ok(credits) => credits,
                    Err(err) => {
                        warn!(imdb_id = movie.id, title = %movie.title, error = %err, "failed to fetch credits");
                        continue;
                    },
                };

                let imdb_id = movie.id;
                let new = new_movie_from_tmdb(movie, &genres, &credits, config.cast_limit);
                match self.films.movies.create_new_movie(new).await {
                    Ok(_) => stored += 1,
                    Err(err) => warn!(imdb_id = imdb_id, error = %err, "failed to store movie"),
                }
            }

            if page >= discovered.total_pages {
                break;
            }
        }

        info!(stored = stored, "fetched and saved movies");
        Ok(stored)
    }
}

/// Maps a discovered TMDB movie and its credits onto a [`NewMovie`]. Genre
/// ids without a stored name are dropped and empty dates become `None`.
pub fn new_movie_from_tmdb(
    movie: TmdbMovie,
    genres: &HashMap<i32, String>,
    credits: &Credits,
    cast_limit: usize,
) -> NewMovie {
    let matched = movie
        .genre_ids
        .iter()
        .filter_map(|id| genres.get(id).map(|name| NewGenre::new(*id, name.clone())));

    let mut builder = NewMovie::builder(movie.id, movie.title)
        .vote_average(movie.vote_average)
        .vote_count(movie.vote_count)
        .popularity(movie.popularity)
        .adult(movie.adult)
        .genres(matched)
        .actors(credits.top_billed(cast_limit));

    if let Some(date) = movie.release_date.filter(|d| !d.trim().is_empty()) {
        builder = builder.release_date(date);
    }
    if let Some(overview) = movie.overview.filter(|o| !o.trim().is_empty()) {
        builder = builder.overview(overview);
    }
    if let Some(language) = movie.original_language {
        builder = builder.original_language(language);
    }
    if let Some(title) = movie.original_title {
        builder = builder.original_title(title);
    }
    if let Some(path) = movie.backdrop_path {
        builder = builder.backdrop_path(path);
    }
    if let Some(path) = movie.poster_path {
        builder = builder.poster_path(path);
    }
    if let Some(director) = credits.director() {
        builder = builder.director(director);
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use axum::{
        Json, Router,
        extract::{Path, Query, State},
        http::{HeaderMap, StatusCode},
        routing::get,
    };
    use serde_json::{Value, json};

    use super::*;
    use crate::{
        config::TmdbConfig,
        dao::fixtures,
        db::test_db,
        tmdb::{CastMember, CrewMember},
    };

    const TOKEN: &str = "test-token";

    struct FakeTmdb {
        total_pages: u32,
        pages: Vec<Vec<Value>>,
        failing_credits: i64,
        discover_calls: AtomicU32,
    }

    fn discovered(id: i64, title: &str, genre_ids: &[i32]) -> Value {
        json!({
            "id": id,
            "title": title,
            "overview": format!("{title} handler om noget."),
            "release_date": "2021-03-04",
            "vote_average": 7.5,
            "vote_count": 120,
            "popularity": 11.0,
            "original_language": "da",
            "original_title": title,
            "genre_ids": genre_ids,
        })
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers.get("authorization").and_then(|v| v.to_str().ok()) == Some("Bearer test-token")
    }

    async fn genre_list(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
        if !authorized(&headers) {
            return Err(StatusCode::UNAUTHORIZED);
        }
        Ok(Json(json!({"genres": [{"id": 18, "name": "Drama"}, {"id": 35, "name": "Komedie"}]})))
    }

    async fn discover(
        State(fake): State<Arc<FakeTmdb>>,
        Query(params): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> Result<Json<Value>, StatusCode> {
        if !authorized(&headers) {
            return Err(StatusCode::UNAUTHORIZED);
        }
        fake.discover_calls.fetch_add(1, Ordering::SeqCst);
        let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
        let results = fake.pages.get((page as usize).saturating_sub(1)).cloned().unwrap_or_default();
        Ok(Json(json!({"page": page, "total_pages": fake.total_pages, "results": results})))
    }

    async fn credits(
        State(fake): State<Arc<FakeTmdb>>,
        Path(id): Path<i64>,
    ) -> Result<Json<Value>, StatusCode> {
        if id == fake.failing_credits {
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        Ok(Json(json!({
            "id": id,
            "cast": [{"name": format!("Skuespiller {id}"), "order": 0}],
            "crew": [{"name": "Thomas Vinterberg", "job": "Director"}],
        })))
    }

    /// Serves the three TMDB endpoints the importer uses on a random local
    /// port and returns the base URL.
    async fn serve(fake: Arc<FakeTmdb>) -> String {
        let app = Router::new()
            .route("/genre/movie/list", get(genre_list))
            .route("/discover/movie", get(discover))
            .route("/movie/{id}/credits", get(credits))
            .with_state(fake);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    fn client(base_url: String, access_token: &str) -> TmdbClient {
        let config = TmdbConfig {
            access_token: access_token.to_string(),
            base_url,
            rps: 100,
            language: "da-DK".into(),
            original_language: "da".into(),
            released_since: jiff::civil::date(2019, 1, 1),
            max_pages: 5,
            cast_limit: 10,
        };
        TmdbClient::new(wreq::Client::builder().build().unwrap(), config)
    }

    #[tokio::test]
    async fn imports_new_movies_and_skips_known_or_failing_ones() {
        let fake = Arc::new(FakeTmdb {
            total_pages: 2,
            pages: vec![
                vec![
                    discovered(1, "Druk", &[35, 18]),
                    discovered(2, "Allerede gemt", &[18]),
                    discovered(3, "Uden credits", &[18]),
                ],
                vec![discovered(4, "Ønskebørn", &[18, 9999])],
                vec![discovered(5, "Aldrig hentet", &[18])],
            ],
            failing_credits: 3,
            discover_calls: AtomicU32::new(0),
        });
        let tmdb = client(serve(fake.clone()).await, TOKEN);
        let films = FilmService::new(test_db().await);
        let known = fixtures::movie(2, "Allerede gemt", 6.0, 1.0, "2019-05-05");
        films.movies.create_new_movie(known).await.unwrap();

        let importer = Importer::new(&tmdb, &films, 2);
        assert_eq!(importer.populate_genres().await.unwrap(), 2);
        let stored = importer.fetch_and_save_movies().await.unwrap();

        assert_eq!(stored, 2);
        assert_eq!(fake.discover_calls.load(Ordering::SeqCst), 2);
        assert_eq!(films.movies.count_movies().await.unwrap(), 3);
        assert!(films.movies.find_by_imdb_id(3).await.unwrap().is_none());
        assert!(films.movies.find_by_imdb_id(5).await.unwrap().is_none());

        let known = films.movies.find_by_imdb_id(2).await.unwrap().unwrap();
        assert_eq!(known.vote_average, 6.0);

        let druk = films.movies.find_by_imdb_id(1).await.unwrap().unwrap();
        let details = films.movies.load_movie_details(druk).await.unwrap();
        assert_eq!(details.director.map(|d| d.name).as_deref(), Some("Thomas Vinterberg"));
        let genres: Vec<&str> = details.genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(genres, vec!["Drama", "Komedie"]);
        let actors: Vec<&str> = details.actors.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(actors, vec!["Skuespiller 1"]);
        assert_eq!(details.movie.release_date.as_deref(), Some("2021-03-04"));

        let found = films.movies.search_movies_by_title("ønske").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].imdb_id, 4);
    }

    #[tokio::test]
    async fn page_walk_stops_at_first_empty_page() {
        let fake = Arc::new(FakeTmdb {
            total_pages: 40,
            pages: vec![vec![discovered(7, "Kun side et", &[])]],
            failing_credits: -1,
            discover_calls: AtomicU32::new(0),
        });
        let tmdb = client(serve(fake.clone()).await, TOKEN);
        let films = FilmService::new(test_db().await);

        let stored = Importer::new(&tmdb, &films, 5).fetch_and_save_movies().await.unwrap();

        assert_eq!(stored, 1);
        assert_eq!(fake.discover_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_token_fails_before_any_request() {
        let fake = Arc::new(FakeTmdb {
            total_pages: 1,
            pages: vec![vec![discovered(8, "Aldrig", &[])]],
            failing_credits: -1,
            discover_calls: AtomicU32::new(0),
        });
        let tmdb = client(serve(fake.clone()).await, "");
        let films = FilmService::new(test_db().await);

        assert!(Importer::new(&tmdb, &films, 5).fetch_and_save_movies().await.is_err());
        assert_eq!(fake.discover_calls.load(Ordering::SeqCst), 0);
        assert_eq!(films.movies.count_movies().await.unwrap(), 0);
    }

    fn tmdb_movie(release_date: &str) -> TmdbMovie {
        TmdbMovie {
            id: 103663,
            title: "Jagten".into(),
            overview: Some("".into()),
            release_date: Some(release_date.into()),
            vote_average: 8.1,
            vote_count: 5000,
            popularity: 20.5,
            original_language: Some("da".into()),
            original_title: Some("Jagten".into()),
            backdrop_path: None,
            poster_path: Some("/poster.jpg".into()),
            adult: false,
            genre_ids: vec![18, 9999],
        }
    }

    #[test]
    fn maps_tmdb_movie_and_credits() {
        let genres = HashMap::from([(18, "Drama".to_string())]);
        let credits = Credits {
            cast: vec![
                CastMember { name: "Thomas Bo Larsen".into(), order: Some(1) },
                CastMember { name: "Mads Mikkelsen".into(), order: Some(0) },
            ],
            crew: vec![CrewMember { name: "Thomas Vinterberg".into(), job: Some("Director".into()) }],
        };

        let new = new_movie_from_tmdb(tmdb_movie("2012-01-10"), &genres, &credits, 1);

        assert_eq!(new.imdb_id, 103663);
        assert_eq!(new.release_date.as_deref(), Some("2012-01-10"));
        assert_eq!(new.overview, None);
        assert_eq!(new.genres, vec![NewGenre::new(18, "Drama")]);
        assert_eq!(new.actors, vec!["Mads Mikkelsen"]);
        assert_eq!(new.director.as_deref(), Some("Thomas Vinterberg"));
        assert_eq!(new.poster_path.as_deref(), Some("/poster.jpg"));
    }

    #[test]
    fn blank_release_date_becomes_none() {
        let new = new_movie_from_tmdb(tmdb_movie(""), &HashMap::new(), &Credits::default(), 10);

        assert_eq!(new.release_date, None);
        assert!(new.genres.is_empty());
        assert!(new.actors.is_empty());
        assert_eq!(new.director, None);
    }
}
