use std::{num::NonZeroU32, sync::Arc};

use anyhow::anyhow;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{config::TmdbConfig, error::AppResult};

pub struct TmdbClient {
    client: wreq::Client,
    config: TmdbConfig,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(client: wreq::Client, config: TmdbConfig) -> Self {
        if config.access_token.trim().is_empty() {
            tracing::warn!("no TMDB_ACCESS_TOKEN provided, imports will fail");
        }

        let rps = NonZeroU32::new(config.rps.max(1)).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rps)));
        Self { client, config, limiter }
    }

    pub fn config(&self) -> &TmdbConfig {
        &self.config
    }

    pub async fn movie_genres(&self) -> AppResult<Vec<TmdbGenre>> {
        let resp: GenreList =
            self.get("/genre/movie/list", &[("language", self.config.language.clone())]).await?;
        debug!(genres = resp.genres.len(), "fetched TMDB genres");
        Ok(resp.genres)
    }

    /// One page of `/discover/movie`, restricted to the configured original
    /// language and minimum release date, most popular first.
    pub async fn discover_movies(&self, page: u32) -> AppResult<DiscoverPage> {
        let query = [
            ("language", self.config.language.clone()),
            ("with_original_language", self.config.original_language.clone()),
            ("primary_release_date.gte", self.config.released_since.to_string()),
            ("sort_by", "popularity.desc".to_string()),
            ("include_adult", "false".to_string()),
            ("page", page.to_string()),
        ];
        let resp: DiscoverPage = self.get("/discover/movie", &query).await?;
        debug!(
            page = resp.page,
            total_pages = resp.total_pages,
            results = resp.results.len(),
            "fetched discover page"
        );
        Ok(resp)
    }

    pub async fn movie_credits(&self, tmdb_id: i64) -> AppResult<Credits> {
        self.get(&format!("/movie/{tmdb_id}/credits"), &[]).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> AppResult<T> {
        if self.config.access_token.trim().is_empty() {
            return Err(anyhow!("TMDB_ACCESS_TOKEN is required to talk to TMDB").into());
        }

        self.limiter.until_ready().await;

        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.config.access_token)
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct TmdbGenre {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct GenreList {
    genres: Vec<TmdbGenre>,
}

#[derive(Debug, Deserialize)]
pub struct DiscoverPage {
    pub page: u32,
    pub total_pages: u32,
    pub results: Vec<TmdbMovie>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TmdbMovie {
    pub id: i64,
    pub title: String,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: i32,
    #[serde(default)]
    pub popularity: f64,
    pub original_language: Option<String>,
    pub original_title: Option<String>,
    pub backdrop_path: Option<String>,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub adult: bool,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CastMember {
    pub name: String,
    pub order: Option<i32>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CrewMember {
    pub name: String,
    pub job: Option<String>,
}

impl Credits {
    pub fn director(&self) -> Option<&str> {
        self.crew
            .iter()
            .find(|c| c.job.as_deref() == Some("Director"))
            .map(|c| c.name.as_str())
    }

    /// Cast names in billing order, at most `limit` of them.
    pub fn top_billed(&self, limit: usize) -> Vec<String> {
        let mut cast: Vec<&CastMember> = self.cast.iter().collect();
        cast.sort_by_key(|c| c.order.unwrap_or(i32::MAX));
        cast.into_iter().take(limit).map(|c| c.name.clone()).collect()
    }
}
