use std::net::SocketAddr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub tmdb: TmdbConfig,
    pub max_concurrent: usize,
}

/// Settings for the one-shot TMDB import.
#[derive(Clone, Debug)]
pub struct TmdbConfig {
    pub access_token: String,
    pub base_url: String,
    pub rps: u32,
    pub language: String,
    pub original_language: String,
    pub released_since: jiff::civil::Date,
    pub max_pages: u32,
    pub cast_limit: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "7070".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://cinedex.db?mode=rwc".to_string());

        let max_concurrent: usize =
            std::env::var("MAX_CONCURRENT_REQUESTS").ok().and_then(|s| s.parse().ok()).unwrap_or(5);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            tmdb: TmdbConfig::from_env()?,
            max_concurrent,
        })
    }
}

impl TmdbConfig {
    fn from_env() -> anyhow::Result<Self> {
        let access_token = std::env::var("TMDB_ACCESS_TOKEN").unwrap_or_default();
        let base_url = std::env::var("TMDB_BASE_URL")
            .unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string());

        let rps: u32 = std::env::var("TMDB_RPS").ok().and_then(|s| s.parse().ok()).unwrap_or(4);

        let language = std::env::var("TMDB_LANGUAGE").unwrap_or_else(|_| "da-DK".to_string());
        let original_language =
            std::env::var("TMDB_ORIGINAL_LANGUAGE").unwrap_or_else(|_| "da".to_string());

        let released_since = std::env::var("TMDB_RELEASED_SINCE")
            .unwrap_or_else(|_| "2019-01-01".to_string())
            .parse()
            .context("TMDB_RELEASED_SINCE")?;

        let max_pages: u32 =
            std::env::var("TMDB_MAX_PAGES").ok().and_then(|s| s.parse().ok()).unwrap_or(5);
        let cast_limit: usize =
            std::env::var("TMDB_CAST_LIMIT").ok().and_then(|s| s.parse().ok()).unwrap_or(10);

        Ok(Self {
            access_token,
            base_url,
            rps,
            language,
            original_language,
            released_since,
            max_pages,
            cast_limit,
        })
    }
}
