use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cinedex::{config::Config, db, demo, importer::Importer, service::FilmService, tmdb::TmdbClient};

/// Catalog maintenance and console reports
#[derive(Parser)]
#[command(name = "cinedex-cli")]
#[command(about = "Populate the movie catalog from TMDB and print reports", long_about = None)]
struct Cli {
    /// Database URL, overriding DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import genres and movies from TMDB
    Populate {
        /// Only import the genre list
        #[arg(long)]
        genres_only: bool,
    },

    /// Run every catalog query and print the results
    Demo,

    /// Print how many movies are stored
    Count,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let database_url = cli.database_url.unwrap_or_else(|| config.database_url.clone());

    let db = db::connect_and_migrate(&database_url)
        .await
        .with_context(|| format!("failed to open {database_url}"))?;
    let films = FilmService::new(db);

    match cli.command {
        Commands::Populate { genres_only } => {
            let http = wreq::Client::builder().timeout(Duration::from_secs(30)).build()?;
            let tmdb = TmdbClient::new(http, config.tmdb.clone());
            let importer = Importer::new(&tmdb, &films, config.max_concurrent);

            let genres = importer.populate_genres().await.context("importing genres")?;
            println!("Genres stored: {genres}");

            if !genres_only {
                let movies = importer.fetch_and_save_movies().await.context("importing movies")?;
                println!("Movies stored: {movies}");
            }
        },
        Commands::Demo => {
            let mut stdout = std::io::stdout().lock();
            demo::run(&films, &mut stdout).await?;
        },
        Commands::Count => {
            println!("Movies in the database: {}", films.movies.count_movies().await?);
        },
    }

    Ok(())
}
