use std::io::Write;

use crate::{
    entities::movie,
    models::{NewGenre, NewMovie},
    report::format_movie_details,
    service::FilmService,
};

const SHOWCASE_TITLE: &str = "Jagten";
const SHOWCASE_ACTOR: &str = "Anders W. Berthelsen";

/// The movie the demo deletes and recreates on every run.
pub fn festen() -> NewMovie {
    NewMovie::builder(1234567, "Festen")
        .overview(
            "Family and friends gather to celebrate Helge's 60th birthday. During dinner the \
             eldest son gives a speech that reveals a terrible family secret, and as the evening \
             goes on the grim past is peeled back layer by layer.",
        )
        .release_date("1998-08-21")
        .vote_average(8.0)
        .vote_count(43000)
        .popularity(32.432)
        .original_language("da")
        .original_title("Festen")
        .backdrop_path("/path/to/backdrop.jpg")
        .poster_path("/path/to/poster.jpg")
        .adult(false)
        .director("Thomas Vinterberg")
        .genres([NewGenre::new(18, "Drama"), NewGenre::new(53, "Thriller")])
        .actors(["Ulrich Thomsen", "Henning Moritzen"])
        .build()
}

/// Exercises every accessor and service query against the catalog and
/// prints the results.
pub async fn run(films: &FilmService, out: &mut impl Write) -> anyhow::Result<()> {
    let movies = &films.movies;

    writeln!(out, "Movies in the database: {}", movies.count_movies().await?)?;

    let deleted = movies.delete_by_title("Festen").await?;
    tracing::debug!(deleted = deleted, "removed previous demo movie");

    let created = movies.create_new_movie(festen()).await?;
    writeln!(out, "Movie added: {}", created.movie.title)?;

    writeln!(out, "\nMovies in the Drama genre:\n")?;
    print_movies(films, out, movies.get_movies_by_genre("Drama").await?).await?;

    writeln!(out, "\nMovies rated 8.0 or higher:\n")?;
    print_movies(films, out, movies.get_movies_by_rating(8.0).await?).await?;

    writeln!(out, "\nMovies from 2020:\n")?;
    print_movies(films, out, movies.get_movies_by_release_year(2020).await?).await?;

    writeln!(out, "\nActors appearing in '{SHOWCASE_TITLE}':\n")?;
    for actor in films.get_actors_by_movie_title(SHOWCASE_TITLE).await? {
        writeln!(out, "Actor: {}", actor.name)?;
    }

    let director = films.get_director_by_movie_title(SHOWCASE_TITLE).await?;
    writeln!(
        out,
        "\nDirector of '{SHOWCASE_TITLE}': {}",
        director.map(|d| d.name).unwrap_or_else(|| "Unknown".to_string())
    )?;

    writeln!(out, "\nMovies featuring '{SHOWCASE_ACTOR}':\n")?;
    for movie in films.find_movies_by_actor(SHOWCASE_ACTOR).await? {
        writeln!(out, "- {}", movie.title)?;
    }

    if movies.update_movie_release_date(SHOWCASE_TITLE, "2024-01-01").await?.is_none() {
        writeln!(out, "\n'{SHOWCASE_TITLE}' not found, release date left alone")?;
    }

    writeln!(out, "\nMovies with 'Under' in the title:\n")?;
    print_movies(films, out, movies.search_movies_by_title("Under").await?).await?;

    match movies.get_total_average_rating().await? {
        Some(average) => {
            writeln!(out, "\nAverage rating across all movies: {average:.1}")?
        },
        None => writeln!(out, "\nAverage rating across all movies: no movies")?,
    }

    writeln!(out, "\nTop 10 lowest rated movies:\n")?;
    for movie in movies.get_top10_lowest_rated_movies().await? {
        writeln!(out, "{} - Rating: {}", movie.title, movie.vote_average)?;
    }

    writeln!(out, "\nTop 10 highest rated movies:\n")?;
    for movie in movies.get_top10_highest_rated_movies().await? {
        writeln!(out, "{} - Rating: {}", movie.title, movie.vote_average)?;
    }

    writeln!(out, "\nTop 10 most popular movies:\n")?;
    for movie in movies.get_top10_most_popular_movies().await? {
        writeln!(out, "{} - Popularity: {}", movie.title, movie.popularity)?;
    }

    Ok(())
}

async fn print_movies(
    films: &FilmService,
    out: &mut impl Write,
    movies: Vec<movie::Model>,
) -> anyhow::Result<()> {
    for details in films.movies.load_details(movies).await? {
        write!(out, "{}", format_movie_details(&details))?;
    }
    Ok(())
}
