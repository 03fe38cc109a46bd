use serde::Serialize;

use crate::entities::{actor, director, genre, movie};

/// A genre attached to a movie being created. Resolved against stored genres
/// by TMDB id first, then by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewGenre {
    pub tmdb_id: Option<i32>,
    pub name: String,
}

impl NewGenre {
    pub fn new(tmdb_id: i32, name: impl Into<String>) -> Self {
        Self { tmdb_id: Some(tmdb_id), name: name.into() }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self { tmdb_id: None, name: name.into() }
    }
}

/// Everything needed to persist a movie along with its director, genres and
/// actors. Build one with [`NewMovie::builder`].
#[derive(Clone, Debug, PartialEq)]
pub struct NewMovie {
    pub imdb_id: i64,
    pub title: String,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub vote_count: i32,
    pub popularity: f64,
    pub original_language: Option<String>,
    pub original_title: Option<String>,
    pub backdrop_path: Option<String>,
    pub poster_path: Option<String>,
    pub adult: bool,
    pub director: Option<String>,
    pub genres: Vec<NewGenre>,
    pub actors: Vec<String>,
}

impl NewMovie {
    pub fn builder(imdb_id: i64, title: impl Into<String>) -> NewMovieBuilder {
        NewMovieBuilder {
            movie: NewMovie {
                imdb_id,
                title: title.into(),
                overview: None,
                release_date: None,
                vote_average: 0.0,
                vote_count: 0,
                popularity: 0.0,
                original_language: None,
                original_title: None,
                backdrop_path: None,
                poster_path: None,
                adult: false,
                director: None,
                genres: Vec::new(),
                actors: Vec::new(),
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewMovieBuilder {
    movie: NewMovie,
}

impl NewMovieBuilder {
    pub fn overview(mut self, overview: impl Into<String>) -> Self {
        self.movie.overview = Some(overview.into());
        self
    }

    pub fn release_date(mut self, date: impl Into<String>) -> Self {
        self.movie.release_date = Some(date.into());
        self
    }

    pub fn vote_average(mut self, vote_average: f64) -> Self {
        self.movie.vote_average = vote_average;
        self
    }

    pub fn vote_count(mut self, vote_count: i32) -> Self {
        self.movie.vote_count = vote_count;
        self
    }

    pub fn popularity(mut self, popularity: f64) -> Self {
        self.movie.popularity = popularity;
        self
    }

    pub fn original_language(mut self, language: impl Into<String>) -> Self {
        self.movie.original_language = Some(language.into());
        self
    }

    pub fn original_title(mut self, title: impl Into<String>) -> Self {
        self.movie.original_title = Some(title.into());
        self
    }

    pub fn backdrop_path(mut self, path: impl Into<String>) -> Self {
        self.movie.backdrop_path = Some(path.into());
        self
    }

    pub fn poster_path(mut self, path: impl Into<String>) -> Self {
        self.movie.poster_path = Some(path.into());
        self
    }

    pub fn adult(mut self, adult: bool) -> Self {
        self.movie.adult = adult;
        self
    }

    pub fn director(mut self, name: impl Into<String>) -> Self {
        self.movie.director = Some(name.into());
        self
    }

    pub fn genre(mut self, genre: NewGenre) -> Self {
        self.movie.genres.push(genre);
        self
    }

    pub fn genres(mut self, genres: impl IntoIterator<Item = NewGenre>) -> Self {
        self.movie.genres.extend(genres);
        self
    }

    pub fn actor(mut self, name: impl Into<String>) -> Self {
        self.movie.actors.push(name.into());
        self
    }

    pub fn actors<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.movie.actors.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> NewMovie {
        self.movie
    }
}

/// A stored movie with its associations loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct MovieDetails {
    pub movie: movie::Model,
    pub director: Option<director::Model>,
    pub genres: Vec<genre::Model>,
    pub actors: Vec<actor::Model>,
}

/// The JSON shape served by the HTTP API.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MovieApi {
    pub id: i32,
    pub imdb_id: i64,
    pub title: String,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub vote_count: i32,
    pub popularity: f64,
    pub original_language: Option<String>,
    pub original_title: Option<String>,
    pub backdrop_path: Option<String>,
    pub poster_path: Option<String>,
    pub adult: bool,
    pub director: Option<String>,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
}

impl From<MovieDetails> for MovieApi {
    fn from(details: MovieDetails) -> Self {
        let MovieDetails { movie, director, genres, actors } = details;

        let mut genres: Vec<String> = genres.into_iter().map(|g| g.name).collect();
        genres.sort();
        let mut actors: Vec<String> = actors.into_iter().map(|a| a.name).collect();
        actors.sort();

        Self {
            id: movie.id,
            imdb_id: movie.imdb_id,
            title: movie.title,
            overview: movie.overview,
            release_date: movie.release_date,
            vote_average: movie.vote_average,
            vote_count: movie.vote_count,
            popularity: movie.popularity,
            original_language: movie.original_language,
            original_title: movie.original_title,
            backdrop_path: movie.backdrop_path,
            poster_path: movie.poster_path,
            adult: movie.adult,
            director: director.map(|d| d.name),
            genres,
            actors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_associations() {
        let movie = NewMovie::builder(42, "Festen")
            .release_date("1998-08-21")
            .vote_average(8.0)
            .director("Thomas Vinterberg")
            .genre(NewGenre::new(18, "Drama"))
            .genre(NewGenre::named("Thriller"))
            .actors(["Ulrich Thomsen", "Henning Moritzen"])
            .build();

        assert_eq!(movie.title, "Festen");
        assert_eq!(movie.release_date.as_deref(), Some("1998-08-21"));
        assert_eq!(movie.director.as_deref(), Some("Thomas Vinterberg"));
        assert_eq!(movie.genres.len(), 2);
        assert_eq!(movie.genres[1].tmdb_id, None);
        assert_eq!(movie.actors, vec!["Ulrich Thomsen", "Henning Moritzen"]);
        assert!(!movie.adult);
    }

    #[test]
    fn api_shape_sorts_names_and_flattens_director() {
        let details = MovieDetails {
            movie: movie::Model {
                id: 1,
                imdb_id: 7,
                title: "Jagten".into(),
                title_folded: "jagten".into(),
                overview: None,
                release_date: Some("2012-01-10".into()),
                vote_average: 8.1,
                vote_count: 10,
                popularity: 3.5,
                original_language: Some("da".into()),
                original_title: None,
                backdrop_path: None,
                poster_path: None,
                adult: false,
                director_id: Some(3),
            },
            director: Some(director::Model { id: 3, name: "Thomas Vinterberg".into() }),
            genres: vec![
                genre::Model { id: 2, tmdb_id: Some(53), name: "Thriller".into() },
                genre::Model { id: 1, tmdb_id: Some(18), name: "Drama".into() },
            ],
            actors: vec![actor::Model { id: 9, name: "Mads Mikkelsen".into() }],
        };

        let api = MovieApi::from(details);
        assert_eq!(api.director.as_deref(), Some("Thomas Vinterberg"));
        assert_eq!(api.genres, vec!["Drama", "Thriller"]);

        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["imdb_id"], 7);
        assert_eq!(json["actors"][0], "Mads Mikkelsen");
    }
}
