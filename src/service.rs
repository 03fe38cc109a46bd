use sea_orm::DatabaseConnection;
use tracing::debug;

use crate::{
    dao::{ActorDao, DirectorDao, GenreDao, MovieDao},
    entities::{actor, director, movie},
    error::AppResult,
};

/// Answers questions that span more than one entity type.
#[derive(Clone, Debug)]
pub struct FilmService {
    pub movies: MovieDao,
    pub genres: GenreDao,
    pub actors: ActorDao,
    pub directors: DirectorDao,
}

impl FilmService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            movies: MovieDao::new(db.clone()),
            genres: GenreDao::new(db.clone()),
            actors: ActorDao::new(db.clone()),
            directors: DirectorDao::new(db),
        }
    }

    pub async fn get_actors_by_movie_title(&self, title: &str) -> AppResult<Vec<actor::Model>> {
        let Some(movie) = self.movies.find_by_title(title).await? else {
            debug!(title = %title, "movie not found");
            return Ok(Vec::new());
        };
        self.actors.get_actors_by_movie_id(movie.id).await
    }

    pub async fn get_director_by_movie_title(
        &self,
        title: &str,
    ) -> AppResult<Option<director::Model>> {
        let Some(movie) = self.movies.find_by_title(title).await? else {
            debug!(title = %title, "movie not found");
            return Ok(None);
        };
        self.directors.get_director_by_movie_id(movie.id).await
    }

    pub async fn find_movies_by_actor(&self, name: &str) -> AppResult<Vec<movie::Model>> {
        self.movies.get_movies_by_actor(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dao::fixtures, db::test_db, models::NewMovie};

    async fn service() -> FilmService {
        let service = FilmService::new(test_db().await);
        service
            .movies
            .create_new_movie(NewMovie {
                director: Some("Thomas Vinterberg".into()),
                actors: vec!["Mads Mikkelsen".into(), "Thomas Bo Larsen".into()],
                ..fixtures::movie(1, "Jagten", 8.1, 20.0, "2012-01-10")
            })
            .await
            .unwrap();
        service
            .movies
            .create_new_movie(NewMovie {
                director: Some("Ole Christian Madsen".into()),
                actors: vec!["Anders W. Berthelsen".into()],
                ..fixtures::movie(2, "Flammen & Citronen", 7.1, 9.0, "2008-03-28")
            })
            .await
            .unwrap();
        service
            .movies
            .create_new_movie(NewMovie {
                actors: vec!["Anders W. Berthelsen".into(), "Mads Mikkelsen".into()],
                ..fixtures::movie(3, "Mifunes sidste sang", 7.0, 5.0, "1999-03-12")
            })
            .await
            .unwrap();
        service
    }

    #[tokio::test]
    async fn actors_by_title() {
        let service = service().await;

        let names: Vec<_> = service
            .get_actors_by_movie_title("Jagten")
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Mads Mikkelsen", "Thomas Bo Larsen"]);
        assert!(service.get_actors_by_movie_title("Missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn director_by_title() {
        let service = service().await;

        let director = service.get_director_by_movie_title("Jagten").await.unwrap();
        assert_eq!(director.map(|d| d.name).as_deref(), Some("Thomas Vinterberg"));
        assert!(service.get_director_by_movie_title("Mifunes sidste sang").await.unwrap().is_none());
        assert!(service.get_director_by_movie_title("Missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn movies_by_actor() {
        let service = service().await;

        let titles: Vec<_> = service
            .find_movies_by_actor("Anders W. Berthelsen")
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(titles, vec!["Mifunes sidste sang", "Flammen & Citronen"]);
    }
}
