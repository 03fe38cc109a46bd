//! One accessor per entity type. Every filter, ordering, page and aggregate
//! is expressed as a sea-orm query; nothing is sorted or counted in memory.

mod actor;
mod director;
mod genre;
mod movie;

pub use actor::ActorDao;
pub use director::DirectorDao;
pub use genre::GenreDao;
pub use movie::MovieDao;

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{NewGenre, NewMovie};

    pub fn movie(imdb_id: i64, title: &str, rating: f64, popularity: f64, date: &str) -> NewMovie {
        NewMovie::builder(imdb_id, title)
            .overview(format!("{title} is a film used in tests."))
            .release_date(date)
            .vote_average(rating)
            .vote_count(100)
            .popularity(popularity)
            .original_language("da")
            .build()
    }

    pub fn drama(imdb_id: i64, title: &str) -> NewMovie {
        NewMovie {
            genres: vec![NewGenre::new(18, "Drama")],
            ..movie(imdb_id, title, 7.0, 10.0, "2020-05-01")
        }
    }
}
