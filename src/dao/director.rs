use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::{
    entities::{director, movie},
    error::AppResult,
};

#[derive(Clone, Debug)]
pub struct DirectorDao {
    db: DatabaseConnection,
}

impl DirectorDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, name: &str) -> AppResult<director::Model> {
        let model = director::ActiveModel { id: Default::default(), name: Set(name.to_string()) };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<director::Model>> {
        find_by_name(&self.db, name).await
    }

    pub async fn get_all_directors(&self) -> AppResult<Vec<director::Model>> {
        Ok(director::Entity::find().order_by_asc(director::Column::Name).all(&self.db).await?)
    }

    pub async fn get_director_by_movie_id(
        &self,
        movie_id: i32,
    ) -> AppResult<Option<director::Model>> {
        Ok(director::Entity::find()
            .inner_join(movie::Entity)
            .filter(movie::Column::Id.eq(movie_id))
            .one(&self.db)
            .await?)
    }

    /// Removes the director. Their movies stay, with no director.
    pub async fn delete_by_name(&self, name: &str) -> AppResult<u64> {
        let res = director::Entity::delete_many()
            .filter(director::Column::Name.eq(name))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected)
    }
}

async fn find_by_name<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> AppResult<Option<director::Model>> {
    Ok(director::Entity::find().filter(director::Column::Name.eq(name)).one(conn).await?)
}

pub(super) async fn resolve<C: ConnectionTrait>(conn: &C, name: &str) -> AppResult<director::Model> {
    if let Some(found) = find_by_name(conn, name).await? {
        return Ok(found);
    }
    let model = director::ActiveModel { id: Default::default(), name: Set(name.to_string()) };
    Ok(model.insert(conn).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::{MovieDao, fixtures},
        db::test_db,
        models::NewMovie,
    };

    #[tokio::test]
    async fn movies_share_a_director_row() {
        let db = test_db().await;
        let movies = MovieDao::new(db.clone());
        let directors = DirectorDao::new(db);

        let jagten = movies
            .create_new_movie(NewMovie {
                director: Some("Thomas Vinterberg".into()),
                ..fixtures::movie(1, "Jagten", 8.1, 20.0, "2012-01-10")
            })
            .await
            .unwrap();
        let druk = movies
            .create_new_movie(NewMovie {
                director: Some("Thomas Vinterberg".into()),
                ..fixtures::movie(2, "Druk", 7.7, 30.0, "2020-09-24")
            })
            .await
            .unwrap();

        assert_eq!(jagten.movie.director_id, druk.movie.director_id);
        assert_eq!(directors.get_all_directors().await.unwrap().len(), 1);

        let found = directors.get_director_by_movie_id(druk.movie.id).await.unwrap();
        assert_eq!(found.map(|d| d.name).as_deref(), Some("Thomas Vinterberg"));
    }

    #[tokio::test]
    async fn deleting_a_director_keeps_their_movies() {
        let db = test_db().await;
        let movies = MovieDao::new(db.clone());
        let directors = DirectorDao::new(db);

        let festen = movies
            .create_new_movie(NewMovie {
                director: Some("Thomas Vinterberg".into()),
                ..fixtures::movie(3, "Festen", 8.0, 32.4, "1998-08-21")
            })
            .await
            .unwrap();

        assert_eq!(directors.delete_by_name("Thomas Vinterberg").await.unwrap(), 1);

        let kept = movies.find_by_id(festen.movie.id).await.unwrap().unwrap();
        assert_eq!(kept.director_id, None);
        assert!(directors.get_director_by_movie_id(kept.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_and_find() {
        let directors = DirectorDao::new(test_db().await);
        let created = directors.create("Susanne Bier").await.unwrap();
        assert_eq!(directors.find_by_name("Susanne Bier").await.unwrap(), Some(created));
        assert!(directors.find_by_name("Lars von Trier").await.unwrap().is_none());
    }
}
