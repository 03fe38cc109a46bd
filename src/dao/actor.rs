use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::{
    entities::{actor, movie},
    error::AppResult,
};

#[derive(Clone, Debug)]
pub struct ActorDao {
    db: DatabaseConnection,
}

impl ActorDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, name: &str) -> AppResult<actor::Model> {
        let model = actor::ActiveModel { id: Default::default(), name: Set(name.to_string()) };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<actor::Model>> {
        find_by_name(&self.db, name).await
    }

    pub async fn get_all_actors(&self) -> AppResult<Vec<actor::Model>> {
        Ok(actor::Entity::find().order_by_asc(actor::Column::Name).all(&self.db).await?)
    }

    pub async fn get_actors_by_movie_id(&self, movie_id: i32) -> AppResult<Vec<actor::Model>> {
        Ok(actor::Entity::find()
            .inner_join(movie::Entity)
            .filter(movie::Column::Id.eq(movie_id))
            .order_by_asc(actor::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Removes the actor; cast memberships go with it.
    pub async fn delete_by_name(&self, name: &str) -> AppResult<u64> {
        let res = actor::Entity::delete_many()
            .filter(actor::Column::Name.eq(name))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected)
    }
}

async fn find_by_name<C: ConnectionTrait>(conn: &C, name: &str) -> AppResult<Option<actor::Model>> {
    Ok(actor::Entity::find().filter(actor::Column::Name.eq(name)).one(conn).await?)
}

pub(super) async fn resolve<C: ConnectionTrait>(conn: &C, name: &str) -> AppResult<actor::Model> {
    if let Some(found) = find_by_name(conn, name).await? {
        return Ok(found);
    }
    let model = actor::ActiveModel { id: Default::default(), name: Set(name.to_string()) };
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
    async fn actors_for_a_movie() {
        let db = test_db().await;
        let movies = MovieDao::new(db.clone());
        let actors = ActorDao::new(db);

        let jagten = movies
            .create_new_movie(NewMovie {
                actors: vec!["Thomas Bo Larsen".into(), "Mads Mikkelsen".into()],
                ..fixtures::movie(1, "Jagten", 8.1, 20.0, "2012-01-10")
            })
            .await
            .unwrap();
        movies
            .create_new_movie(NewMovie {
                actors: vec!["Mads Mikkelsen".into()],
                ..fixtures::movie(2, "Druk", 7.7, 30.0, "2020-09-24")
            })
            .await
            .unwrap();

        let cast: Vec<_> = actors
            .get_actors_by_movie_id(jagten.movie.id)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(cast, vec!["Mads Mikkelsen", "Thomas Bo Larsen"]);
        assert_eq!(actors.get_all_actors().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn create_find_delete() {
        let actors = ActorDao::new(test_db().await);

        let created = actors.create("Trine Dyrholm").await.unwrap();
        assert_eq!(actors.find_by_name("Trine Dyrholm").await.unwrap(), Some(created));
        assert!(actors.create("Trine Dyrholm").await.is_err());

        assert_eq!(actors.delete_by_name("Trine Dyrholm").await.unwrap(), 1);
        assert!(actors.find_by_name("Trine Dyrholm").await.unwrap().is_none());
    }
}
