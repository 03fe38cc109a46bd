use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use crate::{entities::genre, error::AppResult, models::NewGenre};

#[derive(Clone, Debug)]
pub struct GenreDao {
    db: DatabaseConnection,
}

impl GenreDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, genre: &NewGenre) -> AppResult<genre::Model> {
        let model = genre::ActiveModel {
            id: Default::default(),
            tmdb_id: Set(genre.tmdb_id),
            name: Set(genre.name.clone()),
        };
        Ok(model.insert(&self.db).await?)
    }

    /// Inserts the genre or refreshes the name stored for its TMDB id.
    pub async fn upsert(&self, tmdb_id: i32, name: &str) -> AppResult<genre::Model> {
        let existing = match self.find_by_tmdb_id(tmdb_id).await? {
            Some(found) => Some(found),
            None => self.find_by_name(name).await?,
        };

        let Some(existing) = existing else {
            debug!(tmdb_id = tmdb_id, name = %name, "inserting genre");
            return self.create(&NewGenre::new(tmdb_id, name)).await;
        };

        if existing.tmdb_id == Some(tmdb_id) && existing.name == name {
            return Ok(existing);
        }

        let mut active: genre::ActiveModel = existing.into();
        active.tmdb_id = Set(Some(tmdb_id));
        active.name = Set(name.to_string());
        Ok(active.update(&self.db).await?)
    }

    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<genre::Model>> {
        find_by_name(&self.db, name).await
    }

    pub async fn find_by_tmdb_id(&self, tmdb_id: i32) -> AppResult<Option<genre::Model>> {
        find_by_tmdb_id(&self.db, tmdb_id).await
    }

    pub async fn find_by_tmdb_ids(&self, tmdb_ids: &[i32]) -> AppResult<Vec<genre::Model>> {
        if tmdb_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(genre::Entity::find()
            .filter(genre::Column::TmdbId.is_in(tmdb_ids.iter().copied()))
            .order_by_asc(genre::Column::Name)
            .all(&self.db)
            .await?)
    }

    pub async fn get_all_genres(&self) -> AppResult<Vec<genre::Model>> {
        Ok(genre::Entity::find().order_by_asc(genre::Column::Name).all(&self.db).await?)
    }

    pub async fn count_genres(&self) -> AppResult<u64> {
        Ok(genre::Entity::find().count(&self.db).await?)
    }

    pub async fn delete_by_name(&self, name: &str) -> AppResult<u64> {
        let res = genre::Entity::delete_many()
            .filter(genre::Column::Name.eq(name))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected)
    }
}

async fn find_by_name<C: ConnectionTrait>(conn: &C, name: &str) -> AppResult<Option<genre::Model>> {
    Ok(genre::Entity::find().filter(genre::Column::Name.eq(name)).one(conn).await?)
}

async fn find_by_tmdb_id<C: ConnectionTrait>(
    conn: &C,
    tmdb_id: i32,
) -> AppResult<Option<genre::Model>> {
    Ok(genre::Entity::find().filter(genre::Column::TmdbId.eq(tmdb_id)).one(conn).await?)
}

/// Looks the genre up by TMDB id, then by name, inserting it when neither
/// matches.
pub(super) async fn resolve<C: ConnectionTrait>(
    conn: &C,
    genre: &NewGenre,
) -> AppResult<genre::Model> {
    if let Some(tmdb_id) = genre.tmdb_id {
        if let Some(found) = find_by_tmdb_id(conn, tmdb_id).await? {
            return Ok(found);
        }
    }
    if let Some(found) = find_by_name(conn, &genre.name).await? {
        return Ok(found);
    }

    let model = genre::ActiveModel {
        id: Default::default(),
        tmdb_id: Set(genre.tmdb_id),
        name: Set(genre.name.clone()),
    };
    Ok(model.insert(conn).await?)
}
