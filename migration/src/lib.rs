pub use sea_orm_migration::prelude::*;

mod m20241016_000001_create_catalog;
mod m20241016_000002_create_movie_links;
mod m20241016_000003_add_movie_title_folded;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241016_000001_create_catalog::Migration),
            Box::new(m20241016_000002_create_movie_links::Migration),
            Box::new(m20241016_000003_add_movie_title_folded::Migration),
        ]
    }
}
