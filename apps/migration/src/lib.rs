//! Database schema for the blog.

pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_authors;
mod m20240601_000002_create_posts;
mod m20240601_000003_create_comments;
mod m20240601_000004_enable_title_search;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_authors::Migration),
            Box::new(m20240601_000002_create_posts::Migration),
            Box::new(m20240601_000003_create_comments::Migration),
            Box::new(m20240601_000004_enable_title_search::Migration),
        ]
    }
}
