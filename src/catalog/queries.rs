//! Database queries for categories and amenities

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::pagination::Page;

use super::models::{CatalogEntry, CatalogKind};
use super::seeds::{self, SeedEntry};

pub async fn list(pool: &PgPool, kind: CatalogKind, page: Page) -> Result<Vec<CatalogEntry>> {
    let entries = sqlx::query_as::<_, CatalogEntry>(&format!(
        r#"
        SELECT id, name, description, created_at
        FROM {}
        ORDER BY name
        LIMIT $1 OFFSET $2
        "#,
        kind.table()
    ))
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// Ids among `ids` that exist in the catalog table
pub async fn existing_ids(pool: &PgPool, kind: CatalogKind, ids: &[Uuid]) -> Result<Vec<Uuid>> {
    let found: Vec<Uuid> = sqlx::query_scalar(&format!(
        "SELECT id FROM {} WHERE id = ANY($1)",
        kind.table()
    ))
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(found)
}

async fn names(pool: &PgPool, kind: CatalogKind) -> Result<Vec<String>> {
    let names: Vec<String> = sqlx::query_scalar(&format!("SELECT name FROM {}", kind.table()))
        .fetch_all(pool)
        .await?;
    Ok(names)
}

/// Insert seed entries missing by name; existing rows are left untouched
pub async fn sync_seeds(pool: &PgPool, kind: CatalogKind, seeds: &[SeedEntry]) -> Result<usize> {
    let existing = names(pool, kind).await?;
    let to_add = seeds::missing(seeds, &existing);

    for seed in &to_add {
        sqlx::query(&format!(
            r#"
            INSERT INTO {} (id, name, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO NOTHING
            "#,
            kind.table()
        ))
        .bind(Uuid::new_v4())
        .bind(seed.name)
        .bind(seed.description)
        .execute(pool)
        .await?;
    }

    if !to_add.is_empty() {
        info!(table = kind.table(), added = to_add.len(), "Catalog seeds synced");
    }
    Ok(to_add.len())
}

/// Sync both built-in catalogs
pub async fn sync_all(pool: &PgPool) -> Result<()> {
    sync_seeds(pool, CatalogKind::Category, seeds::CATEGORIES).await?;
    sync_seeds(pool, CatalogKind::Amenity, seeds::AMENITIES).await?;
    Ok(())
}
