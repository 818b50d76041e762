//! Property service functions with database access.

use std::collections::HashMap;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::cache::AppCache;
use crate::catalog::{queries as catalog_queries, CatalogKind};
use crate::error::{AppError, Result};
use crate::pagination::Page;
use crate::reservations::models::ReservationFilter;
use crate::reservations::ReservationService;

use super::models::{
    CatalogRef, NewProperty, Property, PropertyAmenityRow, PropertyChanges, PropertyDetails,
    PropertyFilter, PropertyRow, PublicProperty,
};
use super::queries;

/// Ids of `requested` that are not in `found`, in request order
pub fn missing_ids(requested: &[Uuid], found: &[Uuid]) -> Vec<Uuid> {
    requested
        .iter()
        .filter(|id| !found.contains(id))
        .copied()
        .collect()
}

/// Reject unknown category or amenity ids with a 400
pub async fn validate_catalog_refs(
    pool: &PgPool,
    category_id: Option<Uuid>,
    amenity_ids: Option<&[Uuid]>,
) -> Result<()> {
    if let Some(category_id) = category_id {
        let found = catalog_queries::existing_ids(pool, CatalogKind::Category, &[category_id]).await?;
        if found.is_empty() {
            return Err(AppError::Validation(format!(
                "Category id {} not found",
                category_id
            )));
        }
    }

    if let Some(ids) = amenity_ids.filter(|ids| !ids.is_empty()) {
        let found = catalog_queries::existing_ids(pool, CatalogKind::Amenity, ids).await?;
        let missing = missing_ids(ids, &found);
        if !missing.is_empty() {
            let list: Vec<String> = missing.iter().map(Uuid::to_string).collect();
            return Err(AppError::Validation(format!(
                "Amenities not found: {}",
                list.join(", ")
            )));
        }
    }

    Ok(())
}

fn group_amenities(rows: Vec<PropertyAmenityRow>) -> HashMap<Uuid, Vec<CatalogRef>> {
    let mut grouped: HashMap<Uuid, Vec<CatalogRef>> = HashMap::new();
    for row in rows {
        grouped.entry(row.property_id).or_default().push(CatalogRef {
            id: row.id,
            name: row.name,
            description: row.description,
        });
    }
    grouped
}

async fn load_amenities(
    pool: &PgPool,
    rows: &[PropertyRow],
) -> Result<HashMap<Uuid, Vec<CatalogRef>>> {
    let ids: Vec<Uuid> = rows.iter().map(|r| r.property.id).collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(group_amenities(queries::amenities_for(pool, &ids).await?))
}

async fn find_row_or_fail(pool: &PgPool, property_id: Uuid) -> Result<PropertyRow> {
    queries::find_row(pool, property_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Property id {} not found", property_id)))
}

/// Owner id of a property, 404 if it does not exist
pub async fn owner_of(pool: &PgPool, property_id: Uuid) -> Result<Uuid> {
    Ok(find_row_or_fail(pool, property_id).await?.property.creator_id)
}

pub async fn create(
    pool: &PgPool,
    new: NewProperty,
    amenity_ids: Option<Vec<Uuid>>,
) -> Result<Property> {
    validate_catalog_refs(pool, Some(new.category_id), amenity_ids.as_deref()).await?;

    let mut tx = pool.begin().await?;
    let property = queries::insert_property(&mut *tx, &new).await?;
    if let Some(ids) = amenity_ids.as_deref() {
        queries::replace_amenities(&mut tx, property.id, ids).await?;
    }
    tx.commit().await?;

    info!(property_id = %property.id, creator_id = %property.creator_id, "Property created");
    Ok(property)
}

pub async fn update(
    pool: &PgPool,
    cache: &AppCache,
    property_id: Uuid,
    changes: PropertyChanges,
    amenity_ids: Option<Vec<Uuid>>,
) -> Result<Property> {
    validate_catalog_refs(pool, changes.category_id, amenity_ids.as_deref()).await?;

    let mut tx = pool.begin().await?;
    let property = queries::update_property(&mut *tx, property_id, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Property id {} not found", property_id)))?;
    if let Some(ids) = amenity_ids.as_deref() {
        queries::replace_amenities(&mut tx, property_id, ids).await?;
    }
    tx.commit().await?;

    cache.invalidate_property(property_id).await;
    info!(%property_id, "Property updated");
    Ok(property)
}

pub async fn delete(pool: &PgPool, cache: &AppCache, property_id: Uuid) -> Result<()> {
    if !queries::delete_property(pool, property_id).await? {
        return Err(AppError::NotFound(format!(
            "Property id {} not found",
            property_id
        )));
    }

    cache.invalidate_property(property_id).await;
    info!(%property_id, "Property deleted");
    Ok(())
}

pub async fn list_public(
    pool: &PgPool,
    filter: &PropertyFilter,
    page: Page,
) -> Result<Vec<PublicProperty>> {
    let rows = queries::list_rows(pool, filter, page).await?;
    let mut amenities = load_amenities(pool, &rows).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let list = amenities.remove(&row.property.id).unwrap_or_default();
            row.into_public(list)
        })
        .collect())
}

pub async fn find_public(pool: &PgPool, property_id: Uuid) -> Result<PublicProperty> {
    let row = find_row_or_fail(pool, property_id).await?;
    let mut amenities = load_amenities(pool, std::slice::from_ref(&row)).await?;
    let list = amenities.remove(&property_id).unwrap_or_default();
    Ok(row.into_public(list))
}

async fn with_details(
    pool: &PgPool,
    reservations: &ReservationService,
    rows: Vec<PropertyRow>,
) -> Result<Vec<PropertyDetails>> {
    let mut amenities = load_amenities(pool, &rows).await?;
    let mut details = Vec::with_capacity(rows.len());

    for row in rows {
        let id = row.property.id;
        let booked = reservations.list(ReservationFilter::Property(id)).await?;
        let list = amenities.remove(&id).unwrap_or_default();
        details.push(row.into_details(list, booked));
    }
    Ok(details)
}

pub async fn find_full(
    pool: &PgPool,
    reservations: &ReservationService,
    property_id: Uuid,
) -> Result<PropertyDetails> {
    let row = find_row_or_fail(pool, property_id).await?;
    let mut details = with_details(pool, reservations, vec![row]).await?;
    details
        .pop()
        .ok_or_else(|| AppError::Internal("Property details missing".to_string()))
}

pub async fn list_mine(
    pool: &PgPool,
    reservations: &ReservationService,
    owner_id: Uuid,
    page: Page,
) -> Result<Vec<PropertyDetails>> {
    let rows = queries::list_rows_by_creator(pool, owner_id, page).await?;
    with_details(pool, reservations, rows).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_ids_keeps_request_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        assert_eq!(missing_ids(&[a, b, c], &[b]), vec![a, c]);
        assert!(missing_ids(&[a], &[a]).is_empty());
    }

    #[test]
    fn test_group_amenities_by_property() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let row = |property_id, name: &str| PropertyAmenityRow {
            property_id,
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
        };

        let grouped = group_amenities(vec![
            row(p1, "beekeeping"),
            row(p2, "chicken_coop"),
            row(p1, "pig_feeding"),
        ]);

        assert_eq!(grouped[&p1].len(), 2);
        assert_eq!(grouped[&p2][0].name, "chicken_coop");
    }
}
