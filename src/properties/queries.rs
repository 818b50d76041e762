//! Database queries for properties

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::pagination::Page;

use super::models::{
    NewProperty, Property, PropertyAmenityRow, PropertyChanges, PropertyFilter, PropertyRow,
};

const PROPERTY_COLUMNS: &str = r#"
    id, name, tag_line, description, price, cover_url, guests, bedrooms, beds, baths,
    country_code, category_id, creator_id, total_nights_booked, total_income,
    created_at, updated_at
"#;

const ROW_SELECT: &str = r#"
    SELECT
        p.id, p.name, p.tag_line, p.description, p.price, p.cover_url,
        p.guests, p.bedrooms, p.beds, p.baths, p.country_code,
        p.category_id, p.creator_id, p.total_nights_booked, p.total_income,
        p.created_at, p.updated_at,
        c.name AS category_name,
        c.description AS category_description,
        u.username AS creator_username,
        u.email AS creator_email
    FROM properties p
    JOIN categories c ON c.id = p.category_id
    JOIN users u ON u.id = p.creator_id
"#;

/// Escape LIKE wildcards so user input matches literally
pub fn like_pattern(input: &str) -> String {
    let escaped = input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

pub async fn insert_property<'e, E>(executor: E, new: &NewProperty) -> Result<Property>
where
    E: PgExecutor<'e>,
{
    let property = sqlx::query_as::<_, Property>(&format!(
        r#"
        INSERT INTO properties (
            id, name, tag_line, description, price, cover_url, guests,
            bedrooms, beds, baths, country_code, category_id, creator_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING {}
        "#,
        PROPERTY_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&new.name)
    .bind(&new.tag_line)
    .bind(&new.description)
    .bind(new.price)
    .bind(&new.cover_url)
    .bind(new.guests)
    .bind(new.bedrooms)
    .bind(new.beds)
    .bind(new.baths)
    .bind(&new.country_code)
    .bind(new.category_id)
    .bind(new.creator_id)
    .fetch_one(executor)
    .await?;

    Ok(property)
}

/// Apply the non-`None` fields of `changes`
pub async fn update_property<'e, E>(
    executor: E,
    property_id: Uuid,
    changes: &PropertyChanges,
) -> Result<Option<Property>>
where
    E: PgExecutor<'e>,
{
    let property = sqlx::query_as::<_, Property>(&format!(
        r#"
        UPDATE properties SET
            name = COALESCE($2, name),
            tag_line = COALESCE($3, tag_line),
            description = COALESCE($4, description),
            price = COALESCE($5, price),
            cover_url = COALESCE($6, cover_url),
            guests = COALESCE($7, guests),
            bedrooms = COALESCE($8, bedrooms),
            beds = COALESCE($9, beds),
            baths = COALESCE($10, baths),
            country_code = COALESCE($11, country_code),
            category_id = COALESCE($12, category_id),
            updated_at = now()
        WHERE id = $1
        RETURNING {}
        "#,
        PROPERTY_COLUMNS
    ))
    .bind(property_id)
    .bind(&changes.name)
    .bind(&changes.tag_line)
    .bind(&changes.description)
    .bind(changes.price)
    .bind(&changes.cover_url)
    .bind(changes.guests)
    .bind(changes.bedrooms)
    .bind(changes.beds)
    .bind(changes.baths)
    .bind(&changes.country_code)
    .bind(changes.category_id)
    .fetch_optional(executor)
    .await?;

    Ok(property)
}

/// Replace the amenity set of a property
pub async fn replace_amenities(
    conn: &mut sqlx::PgConnection,
    property_id: Uuid,
    amenity_ids: &[Uuid],
) -> Result<()> {
    sqlx::query("DELETE FROM property_amenities WHERE property_id = $1")
        .bind(property_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO property_amenities (property_id, amenity_id)
        SELECT $1, UNNEST($2::uuid[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(property_id)
    .bind(amenity_ids)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn delete_property(pool: &PgPool, property_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM properties WHERE id = $1")
        .bind(property_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn find_row(pool: &PgPool, property_id: Uuid) -> Result<Option<PropertyRow>> {
    let row = sqlx::query_as::<_, PropertyRow>(&format!("{} WHERE p.id = $1", ROW_SELECT))
        .bind(property_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Public listing with optional exact category and name substring filters
pub async fn list_rows(
    pool: &PgPool,
    filter: &PropertyFilter,
    page: Page,
) -> Result<Vec<PropertyRow>> {
    let name_pattern = filter.property_name.as_deref().map(like_pattern);

    let rows = sqlx::query_as::<_, PropertyRow>(&format!(
        r#"
        {}
        WHERE ($1::text IS NULL OR c.name = $1)
          AND ($2::text IS NULL OR p.name ILIKE $2)
        ORDER BY p.created_at DESC
        LIMIT $3 OFFSET $4
        "#,
        ROW_SELECT
    ))
    .bind(&filter.category_name)
    .bind(name_pattern)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn list_rows_by_creator(
    pool: &PgPool,
    creator_id: Uuid,
    page: Page,
) -> Result<Vec<PropertyRow>> {
    let rows = sqlx::query_as::<_, PropertyRow>(&format!(
        r#"
        {}
        WHERE p.creator_id = $1
        ORDER BY p.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
        ROW_SELECT
    ))
    .bind(creator_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Amenities of all given properties in one query
pub async fn amenities_for(pool: &PgPool, property_ids: &[Uuid]) -> Result<Vec<PropertyAmenityRow>> {
    let rows = sqlx::query_as::<_, PropertyAmenityRow>(
        r#"
        SELECT pa.property_id, a.id, a.name, a.description
        FROM property_amenities pa
        JOIN amenities a ON a.id = pa.amenity_id
        WHERE pa.property_id = ANY($1)
        ORDER BY a.name
        "#,
    )
    .bind(property_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("cabin"), "%cabin%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
