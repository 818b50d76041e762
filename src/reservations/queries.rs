//! Database queries for reservations.
//!
//! Functions take any Postgres executor so they run equally on the pool or
//! inside a booking transaction.

use chrono::NaiveDate;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::error::Result;

use super::calculators::{BookedRange, CompletedStay, PropertyStats};
use super::models::{
    NewReservation, OverlapQuery, PropertySnapshot, Reservation, ReservationChanges,
    ReservationDetailsRow, ReservationFilter,
};

const RESERVATION_COLUMNS: &str = r#"
    id, property_id, user_id, start_date, end_date,
    number_of_guests, total_price, created_at, updated_at
"#;

const DETAILS_SELECT: &str = r#"
    SELECT
        r.id, r.property_id, r.user_id, r.start_date, r.end_date,
        r.number_of_guests, r.total_price, r.created_at, r.updated_at,
        p.name AS property_name,
        p.price AS property_price,
        p.cover_url AS property_cover_url,
        p.creator_id AS property_creator_id,
        u.username AS user_username,
        u.email AS user_email
    FROM reservations r
    JOIN properties p ON p.id = r.property_id
    JOIN users u ON u.id = r.user_id
"#;

/// Get the capacity/price view of a property
pub async fn get_property_snapshot<'e, E>(
    executor: E,
    property_id: Uuid,
) -> Result<Option<PropertySnapshot>>
where
    E: PgExecutor<'e>,
{
    let property = sqlx::query_as::<_, PropertySnapshot>(
        r#"
        SELECT id, name, guests, price, cover_url, creator_id
        FROM properties
        WHERE id = $1
        "#,
    )
    .bind(property_id)
    .fetch_optional(executor)
    .await?;

    Ok(property)
}

/// Serialize bookings of one property until the surrounding transaction ends
pub async fn lock_property<'e, E>(executor: E, property_id: Uuid) -> Result<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
        .bind(property_id)
        .execute(executor)
        .await?;

    Ok(())
}

/// Find booked ranges intersecting the query range (inclusive)
pub async fn find_overlapping<'e, E>(executor: E, query: &OverlapQuery) -> Result<Vec<BookedRange>>
where
    E: PgExecutor<'e>,
{
    let rows: Vec<(NaiveDate, NaiveDate, i32)> = sqlx::query_as(
        r#"
        SELECT start_date, end_date, number_of_guests
        FROM reservations
        WHERE property_id = $1
          AND start_date <= $3
          AND end_date >= $2
          AND ($4::uuid IS NULL OR id <> $4)
        ORDER BY start_date
        "#,
    )
    .bind(query.property_id)
    .bind(query.start_date)
    .bind(query.end_date)
    .bind(query.exclude_id)
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(start_date, end_date, number_of_guests)| BookedRange {
            start_date,
            end_date,
            number_of_guests,
        })
        .collect())
}

/// Insert a reservation
pub async fn insert_reservation<'e, E>(executor: E, new: &NewReservation) -> Result<Reservation>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        r#"
        INSERT INTO reservations
            (id, property_id, user_id, start_date, end_date, number_of_guests, total_price)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {}
        "#,
        RESERVATION_COLUMNS
    );

    let reservation = sqlx::query_as::<_, Reservation>(&sql)
        .bind(Uuid::new_v4())
        .bind(new.property_id)
        .bind(new.user_id)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.number_of_guests)
        .bind(new.total_price)
        .fetch_one(executor)
        .await?;

    Ok(reservation)
}

/// Fetch a reservation and lock its row until the transaction ends
pub async fn lock_reservation<'e, E>(executor: E, reservation_id: Uuid) -> Result<Option<Reservation>>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "SELECT {} FROM reservations WHERE id = $1 FOR UPDATE",
        RESERVATION_COLUMNS
    );

    let reservation = sqlx::query_as::<_, Reservation>(&sql)
        .bind(reservation_id)
        .fetch_optional(executor)
        .await?;

    Ok(reservation)
}

/// Overwrite dates, guests and price of a reservation
pub async fn update_reservation<'e, E>(
    executor: E,
    reservation_id: Uuid,
    changes: &ReservationChanges,
) -> Result<Option<Reservation>>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        r#"
        UPDATE reservations
        SET start_date = $2,
            end_date = $3,
            number_of_guests = $4,
            total_price = $5,
            updated_at = now()
        WHERE id = $1
        RETURNING {}
        "#,
        RESERVATION_COLUMNS
    );

    let reservation = sqlx::query_as::<_, Reservation>(&sql)
        .bind(reservation_id)
        .bind(changes.start_date)
        .bind(changes.end_date)
        .bind(changes.number_of_guests)
        .bind(changes.total_price)
        .fetch_optional(executor)
        .await?;

    Ok(reservation)
}

/// Delete a reservation, returning the removed row
pub async fn delete_reservation<'e, E>(
    executor: E,
    reservation_id: Uuid,
) -> Result<Option<Reservation>>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "DELETE FROM reservations WHERE id = $1 RETURNING {}",
        RESERVATION_COLUMNS
    );

    let reservation = sqlx::query_as::<_, Reservation>(&sql)
        .bind(reservation_id)
        .fetch_optional(executor)
        .await?;

    Ok(reservation)
}

/// Get one reservation with its property and guest
pub async fn get_reservation_details<'e, E>(
    executor: E,
    reservation_id: Uuid,
) -> Result<Option<ReservationDetailsRow>>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{} WHERE r.id = $1", DETAILS_SELECT);

    let row = sqlx::query_as::<_, ReservationDetailsRow>(&sql)
        .bind(reservation_id)
        .fetch_optional(executor)
        .await?;

    Ok(row)
}

/// List reservations of a property or of a guest
pub async fn list_reservation_details<'e, E>(
    executor: E,
    filter: ReservationFilter,
) -> Result<Vec<ReservationDetailsRow>>
where
    E: PgExecutor<'e>,
{
    let (clause, id) = match filter {
        ReservationFilter::Property(id) => ("r.property_id = $1", id),
        ReservationFilter::Guest(id) => ("r.user_id = $1", id),
    };
    let sql = format!("{} WHERE {} ORDER BY r.start_date", DETAILS_SELECT, clause);

    let rows = sqlx::query_as::<_, ReservationDetailsRow>(&sql)
        .bind(id)
        .fetch_all(executor)
        .await?;

    Ok(rows)
}

/// Reservations of a property that ended on or before `today`
pub async fn find_completed_stays<'e, E>(
    executor: E,
    property_id: Uuid,
    today: NaiveDate,
) -> Result<Vec<CompletedStay>>
where
    E: PgExecutor<'e>,
{
    let rows: Vec<(NaiveDate, NaiveDate, rust_decimal::Decimal)> = sqlx::query_as(
        r#"
        SELECT start_date, end_date, total_price
        FROM reservations
        WHERE property_id = $1
          AND end_date <= $2
        "#,
    )
    .bind(property_id)
    .bind(today)
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(start_date, end_date, total_price)| CompletedStay {
            start_date,
            end_date,
            total_price,
        })
        .collect())
}

/// Persist aggregate stats on the property row
pub async fn write_property_stats<'e, E>(
    executor: E,
    property_id: Uuid,
    stats: &PropertyStats,
) -> Result<u64>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE properties
        SET total_nights_booked = $2,
            total_income = $3
        WHERE id = $1
        "#,
    )
    .bind(property_id)
    .bind(stats.total_nights_booked)
    .bind(stats.total_income)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
