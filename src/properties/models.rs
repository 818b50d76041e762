//! Property models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::reservations::models::ReservationDetails;

/// Property row from `properties`
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Uuid,
    pub name: String,
    pub tag_line: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub cover_url: String,
    pub guests: i32,
    pub bedrooms: i32,
    pub beds: i32,
    pub baths: i32,
    pub country_code: String,
    pub category_id: Uuid,
    pub creator_id: Uuid,
    pub total_nights_booked: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_income: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Property joined with its category and creator
#[derive(Debug, Clone, FromRow)]
pub struct PropertyRow {
    #[sqlx(flatten)]
    pub property: Property,
    pub category_name: String,
    pub category_description: String,
    pub creator_username: String,
    pub creator_email: String,
}

/// Amenity attached to a property
#[derive(Debug, Clone, FromRow)]
pub struct PropertyAmenityRow {
    pub property_id: Uuid,
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogRef {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatorRef {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Listing view: no stats, no owner email
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProperty {
    pub id: Uuid,
    pub name: String,
    pub tag_line: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub cover_url: String,
    pub guests: i32,
    pub bedrooms: i32,
    pub beds: i32,
    pub baths: i32,
    pub country_code: String,
    pub category: CatalogRef,
    pub amenities: Vec<CatalogRef>,
    pub creator: CreatorRef,
}

/// Owner view with stats and reservations
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDetails {
    #[serde(flatten)]
    pub property: Property,
    pub category: CatalogRef,
    pub amenities: Vec<CatalogRef>,
    pub creator: CreatorRef,
    pub reservations: Vec<ReservationDetails>,
}

impl PropertyRow {
    fn category(&self) -> CatalogRef {
        CatalogRef {
            id: self.property.category_id,
            name: self.category_name.clone(),
            description: self.category_description.clone(),
        }
    }

    pub fn into_public(self, amenities: Vec<CatalogRef>) -> PublicProperty {
        let category = self.category();
        let p = self.property;
        PublicProperty {
            id: p.id,
            name: p.name,
            tag_line: p.tag_line,
            description: p.description,
            price: p.price,
            cover_url: p.cover_url,
            guests: p.guests,
            bedrooms: p.bedrooms,
            beds: p.beds,
            baths: p.baths,
            country_code: p.country_code,
            category,
            amenities,
            creator: CreatorRef {
                id: p.creator_id,
                username: self.creator_username,
                email: None,
            },
        }
    }

    pub fn into_details(
        self,
        amenities: Vec<CatalogRef>,
        reservations: Vec<ReservationDetails>,
    ) -> PropertyDetails {
        let category = self.category();
        let creator = CreatorRef {
            id: self.property.creator_id,
            username: self.creator_username,
            email: Some(self.creator_email),
        };
        PropertyDetails {
            property: self.property,
            category,
            amenities,
            creator,
            reservations,
        }
    }
}

/// Values for a property about to be inserted
#[derive(Debug, Clone)]
pub struct NewProperty {
    pub name: String,
    pub tag_line: String,
    pub description: String,
    pub price: Decimal,
    pub cover_url: String,
    pub guests: i32,
    pub bedrooms: i32,
    pub beds: i32,
    pub baths: i32,
    pub country_code: String,
    pub category_id: Uuid,
    pub creator_id: Uuid,
}

/// Partial property update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct PropertyChanges {
    pub name: Option<String>,
    pub tag_line: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub cover_url: Option<String>,
    pub guests: Option<i32>,
    pub bedrooms: Option<i32>,
    pub beds: Option<i32>,
    pub baths: Option<i32>,
    pub country_code: Option<String>,
    pub category_id: Option<Uuid>,
}

/// Filters of the public listing
#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    pub category_name: Option<String>,
    pub property_name: Option<String>,
}
