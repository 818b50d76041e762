//! Request DTOs for property API endpoints.

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::pagination::PageQuery;

use super::models::{NewProperty, PropertyChanges, PropertyFilter};

fn check_price(price: Decimal) -> Result<()> {
    if price <= Decimal::ZERO {
        return Err(AppError::Validation("price must be greater than 0".to_string()));
    }
    Ok(())
}

/// Two uppercase ASCII letters (ISO 3166-1 alpha-2 shape)
fn check_country_code(code: &str) -> Result<()> {
    if code.len() == 2 && code.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "countryCode must be a valid two-letter ISO country code".to_string(),
        ))
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, max = 30, message = "tagLine must be 1 to 30 characters"))]
    pub tag_line: String,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
    pub price: Decimal,
    #[validate(length(min = 1, message = "coverUrl must not be empty"))]
    pub cover_url: String,
    #[validate(range(min = 1, message = "guests must be at least 1"))]
    pub guests: i32,
    #[validate(range(min = 0, message = "bedrooms must not be negative"))]
    pub bedrooms: i32,
    #[validate(range(min = 0, message = "beds must not be negative"))]
    pub beds: i32,
    #[validate(range(min = 0, message = "baths must not be negative"))]
    pub baths: i32,
    pub country_code: String,
    pub category_id: Uuid,
    #[serde(default)]
    pub amenity_ids: Option<Vec<Uuid>>,
}

impl CreatePropertyRequest {
    /// Rules the derive does not express
    pub fn check(&self) -> Result<()> {
        check_price(self.price)?;
        check_country_code(&self.country_code)
    }

    pub fn into_new(self, creator_id: Uuid) -> (NewProperty, Option<Vec<Uuid>>) {
        let new = NewProperty {
            name: self.name,
            tag_line: self.tag_line,
            description: self.description,
            price: self.price,
            cover_url: self.cover_url,
            guests: self.guests,
            bedrooms: self.bedrooms,
            beds: self.beds,
            baths: self.baths,
            country_code: self.country_code,
            category_id: self.category_id,
            creator_id,
        };
        (new, self.amenity_ids)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 30, message = "tagLine must be 1 to 30 characters"))]
    pub tag_line: Option<String>,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: Option<String>,
    pub price: Option<Decimal>,
    #[validate(length(min = 1, message = "coverUrl must not be empty"))]
    pub cover_url: Option<String>,
    #[validate(range(min = 1, message = "guests must be at least 1"))]
    pub guests: Option<i32>,
    #[validate(range(min = 0, message = "bedrooms must not be negative"))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0, message = "beds must not be negative"))]
    pub beds: Option<i32>,
    #[validate(range(min = 0, message = "baths must not be negative"))]
    pub baths: Option<i32>,
    pub country_code: Option<String>,
    pub category_id: Option<Uuid>,
    pub amenity_ids: Option<Vec<Uuid>>,
}

impl UpdatePropertyRequest {
    pub fn check(&self) -> Result<()> {
        if let Some(price) = self.price {
            check_price(price)?;
        }
        if let Some(code) = &self.country_code {
            check_country_code(code)?;
        }
        Ok(())
    }

    pub fn into_changes(self) -> (PropertyChanges, Option<Vec<Uuid>>) {
        let changes = PropertyChanges {
            name: self.name,
            tag_line: self.tag_line,
            description: self.description,
            price: self.price,
            cover_url: self.cover_url,
            guests: self.guests,
            bedrooms: self.bedrooms,
            beds: self.beds,
            baths: self.baths,
            country_code: self.country_code,
            category_id: self.category_id,
        };
        (changes, self.amenity_ids)
    }
}

/// Query string of the public listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyListQuery {
    #[serde(default)]
    pub skip: Option<i64>,
    #[serde(default)]
    pub take: Option<i64>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub property_name: Option<String>,
}

impl PropertyListQuery {
    pub fn split(self) -> (PropertyFilter, PageQuery) {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        (
            PropertyFilter {
                category_name: non_empty(self.category_name),
                property_name: non_empty(self.property_name),
            },
            PageQuery {
                skip: self.skip,
                take: self.take,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn create_body() -> &'static str {
        r#"{
            "name": "Cozy Mountain Cabin",
            "tagLine": "Perfect getaway",
            "description": "Wood stove and a view",
            "price": 150.0,
            "coverUrl": "https://example.com/cabin.jpg",
            "guests": 4,
            "bedrooms": 2,
            "beds": 3,
            "baths": 1,
            "countryCode": "US",
            "categoryId": "6f1c7a2e-1b7a-4c1f-9d55-1f2f7b0c9a11"
        }"#
    }

    #[test]
    fn test_create_request_parses_numeric_price() {
        let request: CreatePropertyRequest = serde_json::from_str(create_body()).unwrap();
        assert_eq!(request.price, dec!(150));
        assert!(request.validate().is_ok());
        assert!(request.check().is_ok());
        assert!(request.amenity_ids.is_none());
    }

    #[test]
    fn test_tag_line_limit() {
        let mut request: CreatePropertyRequest = serde_json::from_str(create_body()).unwrap();
        request.tag_line = "x".repeat(31);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_country_code_shape() {
        assert!(check_country_code("MX").is_ok());
        assert!(check_country_code("mx").is_err());
        assert!(check_country_code("MEX").is_err());
        assert!(check_country_code("").is_err());
    }

    #[test]
    fn test_price_must_be_positive() {
        assert!(check_price(dec!(0.01)).is_ok());
        assert!(check_price(dec!(0)).is_err());
        assert!(check_price(dec!(-5)).is_err());
    }

    #[test]
    fn test_list_query_drops_blank_filters() {
        let query = PropertyListQuery {
            category_name: Some("cabin".to_string()),
            property_name: Some("  ".to_string()),
            ..Default::default()
        };
        let (filter, _) = query.split();
        assert_eq!(filter.category_name.as_deref(), Some("cabin"));
        assert!(filter.property_name.is_none());
    }
}
