//! Ownership checks for reservation endpoints.
//!
//! A reservation is visible to, and can be changed by, the guest who booked
//! it and the owner of the booked property. Reservation listings by property
//! are limited to the property owner.

use uuid::Uuid;

use crate::error::{AppError, Result};

use super::models::{PropertySnapshot, ReservationDetails};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationAction {
    View,
    Update,
    Delete,
}

impl ReservationAction {
    fn verb(self) -> &'static str {
        match self {
            ReservationAction::View => "view",
            ReservationAction::Update => "update",
            ReservationAction::Delete => "delete",
        }
    }
}

pub fn ensure_reservation_access(
    details: &ReservationDetails,
    user_id: Uuid,
    action: ReservationAction,
) -> Result<()> {
    let is_guest = details.reservation.user_id == user_id;
    let is_owner = details.property.creator_id == user_id;

    if is_guest || is_owner {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "You are not authorized to {} this reservation",
            action.verb()
        )))
    }
}

pub fn ensure_property_owner(property: &PropertySnapshot, user_id: Uuid) -> Result<()> {
    if property.creator_id == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You are not authorized to view reservations of this property".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reservations::models::{GuestSummary, Reservation, ReservedProperty};
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn details(guest: Uuid, owner: Uuid) -> ReservationDetails {
        let property_id = Uuid::new_v4();
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        ReservationDetails {
            reservation: Reservation {
                id: Uuid::new_v4(),
                property_id,
                user_id: guest,
                start_date: day,
                end_date: day,
                number_of_guests: 1,
                total_price: dec!(100),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            property: ReservedProperty {
                id: property_id,
                name: "Lake House".to_string(),
                price: dec!(100),
                cover_url: String::new(),
                creator_id: owner,
            },
            user: GuestSummary {
                id: guest,
                username: "guest".to_string(),
                email: "guest@example.com".to_string(),
            },
        }
    }

    #[test]
    fn test_guest_and_owner_have_access() {
        let guest = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let d = details(guest, owner);

        assert!(ensure_reservation_access(&d, guest, ReservationAction::Update).is_ok());
        assert!(ensure_reservation_access(&d, owner, ReservationAction::Delete).is_ok());
    }

    #[test]
    fn test_stranger_is_forbidden_with_action_in_message() {
        let d = details(Uuid::new_v4(), Uuid::new_v4());
        let err = ensure_reservation_access(&d, Uuid::new_v4(), ReservationAction::Delete)
            .unwrap_err();

        match err {
            AppError::Forbidden(msg) => {
                assert_eq!(msg, "You are not authorized to delete this reservation")
            }
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }
}
