//! Owner checks for property endpoints

use uuid::Uuid;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyAction {
    View,
    Update,
    Delete,
}

pub fn ensure_owner(creator_id: Uuid, user_id: Uuid, action: PropertyAction) -> Result<()> {
    if creator_id == user_id {
        return Ok(());
    }

    let verb = match action {
        PropertyAction::View => "view",
        PropertyAction::Update => "update",
        PropertyAction::Delete => "delete",
    };
    Err(AppError::Forbidden(format!(
        "You are not authorized to {} this property",
        verb
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_passes_other_users_do_not() {
        let owner = Uuid::new_v4();
        assert!(ensure_owner(owner, owner, PropertyAction::Update).is_ok());

        match ensure_owner(owner, Uuid::new_v4(), PropertyAction::Update) {
            Err(AppError::Forbidden(msg)) => {
                assert_eq!(msg, "You are not authorized to update this property")
            }
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }
}
