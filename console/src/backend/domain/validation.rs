//! Input validation for card forms and cashier operations.
//!
//! These checks run before a mutation is attempted. They only read the
//! inventory; a failing check leaves every collection untouched.

use shared::Card;

use super::errors::ValidationError;

/// Required length of a contact phone number
pub const PHONE_NUMBER_DIGITS: usize = 10;

/// A phone number is optional, but when present it must be exactly ten ASCII digits
pub fn validate_phone_number(phone_number: Option<&str>) -> Result<(), ValidationError> {
    match phone_number {
        None => Ok(()),
        Some(number) if number.is_empty() => Ok(()),
        Some(number) => {
            let valid = number.len() == PHONE_NUMBER_DIGITS && number.bytes().all(|b| b.is_ascii_digit());
            if valid {
                Ok(())
            } else {
                Err(ValidationError::InvalidPhoneNumber(number.to_string()))
            }
        }
    }
}

/// Validate a card about to be issued: non-empty ID, not already in the
/// inventory, and a well-formed phone number.
pub fn validate_new_card(card: &Card, inventory: &[Card]) -> Result<(), ValidationError> {
    if card.id.trim().is_empty() {
        return Err(ValidationError::EmptyCardId);
    }
    validate_phone_number(card.phone_number.as_deref())?;
    if inventory.iter().any(|existing| existing.id == card.id) {
        return Err(ValidationError::DuplicateCardId(card.id.clone()));
    }
    Ok(())
}

/// Validate an edited card. Only the contact field can be malformed here.
pub fn validate_card_edit(card: &Card) -> Result<(), ValidationError> {
    validate_phone_number(card.phone_number.as_deref())
}

/// Check a replacement request against the inventory and return the old card.
pub fn validate_replacement<'a>(
    old_id: &str,
    new_id: &str,
    inventory: &'a [Card],
) -> Result<&'a Card, ValidationError> {
    if new_id.trim().is_empty() {
        return Err(ValidationError::EmptyCardId);
    }
    if new_id == old_id {
        return Err(ValidationError::SameCardId);
    }

    let old_card = inventory
        .iter()
        .find(|card| card.id == old_id)
        .ok_or_else(|| ValidationError::CardNotFound(old_id.to_string()))?;

    if let Some(target) = inventory.iter().find(|card| card.id == new_id) {
        if target.balance > 0 {
            return Err(ValidationError::TargetCardInUse(new_id.to_string()));
        }
    }

    Ok(old_card)
}

/// A refund can only be requested for an existing, active card
pub fn validate_refund(card_id: &str, inventory: &[Card]) -> Result<(), ValidationError> {
    let card = inventory
        .iter()
        .find(|card| card.id == card_id)
        .ok_or_else(|| ValidationError::CardNotFound(card_id.to_string()))?;

    if !card.is_active() {
        return Err(ValidationError::CardNotActive {
            card_id: card_id.to_string(),
            status: card.status,
        });
    }
    Ok(())
}

/// A compensation credit needs an existing card and a positive amount
pub fn validate_compensation(card_id: &str, amount: i64, inventory: &[Card]) -> Result<(), ValidationError> {
    if !inventory.iter().any(|card| card.id == card_id) {
        return Err(ValidationError::CardNotFound(card_id.to_string()));
    }
    validate_amount(amount)
}

/// A token amount entered at the desk must be positive
pub fn validate_amount(amount: i64) -> Result<(), ValidationError> {
    if amount <= 0 {
        return Err(ValidationError::NonPositiveAmount(amount));
    }
    Ok(())
}

/// A partial refund takes a positive amount no larger than the balance
pub fn validate_deduction(card: &Card, amount: i64) -> Result<(), ValidationError> {
    validate_amount(amount)?;
    if amount > card.balance {
        return Err(ValidationError::InsufficientBalance {
            card_id: card.id.clone(),
            requested: amount,
            available: card.balance,
        });
    }
    Ok(())
}

/// Ticket redemption must not take the ticket count below zero
pub fn validate_redemption(card: &Card, prize: &str, cost: i64) -> Result<(), ValidationError> {
    if card.tickets < cost {
        return Err(ValidationError::InsufficientTickets {
            prize: prize.to_string(),
            required: cost,
            available: card.tickets,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::CardStatus;

    fn card(id: &str, balance: i64) -> Card {
        let mut card = Card::new(id, "Guest");
        card.balance = balance;
        card
    }

    #[test]
    fn test_phone_number_rules() {
        assert!(validate_phone_number(None).is_ok());
        assert!(validate_phone_number(Some("")).is_ok());
        assert!(validate_phone_number(Some("5551234567")).is_ok());

        assert!(matches!(
            validate_phone_number(Some("555-123-4567")),
            Err(ValidationError::InvalidPhoneNumber(_))
        ));
        assert!(validate_phone_number(Some("555123456")).is_err());
        assert!(validate_phone_number(Some("55512345678")).is_err());
    }

    #[test]
    fn test_validate_new_card() {
        let inventory = vec![card("CARD-1", 10)];

        assert!(validate_new_card(&card("CARD-2", 0), &inventory).is_ok());
        assert_eq!(
            validate_new_card(&card("CARD-1", 0), &inventory),
            Err(ValidationError::DuplicateCardId("CARD-1".to_string()))
        );
        assert_eq!(
            validate_new_card(&card("   ", 0), &inventory),
            Err(ValidationError::EmptyCardId)
        );

        let mut bad_phone = card("CARD-3", 0);
        bad_phone.phone_number = Some("12345".to_string());
        assert!(matches!(
            validate_new_card(&bad_phone, &inventory),
            Err(ValidationError::InvalidPhoneNumber(_))
        ));
    }

    #[test]
    fn test_validate_replacement() {
        let inventory = vec![card("OLD", 50), card("SPARE", 0), card("BUSY", 5)];

        assert_eq!(validate_replacement("OLD", "NEW", &inventory).unwrap().id, "OLD");
        assert!(validate_replacement("OLD", "SPARE", &inventory).is_ok());

        assert_eq!(
            validate_replacement("OLD", "", &inventory),
            Err(ValidationError::EmptyCardId)
        );
        assert_eq!(
            validate_replacement("OLD", "OLD", &inventory),
            Err(ValidationError::SameCardId)
        );
        assert_eq!(
            validate_replacement("GONE", "NEW", &inventory),
            Err(ValidationError::CardNotFound("GONE".to_string()))
        );
        assert_eq!(
            validate_replacement("OLD", "BUSY", &inventory),
            Err(ValidationError::TargetCardInUse("BUSY".to_string()))
        );
    }

    #[test]
    fn test_validate_refund() {
        let mut blocked = card("B-1", 30);
        blocked.status = CardStatus::Blocked;
        let inventory = vec![card("A-1", 30), blocked];

        assert!(validate_refund("A-1", &inventory).is_ok());
        assert!(matches!(
            validate_refund("B-1", &inventory),
            Err(ValidationError::CardNotActive { .. })
        ));
        assert!(matches!(
            validate_refund("Z-9", &inventory),
            Err(ValidationError::CardNotFound(_))
        ));
    }

    #[test]
    fn test_validate_compensation() {
        let inventory = vec![card("A-1", 30)];

        assert!(validate_compensation("A-1", 15, &inventory).is_ok());
        assert_eq!(
            validate_compensation("A-1", 0, &inventory),
            Err(ValidationError::NonPositiveAmount(0))
        );
        assert_eq!(
            validate_compensation("Z-9", 15, &inventory),
            Err(ValidationError::CardNotFound("Z-9".to_string()))
        );
    }

    #[test]
    fn test_validate_deduction() {
        let holder = card("A-1", 30);

        assert!(validate_deduction(&holder, 30).is_ok());
        assert_eq!(validate_deduction(&holder, -1), Err(ValidationError::NonPositiveAmount(-1)));
        assert_eq!(
            validate_deduction(&holder, 31),
            Err(ValidationError::InsufficientBalance {
                card_id: "A-1".to_string(),
                requested: 31,
                available: 30,
            })
        );
    }

    #[test]
    fn test_validate_redemption() {
        let mut holder = card("T-1", 0);
        holder.tickets = 100;

        assert!(validate_redemption(&holder, "Candy Bar", 50).is_ok());
        assert!(validate_redemption(&holder, "Exact", 100).is_ok());
        assert_eq!(
            validate_redemption(&holder, "Key Chain", 150),
            Err(ValidationError::InsufficientTickets {
                prize: "Key Chain".to_string(),
                required: 150,
                available: 100,
            })
        );
    }
}
