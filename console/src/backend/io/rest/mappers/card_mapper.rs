//! Mapping between backend card documents and inventory cards.

use shared::{Card, CardStatus, CreateCardRequest, RemoteCard};

use super::to_tokens;

/// Owner name sent when a card is issued without one
pub const DEFAULT_OWNER_NAME: &str = "Guest";
/// Contact number sent when a card is issued without one
pub const DEFAULT_CONTACT_NO: &str = "0000000000";

/// Display value for cards the backend has never seen used
const NEVER_USED: &str = "Never";

pub struct CardMapper;

impl CardMapper {
    /// Convert a backend card document. Documents that carry neither `card_id`
    /// nor `id` cannot be addressed by the console and are skipped.
    pub fn to_domain(dto: RemoteCard) -> Option<Card> {
        let id = dto
            .card_id
            .or(dto.id)
            .filter(|id| !id.trim().is_empty())?;

        let issued_to = dto
            .issued_to
            .or(dto.owner_name)
            .unwrap_or_default();

        Some(Card {
            id,
            balance: to_tokens(dto.balance),
            tickets: dto.tickets.map(to_tokens).unwrap_or(0),
            status: dto.status.unwrap_or(CardStatus::Active),
            issued_to,
            phone_number: dto.contact_no.filter(|n| !n.is_empty()),
            last_used: NEVER_USED.to_string(),
        })
    }

    pub fn to_domain_list(dtos: Vec<RemoteCard>) -> Vec<Card> {
        dtos.into_iter().filter_map(Self::to_domain).collect()
    }

    /// Build the create request, filling in the backend's required fields
    pub fn to_create_request(card_id: &str, owner_name: &str, contact_no: &str) -> CreateCardRequest {
        let owner_name = if owner_name.trim().is_empty() {
            DEFAULT_OWNER_NAME
        } else {
            owner_name
        };
        let contact_no = if contact_no.trim().is_empty() {
            DEFAULT_CONTACT_NO
        } else {
            contact_no
        };

        CreateCardRequest {
            card_id: card_id.to_string(),
            owner_name: owner_name.to_string(),
            contact_no: contact_no.to_string(),
        }
    }
}
