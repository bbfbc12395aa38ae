use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Display value written into `last_used` when a card is touched locally
pub const JUST_NOW: &str = "Just now";

/// Status of an RFID card. Only two states exist; replacement and blocking
/// both land on `Blocked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardStatus {
    #[default]
    Active,
    Blocked,
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardStatus::Active => write!(f, "ACTIVE"),
            CardStatus::Blocked => write!(f, "BLOCKED"),
        }
    }
}

/// An RFID stored-value card as held in the local inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Scanned or typed identifier, unique within the inventory
    pub id: String,
    /// Token balance
    pub balance: i64,
    /// Redemption tickets won on the floor
    #[serde(default)]
    pub tickets: i64,
    #[serde(default)]
    pub status: CardStatus,
    /// Owner display name or free-form note
    #[serde(default)]
    pub issued_to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub last_used: String,
}

impl Card {
    /// A fresh active card with no balance
    pub fn new(id: impl Into<String>, issued_to: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            balance: 0,
            tickets: 0,
            status: CardStatus::Active,
            issued_to: issued_to.into(),
            phone_number: None,
            last_used: JUST_NOW.to_string(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CardStatus::Active
    }
}

/// Kind of a card transaction as recorded by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Tokens added (recharge)
    Credit,
    /// Tokens removed (refund)
    Debit,
    /// A game played on a machine
    Punch,
}

/// A single card transaction. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub card_id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Amount in tokens; the sign convention is the caller's
    pub amount: i64,
    #[serde(default)]
    pub terminal: String,
    #[serde(default)]
    pub status: String,
    /// Display time (HH:MM:SS)
    #[serde(default)]
    pub time: String,
    /// RFC 3339 timestamp when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Transaction {
    /// Generate a local transaction ID
    pub fn generate_id() -> String {
        format!("tx::{}", Uuid::new_v4())
    }
}

/// Category of a machine on the floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MachineType {
    Arcade,
    Redemption,
    Prize,
    Simulator,
    #[default]
    Other,
}

/// Operational status reported for a machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MachineStatus {
    Online,
    Busy,
    #[default]
    Offline,
    Maintenance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub machine_type: MachineType,
    #[serde(default)]
    pub status: MachineStatus,
    #[serde(default)]
    pub price_per_play: i64,
    #[serde(default)]
    pub revenue_today: i64,
    #[serde(default)]
    pub last_ping: String,
}

/// Severity of an audit log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARNING"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Success => write!(f, "SUCCESS"),
        }
    }
}

/// What kind of entity a log entry is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Card,
    Machine,
    Session,
    #[default]
    System,
}

/// Structured reference from a log entry to the entities it concerns.
/// Card history is built from this instead of searching message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LogSubject {
    #[serde(default)]
    pub entity_type: EntityType,
    #[serde(default)]
    pub entity_ids: Vec<String>,
}

impl LogSubject {
    pub fn system() -> Self {
        Self::default()
    }

    pub fn session(username: impl Into<String>) -> Self {
        Self {
            entity_type: EntityType::Session,
            entity_ids: vec![username.into()],
        }
    }

    pub fn card(card_id: impl Into<String>) -> Self {
        Self {
            entity_type: EntityType::Card,
            entity_ids: vec![card_id.into()],
        }
    }

    pub fn cards<I, S>(card_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entity_type: EntityType::Card,
            entity_ids: card_ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn machine(machine_id: impl Into<String>) -> Self {
        Self {
            entity_type: EntityType::Machine,
            entity_ids: vec![machine_id.into()],
        }
    }

    /// True when this subject names the given entity exactly
    pub fn concerns(&self, entity_type: EntityType, entity_id: &str) -> bool {
        self.entity_type == entity_type && self.entity_ids.iter().any(|id| id == entity_id)
    }
}

/// An audit log entry, kept newest-first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub level: LogLevel,
    pub message: String,
    #[serde(default)]
    pub time: String,
    /// Subsystem tag such as `Inventory` or `Auth`
    #[serde(default)]
    pub source: String,
    /// Acting user name, `System` when nobody is signed in
    #[serde(default)]
    pub operator: String,
    #[serde(flatten)]
    pub subject: LogSubject,
}

impl LogEntry {
    /// Generate a local log entry ID
    pub fn generate_id() -> String {
        format!("log::{}", Uuid::new_v4())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    Alert,
    Success,
    Info,
}

/// Ephemeral operator notification (toast / bell)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub message: String,
    pub time: String,
}

impl Notification {
    pub fn generate_id() -> String {
        format!("notification::{}", Uuid::new_v4())
    }
}

/// Authorization role carried by the access token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Operator,
}

impl Role {
    /// Map a role claim to a role. Unknown or missing claims get the least
    /// privileged role.
    pub fn from_claim(claim: Option<&str>) -> Self {
        match claim.map(|c| c.trim().to_ascii_lowercase()).as_deref() {
            Some("admin") | Some("administrator") => Role::Admin,
            Some("manager") => Role::Manager,
            _ => Role::Operator,
        }
    }

    /// Admins act as managers everywhere a manager is accepted
    pub fn can_manage(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Manager => write!(f, "manager"),
            Role::Operator => write!(f, "operator"),
        }
    }
}

/// Signed-in user, persisted under the `user` key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub access_token: String,
    pub role: Role,
}

// ---------------------------------------------------------------------------
// Backend wire types
// ---------------------------------------------------------------------------

/// Response of the `/token` exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

/// Body of `POST /manager/create-card`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCardRequest {
    pub card_id: String,
    pub owner_name: String,
    pub contact_no: String,
}

/// Body of `PUT /manager/recharge`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RechargeRequest {
    pub card_id: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RechargeResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub new_balance: f64,
}

/// Body of `PUT /manager/refund`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundRequest {
    pub card_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub card_id: String,
    #[serde(default)]
    pub refunded_amount: f64,
    #[serde(default)]
    pub new_balance: f64,
}

/// Error body returned by the backend on non-2xx responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub detail: String,
}

/// Card document as listed by `GET /manager/cards`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCard {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub card_id: Option<String>,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default, rename = "issuedTo")]
    pub issued_to: Option<String>,
    #[serde(default)]
    pub contact_no: Option<String>,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub tickets: Option<f64>,
    #[serde(default)]
    pub status: Option<CardStatus>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Machine document as listed by `GET /manager/machines`. Seeded documents
/// use camelCase keys and free-form category labels, so both are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteMachine {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "pricePerPlay")]
    pub cost_per_play: f64,
    /// Category label such as `Arcade` or `Racing`
    #[serde(default, rename = "type")]
    pub machine_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "revenueToday")]
    pub revenue_today: Option<f64>,
    #[serde(default, alias = "lastPing")]
    pub last_ping: Option<String>,
}

/// Log document as listed by `GET /manager/logs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteLog {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub level: LogLevel,
    pub message: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub entity_type: Option<EntityType>,
    #[serde(default)]
    pub entity_ids: Option<Vec<String>>,
    /// Some backend log writers only record the card they touched
    #[serde(default)]
    pub card_id: Option<String>,
}

/// Transaction document as listed by `GET /manager/transactions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteTransaction {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub card_id: Option<String>,
    #[serde(default, rename = "cardId")]
    pub card_id_alias: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub terminal: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_serializes_with_storage_field_names() {
        let mut card = Card::new("CARD-1", "Alice");
        card.phone_number = Some("5551234567".to_string());

        let json = serde_json::to_value(&card).unwrap();

        assert_eq!(json["id"], "CARD-1");
        assert_eq!(json["status"], "ACTIVE");
        assert_eq!(json["issuedTo"], "Alice");
        assert_eq!(json["phoneNumber"], "5551234567");
        assert_eq!(json["lastUsed"], JUST_NOW);
    }

    #[test]
    fn test_card_tolerates_missing_optional_fields() {
        let card: Card = serde_json::from_str(r#"{"id":"C-9","balance":40}"#).unwrap();

        assert_eq!(card.tickets, 0);
        assert_eq!(card.status, CardStatus::Active);
        assert!(card.phone_number.is_none());
    }

    #[test]
    fn test_log_entry_flattens_subject() {
        let entry = LogEntry {
            id: "log::1".to_string(),
            level: LogLevel::Warning,
            message: "Card C-1 deleted from system".to_string(),
            time: "10:00:00".to_string(),
            source: "Inventory".to_string(),
            operator: "alice".to_string(),
            subject: LogSubject::card("C-1"),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "WARNING");
        assert_eq!(json["entityType"], "CARD");
        assert_eq!(json["entityIds"][0], "C-1");

        let back: LogEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_log_subject_concerns_matches_exact_ids_only() {
        let subject = LogSubject::cards(["CARD-10", "CARD-11"]);

        assert!(subject.concerns(EntityType::Card, "CARD-10"));
        assert!(!subject.concerns(EntityType::Card, "CARD-1"));
        assert!(!subject.concerns(EntityType::Machine, "CARD-10"));
    }

    #[test]
    fn test_role_from_claim() {
        assert_eq!(Role::from_claim(Some("admin")), Role::Admin);
        assert_eq!(Role::from_claim(Some("Administrator")), Role::Admin);
        assert_eq!(Role::from_claim(Some("manager")), Role::Manager);
        assert_eq!(Role::from_claim(Some("cashier")), Role::Operator);
        assert_eq!(Role::from_claim(None), Role::Operator);

        assert!(Role::Admin.can_manage());
        assert!(Role::Manager.can_manage());
        assert!(!Role::Operator.can_manage());
    }

    #[test]
    fn test_remote_card_accepts_backend_document() {
        let raw = r#"{
            "_id": "65f0",
            "card_id": "CARD-77",
            "id": "CARD-77",
            "owner_name": "Bob",
            "contact_no": "0000000000",
            "balance": 120.0,
            "status": "ACTIVE",
            "arcade_id": "ARC_FUN_NY"
        }"#;

        let card: RemoteCard = serde_json::from_str(raw).unwrap();
        assert_eq!(card.card_id.as_deref(), Some("CARD-77"));
        assert_eq!(card.balance, 120.0);
        assert_eq!(card.status, Some(CardStatus::Active));
    }
}
