use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use fabriq_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::inquiry::InquiryStatus;
use crate::order::OrderStatus;

/// Kind of entity a status change belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// Manufacturing order.
    Order,
    /// Incoming inquiry.
    Inquiry,
}

impl EntityType {
    /// Returns a stable storage value for this entity type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Inquiry => "inquiry",
        }
    }

    /// Parses a stored value into an entity type. Returns `None` for unknown values.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "order" => Some(Self::Order),
            "inquiry" => Some(Self::Inquiry),
            _ => None,
        }
    }
}

/// Unique identifier for a recorded status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusChangeId(Uuid);

impl StatusChangeId {
    /// Creates a new random status change identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a status change identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for StatusChangeId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for StatusChangeId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// One recorded status transition. Immutable once created.
///
/// `from_status` is `None` only for the first record of an entity's history;
/// every later record carries the status the entity held immediately before
/// the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangeRecord {
    /// Stable record identifier.
    pub id: StatusChangeId,
    /// Kind of entity the change belongs to.
    pub entity_type: EntityType,
    /// Identifier of the changed entity.
    pub entity_id: String,
    /// Status before the change, absent for the initial record.
    pub from_status: Option<String>,
    /// Status after the change.
    pub to_status: String,
    /// Actor that triggered the change, if known.
    pub changed_by: Option<String>,
    /// Optional human-readable reason.
    pub reason: Option<String>,
    /// Free-form structured context captured with the change.
    pub metadata: Map<String, Value>,
    /// When the change was recorded.
    pub changed_at: DateTime<Utc>,
}

/// Validates a transition against the entity type's transition table before
/// it is recorded.
///
/// Both statuses must be known slugs for the entity type. An absent
/// `from_status` marks the initial record and is always permitted; otherwise
/// the `from -> to` edge must exist.
pub fn validate_recorded_transition(
    entity_type: EntityType,
    from_status: Option<&str>,
    to_status: &str,
) -> AppResult<()> {
    match entity_type {
        EntityType::Order => {
            let to = parse_order_status(to_status)?;
            let Some(from_status) = from_status else {
                return Ok(());
            };
            let from = parse_order_status(from_status)?;
            if !from.can_transition_to(to) {
                return Err(transition_not_permitted(entity_type, from_status, to_status));
            }

            Ok(())
        }
        EntityType::Inquiry => {
            let to = parse_inquiry_status(to_status)?;
            let Some(from_status) = from_status else {
                return Ok(());
            };
            let from = parse_inquiry_status(from_status)?;
            if !from.can_transition_to(to) {
                return Err(transition_not_permitted(entity_type, from_status, to_status));
            }

            Ok(())
        }
    }
}

fn parse_order_status(value: &str) -> AppResult<OrderStatus> {
    OrderStatus::parse(value)
        .ok_or_else(|| AppError::Validation(format!("unknown order status '{value}'")))
}

fn parse_inquiry_status(value: &str) -> AppResult<InquiryStatus> {
    InquiryStatus::parse(value)
        .ok_or_else(|| AppError::Validation(format!("unknown inquiry status '{value}'")))
}

fn transition_not_permitted(entity_type: EntityType, from: &str, to: &str) -> AppError {
    AppError::Validation(format!(
        "{} status transition from '{from}' to '{to}' is not permitted",
        entity_type.as_str()
    ))
}

#[cfg(test)]
mod tests {
    use super::{EntityType, StatusChangeId, validate_recorded_transition};

    #[test]
    fn entity_type_roundtrips() {
        assert_eq!(EntityType::parse("order"), Some(EntityType::Order));
        assert_eq!(EntityType::parse("inquiry"), Some(EntityType::Inquiry));
        assert_eq!(EntityType::parse("shipment"), None);
    }

    #[test]
    fn status_change_id_formats_as_uuid() {
        let id = StatusChangeId::new();
        assert_eq!(id.to_string().len(), 36);
    }

    #[test]
    fn initial_records_are_always_permitted() {
        let result = validate_recorded_transition(EntityType::Order, None, "requested");
        assert!(result.is_ok());

        let result = validate_recorded_transition(EntityType::Inquiry, None, "new");
        assert!(result.is_ok());
    }

    #[test]
    fn unknown_statuses_are_rejected() {
        let result = validate_recorded_transition(EntityType::Order, None, "pending");
        assert!(result.is_err());

        let result =
            validate_recorded_transition(EntityType::Inquiry, Some("new"), "in_production");
        assert!(result.is_err());
    }

    #[test]
    fn table_violations_are_rejected() {
        let result =
            validate_recorded_transition(EntityType::Inquiry, Some("rejected"), "accepted");
        assert!(result.is_err());

        let result =
            validate_recorded_transition(EntityType::Order, Some("delivered"), "canceled");
        assert!(result.is_err());
    }

    #[test]
    fn table_edges_are_permitted() {
        let result = validate_recorded_transition(EntityType::Inquiry, Some("new"), "accepted");
        assert!(result.is_ok());

        let result =
            validate_recorded_transition(EntityType::Order, Some("requested"), "confirmed");
        assert!(result.is_ok());
    }
}
