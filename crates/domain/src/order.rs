use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// Never stored: always derived from the order's lifecycle timestamps so the
/// status and the timestamps justifying it cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order received, no quotation issued yet.
    Requested,
    /// Quotation issued, awaiting customer confirmation.
    Quoted,
    /// Customer confirmed the quotation.
    Confirmed,
    /// Production has started.
    InProduction,
    /// Production finished.
    Completed,
    /// Order handed to the carrier.
    Shipped,
    /// Order arrived at the customer.
    Delivered,
    /// Order canceled at any point before delivery.
    Canceled,
}

impl OrderStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Quoted => "quoted",
            Self::Confirmed => "confirmed",
            Self::InProduction => "in_production",
            Self::Completed => "completed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Canceled => "canceled",
        }
    }

    /// Returns all known order statuses in progression order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[OrderStatus] = &[
            OrderStatus::Requested,
            OrderStatus::Quoted,
            OrderStatus::Confirmed,
            OrderStatus::InProduction,
            OrderStatus::Completed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Canceled,
        ];

        ALL
    }

    /// Parses a stored value into a status. Returns `None` for unknown values.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "requested" => Some(Self::Requested),
            "quoted" => Some(Self::Quoted),
            "confirmed" => Some(Self::Confirmed),
            "in_production" => Some(Self::InProduction),
            "completed" => Some(Self::Completed),
            "shipped" => Some(Self::Shipped),
            "delivered" => Some(Self::Delivered),
            "canceled" => Some(Self::Canceled),
            _ => None,
        }
    }

    /// Returns the position in the forward progression chain.
    ///
    /// `Canceled` sits outside the chain and has no position.
    #[must_use]
    fn progression_rank(&self) -> Option<u8> {
        match self {
            Self::Requested => Some(0),
            Self::Quoted => Some(1),
            Self::Confirmed => Some(2),
            Self::InProduction => Some(3),
            Self::Completed => Some(4),
            Self::Shipped => Some(5),
            Self::Delivered => Some(6),
            Self::Canceled => None,
        }
    }

    /// Returns whether this status has no outgoing transitions.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Canceled)
    }

    /// Returns whether a recorded transition from this status to `target` is
    /// permitted.
    ///
    /// Because the status is derived from timestamps, a later lifecycle
    /// timestamp can land without the intermediate ones having been set, so
    /// any strictly forward jump along the progression is a valid transition.
    /// Cancellation is reachable from every non-terminal status.
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        if self.is_terminal() {
            return false;
        }

        if target == Self::Canceled {
            return true;
        }

        match (self.progression_rank(), target.progression_rank()) {
            (Some(from), Some(to)) => to > from,
            _ => false,
        }
    }
}

/// Plain order snapshot loaded by the persistence layer.
///
/// Carries the nullable lifecycle timestamps the derived status and the date
/// logic operate on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Stable order identifier.
    pub id: String,
    /// Order creation timestamp.
    pub created_at: DateTime<Utc>,
    /// When a quotation was issued.
    pub quoted_at: Option<DateTime<Utc>>,
    /// When the customer confirmed the quotation.
    pub confirmed_at: Option<DateTime<Utc>>,
    /// When production started.
    pub production_started_at: Option<DateTime<Utc>>,
    /// When production finished.
    pub completed_at: Option<DateTime<Utc>>,
    /// When the order was handed to the carrier.
    pub shipped_at: Option<DateTime<Utc>>,
    /// When the order arrived at the customer.
    pub delivered_at: Option<DateTime<Utc>>,
    /// When the order was canceled.
    pub canceled_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Creates a fresh snapshot with no lifecycle progress.
    #[must_use]
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at,
            quoted_at: None,
            confirmed_at: None,
            production_started_at: None,
            completed_at: None,
            shipped_at: None,
            delivered_at: None,
            canceled_at: None,
        }
    }

    /// Derives the current status from the lifecycle timestamps.
    ///
    /// Cancellation dominates any other progress; otherwise the furthest
    /// reached stage wins, falling back to `Requested`.
    #[must_use]
    pub fn status(&self) -> OrderStatus {
        if self.canceled_at.is_some() {
            return OrderStatus::Canceled;
        }

        if self.delivered_at.is_some() {
            return OrderStatus::Delivered;
        }

        if self.shipped_at.is_some() {
            return OrderStatus::Shipped;
        }

        if self.completed_at.is_some() {
            return OrderStatus::Completed;
        }

        if self.production_started_at.is_some() {
            return OrderStatus::InProduction;
        }

        if self.confirmed_at.is_some() {
            return OrderStatus::Confirmed;
        }

        if self.quoted_at.is_some() {
            return OrderStatus::Quoted;
        }

        OrderStatus::Requested
    }
}

/// Result of validating the monotonic lifecycle date chain of one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateLogicReport {
    /// Whether every constraint holds.
    pub is_valid: bool,
    /// One message per violated constraint.
    pub errors: Vec<String>,
    /// Outcome of every constraint, violated or not.
    pub constraints: BTreeMap<&'static str, bool>,
}

/// Validates the monotonic ordering of an order's lifecycle timestamps.
///
/// Checks `quoted_at <= confirmed_at <= production_started_at <= completed_at
/// <= shipped_at <= delivered_at`. A pair with either operand unset is
/// vacuously valid. Every constraint is evaluated and reported independently,
/// not just the first violation.
#[must_use]
pub fn validate_order_date_logic(order: &Order) -> DateLogicReport {
    let pairs: [(&'static str, Option<DateTime<Utc>>, Option<DateTime<Utc>>, &str, &str); 5] = [
        (
            "quoted_before_confirmed",
            order.quoted_at,
            order.confirmed_at,
            "confirmed_at",
            "quoted_at",
        ),
        (
            "confirmed_before_production",
            order.confirmed_at,
            order.production_started_at,
            "production_started_at",
            "confirmed_at",
        ),
        (
            "production_before_completed",
            order.production_started_at,
            order.completed_at,
            "completed_at",
            "production_started_at",
        ),
        (
            "completed_before_shipped",
            order.completed_at,
            order.shipped_at,
            "shipped_at",
            "completed_at",
        ),
        (
            "shipped_before_delivered",
            order.shipped_at,
            order.delivered_at,
            "delivered_at",
            "shipped_at",
        ),
    ];

    let mut errors = Vec::new();
    let mut constraints = BTreeMap::new();

    for (name, earlier, later, later_field, earlier_field) in pairs {
        let holds = match (earlier, later) {
            (Some(earlier), Some(later)) => earlier <= later,
            _ => true,
        };

        constraints.insert(name, holds);
        if !holds {
            errors.push(format!("{later_field} must not precede {earlier_field}"));
        }
    }

    DateLogicReport {
        is_valid: errors.is_empty(),
        errors,
        constraints,
    }
}
