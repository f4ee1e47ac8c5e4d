use chrono::{DateTime, Utc};
use fabriq_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an inquiry.
///
/// Stored explicitly as an ordinal, unlike the derived order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum InquiryStatus {
    /// Inquiry turned down.
    Rejected = 0,
    /// Freshly submitted, awaiting review.
    New = 1,
    /// Accepted for handling.
    Accepted = 2,
    /// Actively being worked on.
    InProgress = 3,
    /// Handling finished.
    Closed = 4,
}

impl InquiryStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rejected => "rejected",
            Self::New => "new",
            Self::Accepted => "accepted",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
        }
    }

    /// Returns the stored ordinal for this status.
    #[must_use]
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// Returns all known inquiry statuses in ordinal order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[InquiryStatus] = &[
            InquiryStatus::Rejected,
            InquiryStatus::New,
            InquiryStatus::Accepted,
            InquiryStatus::InProgress,
            InquiryStatus::Closed,
        ];

        ALL
    }

    /// Parses a stored ordinal into a status. Returns `None` for unknown values.
    #[must_use]
    pub fn from_ordinal(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Rejected),
            1 => Some(Self::New),
            2 => Some(Self::Accepted),
            3 => Some(Self::InProgress),
            4 => Some(Self::Closed),
            _ => None,
        }
    }

    /// Parses a stored value into a status. Returns `None` for unknown values.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "rejected" => Some(Self::Rejected),
            "new" => Some(Self::New),
            "accepted" => Some(Self::Accepted),
            "in_progress" => Some(Self::InProgress),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    /// Returns the statuses reachable from this one.
    ///
    /// `InProgress` keeps a backward edge to `Accepted` so a prematurely
    /// started inquiry can be re-queued.
    #[must_use]
    pub fn permitted_transitions(&self) -> &'static [Self] {
        match self {
            Self::New => &[Self::Accepted, Self::Rejected],
            Self::Accepted => &[Self::InProgress, Self::Rejected],
            Self::InProgress => &[Self::Closed, Self::Accepted],
            Self::Rejected | Self::Closed => &[],
        }
    }

    /// Returns whether this status has no outgoing transitions.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.permitted_transitions().is_empty()
    }

    /// Returns whether a transition from this status to `target` is permitted.
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        self.permitted_transitions().contains(&target)
    }
}

/// Plain inquiry snapshot loaded by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inquiry {
    /// Stable inquiry identifier.
    pub id: String,
    /// Current stored status.
    pub status: InquiryStatus,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// When the inquiry was accepted.
    pub accepted_at: Option<DateTime<Utc>>,
    /// When the inquiry was rejected.
    pub rejected_at: Option<DateTime<Utc>>,
    /// When the inquiry was closed.
    pub closed_at: Option<DateTime<Utc>>,
}

impl Inquiry {
    /// Creates a freshly submitted inquiry awaiting review.
    #[must_use]
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            status: InquiryStatus::New,
            created_at,
            accepted_at: None,
            rejected_at: None,
            closed_at: None,
        }
    }
}

/// Applies one status transition to an inquiry snapshot.
///
/// The stored status must equal `from` — callers pass the status they read
/// before deciding on the transition, so a concurrent change fails here
/// instead of silently applying against stale state. The `from -> to` edge
/// must exist in the transition table. Success returns an updated snapshot
/// with the status replaced and the matching transition timestamp stamped.
pub fn transition_inquiry_status(
    inquiry: &Inquiry,
    from: InquiryStatus,
    to: InquiryStatus,
    now: DateTime<Utc>,
) -> AppResult<Inquiry> {
    if inquiry.status != from {
        return Err(AppError::Validation(format!(
            "inquiry '{}' is '{}' but the transition expected '{}'",
            inquiry.id,
            inquiry.status.as_str(),
            from.as_str()
        )));
    }

    if !from.can_transition_to(to) {
        return Err(AppError::Validation(format!(
            "inquiry status transition from '{}' to '{}' is not permitted",
            from.as_str(),
            to.as_str()
        )));
    }

    let mut updated = inquiry.clone();
    updated.status = to;
    match to {
        InquiryStatus::Accepted => updated.accepted_at = Some(now),
        InquiryStatus::Rejected => updated.rejected_at = Some(now),
        InquiryStatus::Closed => updated.closed_at = Some(now),
        InquiryStatus::New | InquiryStatus::InProgress => {}
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{Inquiry, InquiryStatus, transition_inquiry_status};

    fn new_inquiry() -> Inquiry {
        Inquiry::new("inquiry-1", Utc::now() - Duration::hours(1))
    }

    #[test]
    fn ordinals_roundtrip() {
        for status in InquiryStatus::all() {
            assert_eq!(InquiryStatus::from_ordinal(status.ordinal()), Some(*status));
        }
        assert_eq!(InquiryStatus::from_ordinal(5), None);
    }

    #[test]
    fn new_to_accepted_succeeds_and_stamps_timestamp() {
        let inquiry = new_inquiry();
        let now = Utc::now();

        let result =
            transition_inquiry_status(&inquiry, InquiryStatus::New, InquiryStatus::Accepted, now);

        assert!(result.is_ok());
        let updated = result.unwrap_or(inquiry);
        assert_eq!(updated.status, InquiryStatus::Accepted);
        assert_eq!(updated.accepted_at, Some(now));
    }

    #[test]
    fn accepted_to_new_is_rejected() {
        let mut inquiry = new_inquiry();
        inquiry.status = InquiryStatus::Accepted;

        let result = transition_inquiry_status(
            &inquiry,
            InquiryStatus::Accepted,
            InquiryStatus::New,
            Utc::now(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn terminal_statuses_have_no_outgoing_edges() {
        let mut inquiry = new_inquiry();
        inquiry.status = InquiryStatus::Rejected;

        for target in InquiryStatus::all() {
            let result = transition_inquiry_status(
                &inquiry,
                InquiryStatus::Rejected,
                *target,
                Utc::now(),
            );
            assert!(result.is_err());
        }

        assert!(InquiryStatus::Rejected.is_terminal());
        assert!(InquiryStatus::Closed.is_terminal());
        assert!(!InquiryStatus::InProgress.is_terminal());
    }

    #[test]
    fn stale_expected_status_is_rejected() {
        let mut inquiry = new_inquiry();
        inquiry.status = InquiryStatus::Accepted;

        let result = transition_inquiry_status(
            &inquiry,
            InquiryStatus::New,
            InquiryStatus::Accepted,
            Utc::now(),
        );

        assert!(result.is_err_and(|error| {
            let message = error.to_string();
            message.contains("accepted") && message.contains("new")
        }));
    }

    #[test]
    fn in_progress_can_reopen_to_accepted() {
        let mut inquiry = new_inquiry();
        inquiry.status = InquiryStatus::InProgress;

        let result = transition_inquiry_status(
            &inquiry,
            InquiryStatus::InProgress,
            InquiryStatus::Accepted,
            Utc::now(),
        );
        assert!(result.is_ok());
    }
}
