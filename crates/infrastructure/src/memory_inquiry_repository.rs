use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use fabriq_application::InquiryRepository;
use fabriq_core::{AppError, AppResult};
use fabriq_domain::{Inquiry, InquiryStatus};

/// In-memory inquiry store with compare-and-set status updates.
#[derive(Default)]
pub struct InMemoryInquiryRepository {
    inquiries: Mutex<HashMap<String, Inquiry>>,
}

impl InMemoryInquiryRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InquiryRepository for InMemoryInquiryRepository {
    async fn find_inquiry(&self, inquiry_id: &str) -> AppResult<Option<Inquiry>> {
        Ok(self.inquiries.lock().await.get(inquiry_id).cloned())
    }

    async fn insert_inquiry(&self, inquiry: Inquiry) -> AppResult<Inquiry> {
        let mut inquiries = self.inquiries.lock().await;
        if inquiries.contains_key(&inquiry.id) {
            return Err(AppError::Conflict(format!(
                "inquiry '{}' already exists",
                inquiry.id
            )));
        }

        debug!(inquiry_id = %inquiry.id, "stored new inquiry");
        inquiries.insert(inquiry.id.clone(), inquiry.clone());

        Ok(inquiry)
    }

    async fn update_inquiry_status(
        &self,
        expected: InquiryStatus,
        updated: Inquiry,
    ) -> AppResult<Inquiry> {
        let mut inquiries = self.inquiries.lock().await;
        let Some(stored) = inquiries.get(&updated.id) else {
            return Err(AppError::NotFound(format!(
                "inquiry '{}' does not exist",
                updated.id
            )));
        };

        // The compare-and-set guard for racing transitions.
        if stored.status != expected {
            return Err(AppError::Conflict(format!(
                "inquiry '{}' is '{}', expected '{}'",
                updated.id,
                stored.status.as_str(),
                expected.as_str()
            )));
        }

        debug!(
            inquiry_id = %updated.id,
            status = updated.status.as_str(),
            "updated inquiry status"
        );
        inquiries.insert(updated.id.clone(), updated.clone());

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use chrono::Utc;

    use fabriq_application::{
        InquiryLifecycleService, InquiryRepository, StatusHistoryLedger, TransitionInquiryInput,
    };
    use fabriq_core::{AppError, ServiceContext, UserType};
    use fabriq_domain::{EntityType, Inquiry, InquiryStatus};

    use crate::memory_status_history_repository::InMemoryStatusHistoryRepository;

    use super::InMemoryInquiryRepository;

    #[tokio::test]
    async fn compare_and_set_rejects_stale_updates() {
        let store = InMemoryInquiryRepository::new();
        let inquiry = Inquiry::new("inquiry-1", Utc::now());

        let inserted = store.insert_inquiry(inquiry.clone()).await;
        assert!(inserted.is_ok());

        let mut accepted = inquiry.clone();
        accepted.status = InquiryStatus::Accepted;
        let updated = store
            .update_inquiry_status(InquiryStatus::New, accepted)
            .await;
        assert!(updated.is_ok());

        // A writer still holding the NEW snapshot loses.
        let mut rejected = inquiry;
        rejected.status = InquiryStatus::Rejected;
        let result = store
            .update_inquiry_status(InquiryStatus::New, rejected)
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn duplicate_insert_conflicts() {
        let store = InMemoryInquiryRepository::new();
        let inquiry = Inquiry::new("inquiry-1", Utc::now());

        let first = store.insert_inquiry(inquiry.clone()).await;
        assert!(first.is_ok());

        let second = store.insert_inquiry(inquiry).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }

    // Full-stack pass over the real services wired to the real stores.
    #[tokio::test]
    async fn lifecycle_service_runs_against_the_memory_stores() {
        let ledger = StatusHistoryLedger::new(Arc::new(InMemoryStatusHistoryRepository::new()));
        let service = InquiryLifecycleService::new(
            Arc::new(InMemoryInquiryRepository::new()),
            ledger.clone(),
        );

        let customer = ServiceContext::new(
            "customer-1",
            UserType::Customer,
            BTreeSet::new(),
            None,
        );
        let staff = ServiceContext::new(
            "staff-1",
            UserType::Staff,
            BTreeSet::from([
                "inquiries:read".to_owned(),
                "inquiries:update".to_owned(),
            ]),
            Some("staff".to_owned()),
        );

        let submitted = service.submit_inquiry(&customer).await;
        assert!(submitted.is_ok());
        let inquiry = submitted.unwrap_or_else(|_| Inquiry::new("unreachable", Utc::now()));

        let accepted = service
            .transition_inquiry(
                &staff,
                TransitionInquiryInput {
                    inquiry_id: inquiry.id.clone(),
                    from: InquiryStatus::New,
                    to: InquiryStatus::Accepted,
                    reason: None,
                },
            )
            .await;
        assert!(accepted.is_ok());

        let timeline = ledger
            .status_timeline(EntityType::Inquiry, &inquiry.id)
            .await
            .unwrap_or_default();
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[1].status, "accepted");
        assert!(timeline[1].is_active);

        let reloaded = service.get_inquiry(&staff, &inquiry.id).await;
        assert!(reloaded.is_ok_and(|inquiry| inquiry.status == InquiryStatus::Accepted));
    }
}
