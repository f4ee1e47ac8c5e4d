use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use fabriq_core::{AppError, AppResult, ServiceContext};
use fabriq_domain::{
    Action, EntityType, Inquiry, InquiryStatus, Resource, transition_inquiry_status,
};

use crate::authorization_service::{AuthorizationGuard, CustomerAccess};
use crate::status_history_service::{NewStatusChange, StatusHistoryLedger};


/// Input payload for one inquiry status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionInquiryInput {
    /// Inquiry to transition.
    pub inquiry_id: String,
    /// Status the caller read before deciding on the transition.
    pub from: InquiryStatus,
    /// Target status.
    pub to: InquiryStatus,
    /// Optional reason recorded with the change.
    pub reason: Option<String>,
}

/// Repository port for inquiry snapshots.
#[async_trait]
pub trait InquiryRepository: Send + Sync {
    /// Finds an inquiry by identifier.
    async fn find_inquiry(&self, inquiry_id: &str) -> AppResult<Option<Inquiry>>;

    /// Stores a new inquiry.
    async fn insert_inquiry(&self, inquiry: Inquiry) -> AppResult<Inquiry>;

    /// Replaces a stored snapshot only while its status still equals
    /// `expected`; a concurrent change fails with a conflict.
    async fn update_inquiry_status(
        &self,
        expected: InquiryStatus,
        updated: Inquiry,
    ) -> AppResult<Inquiry>;
}

/// Application service for the inquiry lifecycle.
///
/// Bound to the inquiries resource; customers may submit and read inquiries
/// through the public site, every other action requires staff grants.
#[derive(Clone)]
pub struct InquiryLifecycleService {
    guard: AuthorizationGuard,
    repository: Arc<dyn InquiryRepository>,
    ledger: StatusHistoryLedger,
}

impl InquiryLifecycleService {
    /// Creates the service from its repository and ledger dependencies.
    #[must_use]
    pub fn new(repository: Arc<dyn InquiryRepository>, ledger: StatusHistoryLedger) -> Self {
        Self {
            guard: AuthorizationGuard::with_customer_access(
                Resource::Inquiries,
                CustomerAccess::Allow(BTreeSet::from([Action::Create, Action::Read])),
            ),
            repository,
            ledger,
        }
    }

    /// Submits a new inquiry and records its initial history entry.
    pub async fn submit_inquiry(&self, context: &ServiceContext) -> AppResult<Inquiry> {
        self.guard.require_permission(context, Action::Create)?;

        let inquiry = Inquiry::new(Uuid::new_v4().to_string(), Utc::now());
        let stored = self.repository.insert_inquiry(inquiry).await?;

        self.ledger
            .record_status_change(
                NewStatusChange::new(
                    EntityType::Inquiry,
                    stored.id.clone(),
                    None,
                    stored.status.as_str(),
                )
                .changed_by(context.user_id()),
            )
            .await?;

        Ok(stored)
    }

    /// Returns an inquiry by identifier.
    pub async fn get_inquiry(
        &self,
        context: &ServiceContext,
        inquiry_id: &str,
    ) -> AppResult<Inquiry> {
        self.guard.require_permission(context, Action::Read)?;

        self.repository
            .find_inquiry(inquiry_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("inquiry '{inquiry_id}' does not exist")))
    }

    /// Applies one status transition and records it in the ledger.
    ///
    /// The read-validate-write sequence is one logical unit: the repository
    /// update is compare-and-set on the expected status, so the loser of a
    /// race fails instead of applying a transition against stale state.
    pub async fn transition_inquiry(
        &self,
        context: &ServiceContext,
        input: TransitionInquiryInput,
    ) -> AppResult<Inquiry> {
        self.guard.require_permission(context, Action::Update)?;

        let inquiry = self
            .repository
            .find_inquiry(&input.inquiry_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("inquiry '{}' does not exist", input.inquiry_id))
            })?;

        let updated = transition_inquiry_status(&inquiry, input.from, input.to, Utc::now())?;
        let stored = self
            .repository
            .update_inquiry_status(input.from, updated)
            .await?;

        let mut change = NewStatusChange::new(
            EntityType::Inquiry,
            stored.id.clone(),
            Some(input.from.as_str().to_owned()),
            input.to.as_str(),
        )
        .changed_by(context.user_id());
        if let Some(reason) = input.reason {
            change = change.with_reason(reason);
        }
        self.ledger.record_status_change(change).await?;

        Ok(stored)
    }
}
