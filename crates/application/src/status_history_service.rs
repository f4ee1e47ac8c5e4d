use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fabriq_core::AppResult;
use fabriq_domain::{EntityType, StatusChangeRecord, validate_recorded_transition};
use serde_json::{Map, Value};


/// Inclusive timestamp range used by history queries and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// First instant inside the range.
    pub start: DateTime<Utc>,
    /// Last instant inside the range.
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Returns whether a timestamp falls inside the range.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

/// Input payload for recording one status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStatusChange {
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
}

impl NewStatusChange {
    /// Creates a minimal change payload with no actor, reason, or metadata.
    #[must_use]
    pub fn new(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        from_status: Option<String>,
        to_status: impl Into<String>,
    ) -> Self {
        Self {
            entity_type,
            entity_id: entity_id.into(),
            from_status,
            to_status: to_status.into(),
            changed_by: None,
            reason: None,
            metadata: Map::new(),
        }
    }

    /// Sets the actor that triggered the change.
    #[must_use]
    pub fn changed_by(mut self, actor: impl Into<String>) -> Self {
        self.changed_by = Some(actor.into());
        self
    }

    /// Sets the human-readable reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Filter for flat history queries. Provided fields combine with AND semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusHistoryQuery {
    /// Restrict to one entity type.
    pub entity_type: Option<EntityType>,
    /// Restrict to one entity identifier.
    pub entity_id: Option<String>,
    /// Restrict to changes triggered by one actor.
    pub changed_by: Option<String>,
    /// Restrict to changes recorded inside the range.
    pub date_range: Option<DateRange>,
}

/// One entry of an entity's status timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTimelineEntry {
    /// Status the entity entered.
    pub status: String,
    /// When the status was entered.
    pub changed_at: DateTime<Utc>,
    /// True only for the chronologically last entry.
    pub is_active: bool,
}

/// Repository port for the append-only status history store.
///
/// Implementations must assign the record id, the `changed_at` timestamp,
/// and a stable position within the entity's sequence atomically per append,
/// and must return reads ordered by that position rather than arrival order.
#[async_trait]
pub trait StatusHistoryRepository: Send + Sync {
    /// Appends one change and returns the stored record.
    async fn append(&self, change: NewStatusChange) -> AppResult<StatusChangeRecord>;

    /// Returns the ordered history of one entity, possibly empty.
    async fn list_for_entity(
        &self,
        entity_type: EntityType,
        entity_id: &str,
    ) -> AppResult<Vec<StatusChangeRecord>>;

    /// Returns all records matching a filter, in stable append order.
    async fn query(
        &self,
        query: &StatusHistoryQuery,
    ) -> AppResult<Vec<StatusChangeRecord>>;
}

/// Append-only ledger of entity status transitions.
///
/// Explicitly constructed and injected wherever transitions are recorded, so
/// tests get isolated instances instead of sharing an implicit global.
#[derive(Clone)]
pub struct StatusHistoryLedger {
    repository: Arc<dyn StatusHistoryRepository>,
}

impl StatusHistoryLedger {
    /// Creates a ledger over a history repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn StatusHistoryRepository>) -> Self {
        Self { repository }
    }

    /// Records one status change after validating it against the entity
    /// type's transition table.
    pub async fn record_status_change(
        &self,
        change: NewStatusChange,
    ) -> AppResult<StatusChangeRecord> {
        validate_recorded_transition(
            change.entity_type,
            change.from_status.as_deref(),
            &change.to_status,
        )?;

        self.repository.append(change).await
    }

    /// Returns the full ordered history of one entity, possibly empty.
    pub async fn entity_status_history(
        &self,
        entity_type: EntityType,
        entity_id: &str,
    ) -> AppResult<Vec<StatusChangeRecord>> {
        self.repository.list_for_entity(entity_type, entity_id).await
    }

    /// Returns the most recent status change of one entity.
    pub async fn latest_status_change(
        &self,
        entity_type: EntityType,
        entity_id: &str,
    ) -> AppResult<Option<StatusChangeRecord>> {
        let mut history = self.repository.list_for_entity(entity_type, entity_id).await?;
        Ok(history.pop())
    }

    /// Returns the first status change of one entity.
    pub async fn first_status_change(
        &self,
        entity_type: EntityType,
        entity_id: &str,
    ) -> AppResult<Option<StatusChangeRecord>> {
        let history = self.repository.list_for_entity(entity_type, entity_id).await?;
        Ok(history.into_iter().next())
    }

    /// Returns all records matching a filter, in stable append order.
    pub async fn query_status_history(
        &self,
        query: &StatusHistoryQuery,
    ) -> AppResult<Vec<StatusChangeRecord>> {
        self.repository.query(query).await
    }

    /// Returns the status timeline of one entity.
    ///
    /// `is_active` is true only for the chronologically last entry.
    pub async fn status_timeline(
        &self,
        entity_type: EntityType,
        entity_id: &str,
    ) -> AppResult<Vec<StatusTimelineEntry>> {
        let history = self.repository.list_for_entity(entity_type, entity_id).await?;
        let last_index = history.len().checked_sub(1);

        Ok(history
            .into_iter()
            .enumerate()
            .map(|(index, record)| StatusTimelineEntry {
                status: record.to_status,
                changed_at: record.changed_at,
                is_active: Some(index) == last_index,
            })
            .collect())
    }

    /// Counts transitions recorded inside a date range, keyed by
    /// `"from → to"` with `"initial"` standing in for the absent from-status.
    pub async fn status_change_statistics(
        &self,
        range: DateRange,
        entity_type: Option<EntityType>,
    ) -> AppResult<BTreeMap<String, u64>> {
        let records = self
            .repository
            .query(&StatusHistoryQuery {
                entity_type,
                date_range: Some(range),
                ..StatusHistoryQuery::default()
            })
            .await?;

        let mut counts = BTreeMap::new();
        for record in records {
            let from = record.from_status.as_deref().unwrap_or("initial");
            let key = format!("{from} → {}", record.to_status);
            *counts.entry(key).or_insert(0) += 1;
        }

        Ok(counts)
    }
}
