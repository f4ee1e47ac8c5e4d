use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use fabriq_application::{NewStatusChange, StatusHistoryQuery, StatusHistoryRepository};
use fabriq_core::AppResult;
use fabriq_domain::{EntityType, StatusChangeId, StatusChangeRecord};

#[derive(Default)]
struct StoreState {
    next_sequence: u64,
    records: Vec<StoredRecord>,
}

struct StoredRecord {
    sequence: u64,
    record: StatusChangeRecord,
}

/// In-memory append-only status history store.
///
/// One critical section covers id assignment, sequence assignment, and the
/// append, so parallel requests cannot lose updates or observe interleaved
/// positions. Reads sort by the monotonic sequence, not arrival order.
#[derive(Default)]
pub struct InMemoryStatusHistoryRepository {
    state: Mutex<StoreState>,
}

impl InMemoryStatusHistoryRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatusHistoryRepository for InMemoryStatusHistoryRepository {
    async fn append(&self, change: NewStatusChange) -> AppResult<StatusChangeRecord> {
        let mut state = self.state.lock().await;
        let sequence = state.next_sequence;
        state.next_sequence += 1;

        let record = StatusChangeRecord {
            id: StatusChangeId::new(),
            entity_type: change.entity_type,
            entity_id: change.entity_id,
            from_status: change.from_status,
            to_status: change.to_status,
            changed_by: change.changed_by,
            reason: change.reason,
            metadata: change.metadata,
            changed_at: Utc::now(),
        };

        debug!(
            entity_type = record.entity_type.as_str(),
            entity_id = %record.entity_id,
            from_status = record.from_status.as_deref().unwrap_or("initial"),
            to_status = %record.to_status,
            "recorded status change"
        );

        state.records.push(StoredRecord {
            sequence,
            record: record.clone(),
        });

        Ok(record)
    }

    async fn list_for_entity(
        &self,
        entity_type: EntityType,
        entity_id: &str,
    ) -> AppResult<Vec<StatusChangeRecord>> {
        let state = self.state.lock().await;
        let mut matches: Vec<&StoredRecord> = state
            .records
            .iter()
            .filter(|stored| {
                stored.record.entity_type == entity_type && stored.record.entity_id == entity_id
            })
            .collect();
        matches.sort_by_key(|stored| stored.sequence);

        Ok(matches.into_iter().map(|stored| stored.record.clone()).collect())
    }

    async fn query(&self, query: &StatusHistoryQuery) -> AppResult<Vec<StatusChangeRecord>> {
        let state = self.state.lock().await;
        let mut matches: Vec<&StoredRecord> = state
            .records
            .iter()
            .filter(|stored| {
                let record = &stored.record;
                query
                    .entity_type
                    .is_none_or(|entity_type| record.entity_type == entity_type)
                    && query
                        .entity_id
                        .as_deref()
                        .is_none_or(|entity_id| record.entity_id == entity_id)
                    && query
                        .changed_by
                        .as_deref()
                        .is_none_or(|actor| record.changed_by.as_deref() == Some(actor))
                    && query
                        .date_range
                        .is_none_or(|range| range.contains(record.changed_at))
            })
            .collect();
        matches.sort_by_key(|stored| stored.sequence);

        Ok(matches.into_iter().map(|stored| stored.record.clone()).collect())
    }
}
