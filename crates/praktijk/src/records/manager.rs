use std::marker::PhantomData;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::domain::{
    Document, LeavePeriod, NewLeavePeriod, NewPopup, Popup, Record, RecordId, DEFAULT_LEAVE_NAME,
};
use super::store::{DocumentStore, StoreError};

/// Issues creation-time identifiers that never go backwards within a process.
///
/// Ids are the creation instant in milliseconds; two records created within the
/// same millisecond (or after the wall clock stepped back) get the previous id + 1.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, now: DateTime<Utc>) -> RecordId {
        let candidate = now.timestamp_millis();
        let previous = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(candidate.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        candidate.max(previous.saturating_add(1))
    }
}

/// A named collection inside the [`Document`].
pub trait Collection: Send + Sync + 'static {
    type Entity: Record + Clone + Send + Sync;
    type Draft: Send;

    const NAME: &'static str;

    fn entries(document: &Document) -> &Vec<Self::Entity>;
    fn entries_mut(document: &mut Document) -> &mut Vec<Self::Entity>;
    fn build(draft: Self::Draft, id: RecordId, created_at: DateTime<Utc>) -> Self::Entity;
}

/// The `leavePeriods` collection.
#[derive(Debug, Clone, Copy)]
pub struct LeavePeriods;

impl Collection for LeavePeriods {
    type Entity = LeavePeriod;
    type Draft = NewLeavePeriod;

    const NAME: &'static str = "leavePeriods";

    fn entries(document: &Document) -> &Vec<LeavePeriod> {
        &document.leave_periods
    }

    fn entries_mut(document: &mut Document) -> &mut Vec<LeavePeriod> {
        &mut document.leave_periods
    }

    fn build(draft: NewLeavePeriod, id: RecordId, created_at: DateTime<Utc>) -> LeavePeriod {
        let name = draft
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LEAVE_NAME.to_string());

        LeavePeriod {
            id,
            name,
            start_date: draft.start_date,
            end_date: draft.end_date,
            created_at,
        }
    }
}

/// The `popups` collection.
#[derive(Debug, Clone, Copy)]
pub struct Popups;

impl Collection for Popups {
    type Entity = Popup;
    type Draft = NewPopup;

    const NAME: &'static str = "popups";

    fn entries(document: &Document) -> &Vec<Popup> {
        &document.popups
    }

    fn entries_mut(document: &mut Document) -> &mut Vec<Popup> {
        &mut document.popups
    }

    fn build(draft: NewPopup, id: RecordId, created_at: DateTime<Utc>) -> Popup {
        let active = draft.is_enabled();
        Popup {
            id,
            title: draft.title,
            content: draft.content,
            active,
            created_at,
        }
    }
}

/// Add/delete/toggle/list operations against one collection of the shared document.
#[derive(Debug)]
pub struct ResourceManager<C> {
    store: Arc<DocumentStore>,
    ids: Arc<IdGenerator>,
    _collection: PhantomData<fn() -> C>,
}

impl<C> Clone for ResourceManager<C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            ids: Arc::clone(&self.ids),
            _collection: PhantomData,
        }
    }
}

impl<C: Collection> ResourceManager<C> {
    pub fn new(store: Arc<DocumentStore>, ids: Arc<IdGenerator>) -> Self {
        Self {
            store,
            ids,
            _collection: PhantomData,
        }
    }

    /// Append a new entity built from `draft` and persist the document.
    pub fn add(&self, draft: C::Draft) -> Result<C::Entity, StoreError> {
        let entity = self.store.update(|document| {
            let now = Utc::now();
            let entity = C::build(draft, self.ids.next(now), now);
            C::entries_mut(document).push(entity.clone());
            entity
        })?;

        info!(collection = C::NAME, id = entity.id(), "record added");
        Ok(entity)
    }

    /// Remove the entity with `id`. The document is rewritten even when nothing matched.
    pub fn delete(&self, id: RecordId) -> Result<(), StoreError> {
        let removed = self.store.update(|document| {
            let entries = C::entries_mut(document);
            let before = entries.len();
            entries.retain(|entity| entity.id() != id);
            before - entries.len()
        })?;

        info!(collection = C::NAME, id, removed, "record delete processed");
        Ok(())
    }

    /// Flip boolean `field` on the entity with `id`; unknown ids and fields are ignored.
    pub fn toggle(&self, id: RecordId, field: &str) -> Result<(), StoreError> {
        let flipped = self.store.update(|document| {
            C::entries_mut(document)
                .iter_mut()
                .find(|entity| entity.id() == id)
                .and_then(|entity| entity.flag_mut(field))
                .map(|flag| {
                    *flag = !*flag;
                    *flag
                })
        })?;

        info!(collection = C::NAME, id, field, now = ?flipped, "record toggle processed");
        Ok(())
    }

    pub fn list(&self) -> Vec<C::Entity> {
        C::entries(&self.store.load()).clone()
    }
}

impl ResourceManager<Popups> {
    /// Popups currently switched on, in display order.
    pub fn active(&self) -> Vec<Popup> {
        self.list().into_iter().filter(|popup| popup.active).collect()
    }
}
