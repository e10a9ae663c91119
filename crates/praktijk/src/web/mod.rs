//! HTTP surface: public pages, the contact form and the backoffice.

pub mod pages;
pub mod router;

use std::sync::Arc;

use crate::auth::AuthGate;
use crate::contact::ContactDispatcher;
use crate::records::{DocumentStore, IdGenerator, LeavePeriods, Popups, ResourceManager};

pub use router::{not_found, site_router};

/// Dependencies shared by every request handler.
pub struct SiteState<T> {
    pub leave_periods: ResourceManager<LeavePeriods>,
    pub popups: ResourceManager<Popups>,
    pub gate: AuthGate,
    pub contact: ContactDispatcher<T>,
}

impl<T> SiteState<T> {
    /// Wire both collection managers to one store so they share the same id sequence.
    pub fn new(store: Arc<DocumentStore>, gate: AuthGate, contact: ContactDispatcher<T>) -> Self {
        let ids = Arc::new(IdGenerator::new());
        Self {
            leave_periods: ResourceManager::new(Arc::clone(&store), Arc::clone(&ids)),
            popups: ResourceManager::new(store, ids),
            gate,
            contact,
        }
    }
}
