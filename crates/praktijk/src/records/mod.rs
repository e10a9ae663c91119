//! The persisted record collections: leave periods and popups.
//!
//! Both collections live in one JSON document. [`DocumentStore`] owns the file,
//! [`ResourceManager`] runs add/delete/toggle/list against one collection.

pub mod domain;
pub mod manager;
pub mod store;

#[cfg(test)]
#[path = "../../tests/common/scratch.rs"]
pub(crate) mod test_support;

pub use domain::{
    Document, LeavePeriod, NewLeavePeriod, NewPopup, Popup, Record, RecordId, DEFAULT_LEAVE_NAME,
};
pub use manager::{Collection, IdGenerator, LeavePeriods, Popups, ResourceManager};
pub use store::{DocumentStore, StoreError};
