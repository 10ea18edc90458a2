//! Value types shared across the suspendwatch pipeline.
//!
//! A [`ResourceType`] names a class of Flux resource, a [`ResourceReference`]
//! names one instance of it, a [`StateEntry`] is the last-known suspension
//! state of an instance and a [`ChangeEvent`] is what gets dispatched when
//! that state flips.

mod entry;
mod event;
mod flux;
mod resource;

pub use entry::{StateEntry, UNKNOWN_PRINCIPAL};
pub use event::ChangeEvent;
pub use flux::{DEFAULT_EXCLUDED_PRINCIPAL_PATTERN, DEFAULT_LABEL_SELECTOR, DEFAULT_METHOD_PATTERN};
pub use resource::{IdentityError, ResourceReference, ResourceType};
