//! Document head reconciliation.
//!
//! - `resource` - element classification and identity/version extraction
//! - `registry` - resources present in the live head
//! - `reconcile` - keep / add / reload planning and commit

mod reconcile;
mod registry;
mod resource;

pub use reconcile::{HeadPlan, Reconciliation, StaleResource, plan};
pub use registry::HeadRegistry;
pub use resource::{HeadEntry, ResourceKind, classify, resource_identity};
