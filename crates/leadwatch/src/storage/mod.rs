//! Seen-set storage.
//!
//! Stores the IDs of evaluated posts as a JSON array so re-runs stay quiet.

mod seen;

pub use seen::{SeenSet, SeenStore};
