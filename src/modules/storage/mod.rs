//! Local-filesystem media storage
//!
//! Uploaded issue photos are written under a configurable media root and
//! served back over HTTP from a static-file route mounted on the public base
//! path.

mod local_store;

pub use local_store::{extension_for_content_type, LocalImageStore};
