//! Service layer for the site's JSON collections.
//! - `storage`: whole-blob download/upload with explicit missing/conflict outcomes.
//! - `collection`: generic read-modify-write CRUD over one blob per resource.
//! - `resources`: board members, impact goals and naming opportunities.

pub mod errors;
pub mod storage;
pub mod collection;
pub mod resources;
pub mod admin_auth;
pub mod metrics;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
