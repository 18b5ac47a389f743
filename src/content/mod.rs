/**
 * Content Module
 * Pure core: document validation and identifier derivation.
 */

pub mod schema;
pub mod slug;
