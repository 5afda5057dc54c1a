//! Shared domain types for Gazette.
//!
//! Identifiers, content spans, message flags, the generated-document type,
//! and the error enums used by the collaborator ports. This crate carries
//! no async machinery -- the lifecycle engine lives in `gazette-core`.

pub mod document;
pub mod error;
pub mod identity;
pub mod message;
pub mod span;
