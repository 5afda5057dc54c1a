//! Session and pending-request lifecycle engine for Gazette.
//!
//! Gazette lets a chat bot curate a running conversation into a published
//! document. This crate is the concurrent core of that flow:
//!
//! - **Pending-request registry** -- per user, at most one in-flight
//!   command awaiting a correlated follow-up reply, evicted on timeout.
//! - **Active-session registry** -- per chat, at most one accumulation
//!   session, created by consuming a matching pending request.
//! - **Session** -- the per-chat aggregate owning the ordered message
//!   list and the publisher handle.
//! - **Message readiness** -- per-message tracking of outstanding
//!   enrichment workers with a one-shot ready signal.
//! - **Content join barrier** -- waits for every message in a session to
//!   become ready before handing the list to the generator.
//!
//! Platform adapters, concrete generators/publishers/storage drivers, and
//! configuration live outside this crate; they are consumed through the
//! port traits in [`generator`], [`publisher`], and [`enrich`].

pub mod content;
pub mod engine;
pub mod enrich;
pub mod generator;
pub mod message;
pub mod publisher;
pub mod request;
pub mod sched;
pub mod session;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testutil;
