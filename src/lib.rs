//! Quill: Client-Side State Synchronization
//!
//! A client engine for a Conduit-style social blogging service: one session
//! store fanned out to every consumer, a paginated query engine with
//! last-descriptor-wins cancellation, optimistic overlays reconciling
//! server snapshots with local mutations, and a submission guard wrapping
//! every write action.

pub mod cell;
pub mod client;
pub mod config;
pub mod effect;
pub mod error;
pub mod logging;
pub mod model;
pub mod mutation;
pub mod overlay;
pub mod query;
pub mod session;
pub mod storage;
pub mod transport;
