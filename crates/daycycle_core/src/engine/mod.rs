//! Per-cycle reconciliation of the sectioned to-do page.
//!
//! # Responsibility
//! - Orchestrate the fixed-order daily state transition over gateway
//!   calls: daily reset, Tomorrow promotion, Backlog cleanup, Today
//!   demotion, contiguity repair, placeholder guarantee.
//!
//! # Invariants
//! - Indices are never reused across a structural mutation: the engine
//!   re-fetches the block list before computing the next section range.
//! - Copies are inserted before the originals they duplicate are deleted.
//! - Archiving and completion logging are best-effort and never abort
//!   the run; missing Today/Backlog headers and placeholder repair
//!   failures do.

pub mod reconcile;
