//! Domain model for page blocks.
//!
//! # Responsibility
//! - Define the canonical block snapshot shape consumed by partitioning
//!   and reconciliation.
//! - Define the creation payload used when items are migrated or
//!   placeholders are inserted.
//!
//! # Invariants
//! - Blocks are immutable snapshots taken at fetch time; every change is
//!   expressed as a gateway command followed by a re-fetch.
//! - `checked` is meaningful only for `BlockKind::Todo`.

pub mod block;
