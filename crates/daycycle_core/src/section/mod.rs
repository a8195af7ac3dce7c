//! Section partitioning over the flat block list.
//!
//! # Responsibility
//! - Recognize the four section headers from block text alone.
//! - Derive the contiguous index range owned by each section.
//!
//! # Invariants
//! - Partitioning is pure: it never mutates blocks and never caches
//!   indices across a structural mutation boundary.
//! - Sections are delimited in the order they physically occur; the
//!   first matching header wins when a name appears twice.

pub mod partition;
