//! Core domain logic for daycycle: daily reconciliation of a sectioned
//! to-do page against a remote document store.
//!
//! This crate is the single source of truth for the section
//! partitioning and migration invariants; the remote store is reached
//! only through the `DocumentGateway` trait.

pub mod config;
pub mod engine;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod section;

pub use config::{normalize_page_id, ConfigError, ConfigResult, RunConfig};
pub use engine::reconcile::{
    EngineError, EngineResult, ReconcileEngine, RunReport, COMPLETION_STORE_TITLE,
    DONE_STORE_TITLE,
};
pub use gateway::memory::MemoryGateway;
pub use gateway::notion::NotionGateway;
pub use gateway::{DocumentGateway, GatewayError, GatewayResult, LogRecord, StoreId};
pub use logging::{default_log_level, init_logging};
pub use model::block::{Block, BlockId, BlockKind, NewTodo};
pub use section::partition::{
    header_block_id, locate_headers, section_range, HeaderIndex, Section,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
