//! Document gateway contracts and implementations.
//!
//! # Responsibility
//! - Define the external-collaborator interface the reconciliation engine
//!   consumes: block fetch/insert/patch/archive plus the two log stores.
//! - Surface remote failures as distinguishable error values, never as
//!   opaque transport panics.
//!
//! # Invariants
//! - Every operation is a blocking round trip; callers own sequencing.
//! - Implementations must preserve the order of `items` in `insert_after`.

use crate::model::block::{Block, BlockId, NewTodo};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod notion;

/// Identifier of a log store (a database in the remote document system).
pub type StoreId = String;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gateway-layer error for remote document operations.
#[derive(Debug)]
pub enum GatewayError {
    /// Transport-level failure before a response was obtained.
    Http(reqwest::Error),
    /// The remote store rejected the request.
    Api { status: u16, message: String },
    /// The response arrived but could not be interpreted.
    InvalidResponse(String),
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(err) => write!(f, "http transport failure: {err}"),
            Self::Api { status, message } => {
                write!(f, "document store rejected request ({status}): {message}")
            }
            Self::InvalidResponse(message) => {
                write!(f, "unexpected document store response: {message}")
            }
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Api { .. } | Self::InvalidResponse(_) => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

/// One record appended to a log store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    /// A completed checklist item archived before deletion.
    DoneItem { text: String, date: NaiveDate },
    /// The once-per-run daily completion ratio.
    DailyCompletion {
        completed: u32,
        total: u32,
        date: NaiveDate,
    },
}

impl LogRecord {
    /// The record's title-field label as written to the store.
    pub fn label(&self) -> String {
        match self {
            // Empty item text still deserves a row; "Task" keeps the
            // record readable.
            Self::DoneItem { text, .. } if text.is_empty() => "Task".to_string(),
            Self::DoneItem { text, .. } => text.clone(),
            Self::DailyCompletion {
                completed, total, ..
            } => format!("{completed}/{total}"),
        }
    }

    /// Calendar date the record is filed under.
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::DoneItem { date, .. } | Self::DailyCompletion { date, .. } => *date,
        }
    }
}

/// External collaborator interface over the remote document store.
///
/// The engine issues these calls strictly sequentially and re-fetches
/// `list_children` after every structural mutation; implementations need
/// no internal ordering guarantees beyond honoring each single call.
pub trait DocumentGateway {
    /// Verifies the document root exists and is accessible.
    fn verify_document(&self, page: &BlockId) -> GatewayResult<()>;

    /// Fetches all direct children of `parent`, in document order, with
    /// pagination handled transparently.
    fn list_children(&self, parent: &BlockId) -> GatewayResult<Vec<Block>>;

    /// Inserts checklist items right after `anchor`, preserving order.
    fn insert_after(
        &self,
        parent: &BlockId,
        anchor: &BlockId,
        items: &[NewTodo],
    ) -> GatewayResult<()>;

    /// Logically deletes a block.
    fn archive_block(&self, id: &BlockId) -> GatewayResult<()>;

    /// Sets the checkbox state of a checklist item.
    fn set_todo_checked(&self, id: &BlockId, checked: bool) -> GatewayResult<()>;

    /// Appends one record to a log store.
    fn append_record(&self, store: &StoreId, record: &LogRecord) -> GatewayResult<()>;

    /// Resolves a log store by exact, case-insensitive title.
    fn find_store_by_title(&self, title: &str) -> GatewayResult<Option<StoreId>>;
}

#[cfg(test)]
mod tests {
    use super::LogRecord;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
    }

    #[test]
    fn done_item_label_falls_back_for_empty_text() {
        let record = LogRecord::DoneItem {
            text: String::new(),
            date: date(),
        };
        assert_eq!(record.label(), "Task");
    }

    #[test]
    fn completion_label_is_ratio() {
        let record = LogRecord::DailyCompletion {
            completed: 2,
            total: 3,
            date: date(),
        };
        assert_eq!(record.label(), "2/3");
        assert_eq!(record.date(), date());
    }
}
