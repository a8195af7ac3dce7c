//! Reconciliation engine: the single-pass daily state transition.
//!
//! # Responsibility
//! - Execute the seven reconciliation steps in fixed order against a
//!   `DocumentGateway`.
//! - Downgrade best-effort log writes to warnings; propagate structural
//!   and transport failures.
//!
//! # Invariants
//! - Section ranges are always computed from a snapshot fetched after
//!   the last structural mutation.
//! - Every item of a processed section is migrated out, archived and
//!   deleted, or left untouched; never silently dropped or duplicated.
//! - Log store ids are resolved at most once per run.

use crate::gateway::{DocumentGateway, GatewayError, GatewayResult, LogRecord, StoreId};
use crate::model::block::{BlockId, NewTodo};
use crate::section::partition::{header_block_id, locate_headers, section_range, Section};
use chrono::{NaiveDate, Utc};
use log::{info, warn};
use once_cell::unsync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Title of the archived-item log store, resolved by exact-title lookup
/// when no explicit id is configured.
pub const DONE_STORE_TITLE: &str = "Done";
/// Title of the cycle-outcome log store.
pub const COMPLETION_STORE_TITLE: &str = "Daily Completion";

pub type EngineResult<T> = Result<T, EngineError>;

/// Reconciliation failure taxonomy.
#[derive(Debug)]
pub enum EngineError {
    /// A required section header (Today or Backlog) is missing: the
    /// document is malformed and the run aborts.
    MissingSection(Section),
    /// A gateway call central to migration failed.
    Gateway(GatewayError),
    /// The final placeholder guarantee could not be upheld; the document
    /// structure is unexpectedly broken.
    PlaceholderRepair(GatewayError),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSection(section) => write!(
                f,
                "could not find '{section}:' header; make sure it is a heading or a paragraph \
                 with text '{section}:'"
            ),
            Self::Gateway(err) => write!(f, "{err}"),
            Self::PlaceholderRepair(err) => {
                write!(f, "failed while ensuring section placeholders: {err}")
            }
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingSection(_) => None,
            Self::Gateway(err) | Self::PlaceholderRepair(err) => Some(err),
        }
    }
}

impl From<GatewayError> for EngineError {
    fn from(value: GatewayError) -> Self {
        Self::Gateway(value)
    }
}

/// Outcome counters for one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Checklist items found in the Daily section.
    pub daily_total: u32,
    /// Daily items found checked before the reset.
    pub daily_completed: u32,
    /// Whether the cycle-outcome record was written.
    pub completion_logged: bool,
    /// Unchecked Tomorrow items promoted to the top of Today.
    pub migrated_to_today: usize,
    /// Unchecked Today items demoted into Backlog.
    pub demoted_to_backlog: usize,
    /// Checked items removed from Tomorrow, Today and Backlog.
    pub archived: usize,
    /// Archive records that actually reached the log store.
    pub archive_records_written: usize,
    /// Empty-paragraph separators deleted inside Backlog.
    pub separators_removed: usize,
    /// Placeholder items appended to otherwise empty sections.
    pub placeholders_added: usize,
}

impl Display for RunReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "daily {}/{}, promoted {}, demoted {}, archived {}, placeholders {}",
            self.daily_completed,
            self.daily_total,
            self.migrated_to_today,
            self.demoted_to_backlog,
            self.archived,
            self.placeholders_added
        )
    }
}

/// Per-run binding of one log store: explicit id, or lazy title lookup.
struct StoreBinding {
    title: &'static str,
    explicit: Option<StoreId>,
    resolved: OnceCell<Option<StoreId>>,
}

impl StoreBinding {
    fn new(title: &'static str) -> Self {
        Self {
            title,
            explicit: None,
            resolved: OnceCell::new(),
        }
    }
}

/// Single-writer reconciliation engine over one page.
pub struct ReconcileEngine<'g, G: DocumentGateway> {
    gateway: &'g G,
    page_id: BlockId,
    date: NaiveDate,
    done_store: StoreBinding,
    completion_store: StoreBinding,
}

impl<'g, G: DocumentGateway> ReconcileEngine<'g, G> {
    /// Creates an engine for one page, dated today (UTC).
    pub fn new(gateway: &'g G, page_id: impl Into<BlockId>) -> Self {
        Self {
            gateway,
            page_id: page_id.into(),
            date: Utc::now().date_naive(),
            done_store: StoreBinding::new(DONE_STORE_TITLE),
            completion_store: StoreBinding::new(COMPLETION_STORE_TITLE),
        }
    }

    /// Overrides the run date (tests, backfills).
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Supplies the archived-item store id directly, skipping lookup.
    pub fn with_done_store(mut self, store: StoreId) -> Self {
        self.done_store.explicit = Some(store);
        self
    }

    /// Supplies the cycle-outcome store id directly, skipping lookup.
    pub fn with_completion_store(mut self, store: StoreId) -> Self {
        self.completion_store.explicit = Some(store);
        self
    }

    /// Runs the full reconciliation cycle once.
    ///
    /// Steps run in fixed order; see the module docs for the failure
    /// policy of each.
    pub fn run(&self) -> EngineResult<RunReport> {
        let mut report = RunReport::default();
        let blocks = self.gateway.list_children(&self.page_id)?;

        // Step 1: daily reset and scoring. Ratio comes from the pre-reset
        // snapshot; unchecking is unconditional and idempotent.
        if let Some(range) = section_range(&blocks, Section::Daily) {
            for block in &blocks[range] {
                if !block.is_todo() {
                    continue;
                }
                report.daily_total += 1;
                if block.checked {
                    report.daily_completed += 1;
                }
                self.gateway.set_todo_checked(&block.id, false)?;
            }
            if report.daily_total > 0 {
                self.record_daily_completion(&mut report);
            }
        }

        // Step 2: required headers. Tomorrow is optional.
        let headers = locate_headers(&blocks);
        let today_position = headers
            .today
            .ok_or(EngineError::MissingSection(Section::Today))?;
        headers
            .backlog
            .ok_or(EngineError::MissingSection(Section::Backlog))?;
        let today_anchor = blocks[today_position].id.clone();

        // Step 3: promote unchecked Tomorrow items to the top of Today;
        // archive checked ones. Copies land before originals are deleted.
        if let Some(range) = section_range(&blocks, Section::Tomorrow) {
            let mut copies = Vec::new();
            let mut originals = Vec::new();
            for block in &blocks[range] {
                if !block.is_todo() {
                    continue;
                }
                if block.checked {
                    self.archive_item(&block.text, &mut report);
                    report.archived += 1;
                } else {
                    copies.push(block.as_new_todo());
                }
                originals.push(block.id.clone());
            }
            if !copies.is_empty() {
                report.migrated_to_today = copies.len();
                self.gateway
                    .insert_after(&self.page_id, &today_anchor, &copies)?;
            }
            for id in &originals {
                self.gateway.archive_block(id)?;
            }
        }

        // Step 4: drop completed Backlog items, on a fresh snapshot.
        let blocks = self.gateway.list_children(&self.page_id)?;
        if let Some(range) = section_range(&blocks, Section::Backlog) {
            for block in &blocks[range] {
                if block.is_todo() && block.checked {
                    self.archive_item(&block.text, &mut report);
                    report.archived += 1;
                    self.gateway.archive_block(&block.id)?;
                }
            }
        }

        // Step 5: demote Today survivors into Backlog. The fresh snapshot
        // includes items promoted in step 3, so they keep moving through.
        let blocks = self.gateway.list_children(&self.page_id)?;
        let mut copies = Vec::new();
        let mut originals = Vec::new();
        if let Some(range) = section_range(&blocks, Section::Today) {
            for block in &blocks[range] {
                if !block.is_todo() {
                    continue;
                }
                if block.checked {
                    self.archive_item(&block.text, &mut report);
                    report.archived += 1;
                } else {
                    copies.push(block.as_new_todo());
                }
                originals.push(block.id.clone());
            }
        }
        if !copies.is_empty() {
            let backlog_anchor = header_block_id(&blocks, Section::Backlog)
                .ok_or(EngineError::MissingSection(Section::Backlog))?
                .clone();
            report.demoted_to_backlog = copies.len();
            self.gateway
                .insert_after(&self.page_id, &backlog_anchor, &copies)?;
        }
        for id in &originals {
            self.gateway.archive_block(id)?;
        }

        // Step 6: remove empty-paragraph separators inside Backlog so the
        // section renders as one unbroken checklist.
        let blocks = self.gateway.list_children(&self.page_id)?;
        if let Some(range) = section_range(&blocks, Section::Backlog) {
            for block in &blocks[range] {
                if block.is_empty_paragraph() {
                    self.gateway.archive_block(&block.id)?;
                    report.separators_removed += 1;
                }
            }
        }

        // Step 7: placeholder guarantee, fatal on failure.
        self.ensure_placeholders(&mut report)
            .map_err(EngineError::PlaceholderRepair)?;

        info!(
            "event=run_complete module=engine status=ok page={} {report}",
            self.page_id
        );
        Ok(report)
    }

    /// Appends one empty unchecked item to each of Today, Tomorrow and
    /// Daily that ended the run without any checklist item.
    fn ensure_placeholders(&self, report: &mut RunReport) -> GatewayResult<()> {
        let blocks = self.gateway.list_children(&self.page_id)?;
        let headers = locate_headers(&blocks);
        for section in [Section::Today, Section::Tomorrow, Section::Daily] {
            let Some(position) = headers.get(section) else {
                continue;
            };
            let occupied = section_range(&blocks, section)
                .map(|range| blocks[range].iter().any(|block| block.is_todo()))
                .unwrap_or(false);
            if occupied {
                continue;
            }
            self.gateway.insert_after(
                &self.page_id,
                &blocks[position].id,
                &[NewTodo::placeholder()],
            )?;
            report.placeholders_added += 1;
        }
        Ok(())
    }

    /// Best-effort write of the once-per-run cycle-outcome record.
    fn record_daily_completion(&self, report: &mut RunReport) {
        let Some(store) = self.resolve_store(&self.completion_store) else {
            return;
        };
        let record = LogRecord::DailyCompletion {
            completed: report.daily_completed,
            total: report.daily_total,
            date: self.date,
        };
        match self.gateway.append_record(&store, &record) {
            Ok(()) => report.completion_logged = true,
            Err(err) => warn!(
                "event=completion_log module=engine status=error error={err}"
            ),
        }
    }

    /// Best-effort archive of one completed item's text.
    ///
    /// Failure is isolated per item: deletion and later items proceed.
    fn archive_item(&self, text: &str, report: &mut RunReport) {
        let Some(store) = self.resolve_store(&self.done_store) else {
            return;
        };
        let record = LogRecord::DoneItem {
            text: text.to_string(),
            date: self.date,
        };
        match self.gateway.append_record(&store, &record) {
            Ok(()) => report.archive_records_written += 1,
            Err(err) => warn!("event=archive_log module=engine status=error error={err}"),
        }
    }

    /// Resolves a log store id at most once per run.
    ///
    /// Lookup failure or an unresolved title downgrades to "skip
    /// logging" with a warning; it never aborts the run.
    fn resolve_store(&self, binding: &StoreBinding) -> Option<StoreId> {
        binding
            .resolved
            .get_or_init(|| {
                if let Some(explicit) = &binding.explicit {
                    return Some(explicit.clone());
                }
                match self.gateway.find_store_by_title(binding.title) {
                    Ok(Some(store)) => Some(store),
                    Ok(None) => {
                        warn!(
                            "event=store_lookup module=engine status=missing title={}",
                            binding.title
                        );
                        None
                    }
                    Err(err) => {
                        warn!(
                            "event=store_lookup module=engine status=error title={} error={err}",
                            binding.title
                        );
                        None
                    }
                }
            })
            .clone()
    }
}
