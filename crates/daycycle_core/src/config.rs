//! Run configuration from the environment.
//!
//! # Responsibility
//! - Collect the access credential, page id and optional log store ids
//!   from environment variables (with `.env` support).
//! - Normalize page identifiers: bare 32-hex ids, dashed UUIDs and
//!   Notion URL components are all accepted.
//!
//! # Invariants
//! - Missing credential or page id is a hard configuration error.
//! - Missing store ids are not errors; the engine falls back to
//!   title lookup, then to skipping the log writes.

use crate::gateway::StoreId;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const ENV_TOKEN: &str = "NOTION_TOKEN";
pub const ENV_PAGE_ID: &str = "NOTION_PAGE_ID";
pub const ENV_DONE_STORE: &str = "NOTION_DONE_DB_ID";
pub const ENV_COMPLETION_STORE: &str = "NOTION_DAILY_COMP_DB_ID";

static HEX_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new("[0-9a-fA-F]{32,}").expect("hex-run pattern is valid")
});

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration-stage error; always fatal for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    MissingVar(&'static str),
    /// The page identifier could not be normalized to a block id.
    InvalidPageId(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingVar(name) => write!(f, "set the {name} environment variable"),
            Self::InvalidPageId(value) => {
                write!(f, "cannot extract a page id from `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Everything one reconciliation run needs from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Integration access token.
    pub token: String,
    /// Normalized id of the to-do page.
    pub page_id: String,
    /// Archived-item store id, when configured directly.
    pub done_store: Option<StoreId>,
    /// Cycle-outcome store id, when configured directly.
    pub completion_store: Option<StoreId>,
}

impl RunConfig {
    /// Loads configuration from the process environment, reading a
    /// `.env` file first when present.
    pub fn from_env() -> ConfigResult<Self> {
        load_env_files();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration through an arbitrary variable lookup.
    ///
    /// The seam lets tests and the CLI inject overrides without
    /// touching process-global state.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let token = require(&lookup, ENV_TOKEN)?;
        let raw_page = require(&lookup, ENV_PAGE_ID)?;
        Ok(Self {
            token,
            page_id: normalize_page_id(&raw_page)?,
            done_store: optional(&lookup, ENV_DONE_STORE),
            completion_store: optional(&lookup, ENV_COMPLETION_STORE),
        })
    }
}

/// Reads `.env` into the process environment, ignoring a missing file.
pub fn load_env_files() {
    let _ = dotenvy::dotenv();
}

fn require(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> ConfigResult<String> {
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::MissingVar(key)),
    }
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Extracts a page id from a bare id, a dashed UUID or a page URL.
///
/// Page URLs end in `<Title-Slug>-<32 hex chars>`; dashes are ignored,
/// and when the slug itself supplies hex characters the last 32 of the
/// final hex run are the id.
pub fn normalize_page_id(raw: &str) -> ConfigResult<String> {
    let trimmed = raw.trim();
    let tail = trimmed.rsplit('/').next().unwrap_or(trimmed);
    let tail = tail.split('?').next().unwrap_or(tail);
    let compact: String = tail.chars().filter(|c| *c != '-').collect();

    let run = HEX_RUN
        .find_iter(&compact)
        .last()
        .ok_or_else(|| ConfigError::InvalidPageId(trimmed.to_string()))?;
    let hex = run.as_str();
    Ok(hex[hex.len() - 32..].to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::{normalize_page_id, ConfigError, RunConfig, ENV_PAGE_ID, ENV_TOKEN};
    use std::collections::HashMap;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        move |key| map.get(key).map(|value| value.to_string())
    }

    const PAGE_HEX: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn missing_token_is_reported_by_name() {
        let err = RunConfig::from_lookup(lookup(&[(ENV_PAGE_ID, PAGE_HEX)])).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar(ENV_TOKEN));
    }

    #[test]
    fn blank_page_id_is_missing_not_invalid() {
        let err =
            RunConfig::from_lookup(lookup(&[(ENV_TOKEN, "secret"), (ENV_PAGE_ID, "  ")]))
                .unwrap_err();
        assert_eq!(err, ConfigError::MissingVar(ENV_PAGE_ID));
    }

    #[test]
    fn accepts_bare_and_dashed_ids() {
        assert_eq!(normalize_page_id(PAGE_HEX).unwrap(), PAGE_HEX);
        assert_eq!(
            normalize_page_id("01234567-89ab-cdef-0123-456789abcdef").unwrap(),
            PAGE_HEX
        );
    }

    #[test]
    fn extracts_id_from_page_url() {
        let url = format!("https://www.notion.so/My-Workspace/Daily-Tasks-{PAGE_HEX}?v=abc");
        assert_eq!(normalize_page_id(&url).unwrap(), PAGE_HEX);
    }

    #[test]
    fn hexish_slug_does_not_confuse_extraction() {
        // "deadbeef" in the slug merges into the final hex run; the id is
        // still the last 32 characters.
        let url = format!("https://www.notion.so/deadbeef-{PAGE_HEX}");
        assert_eq!(normalize_page_id(&url).unwrap(), PAGE_HEX);
    }

    #[test]
    fn rejects_text_without_id() {
        let err = normalize_page_id("not-a-page").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPageId(_)));
    }

    #[test]
    fn optional_stores_pass_through() {
        let config = RunConfig::from_lookup(lookup(&[
            (ENV_TOKEN, "secret"),
            (ENV_PAGE_ID, PAGE_HEX),
            (super::ENV_DONE_STORE, "store-1"),
        ]))
        .unwrap();
        assert_eq!(config.done_store.as_deref(), Some("store-1"));
        assert_eq!(config.completion_store, None);
    }
}
