//! Notion REST implementation of the document gateway.
//!
//! # Responsibility
//! - Map gateway operations onto Notion's block/page/search endpoints
//!   (wire version `2022-06-28`).
//! - Decode remote block payloads into `Block` snapshots and encode
//!   checklist creation payloads.
//!
//! # Invariants
//! - Pagination of child listings is transparent to callers.
//! - A non-success HTTP status always becomes `GatewayError::Api`.
//! - Unknown block types decode to inert `Other` blocks so snapshot
//!   indices stay aligned with the remote page.

use crate::gateway::{DocumentGateway, GatewayError, GatewayResult, LogRecord, StoreId};
use crate::model::block::{Block, BlockId, BlockKind, NewTodo, DEFAULT_COLOR};
use log::debug;
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SEARCH_PAGE_SIZE: u32 = 25;
const ERROR_BODY_MAX_CHARS: usize = 400;

/// Blocking Notion API client implementing `DocumentGateway`.
pub struct NotionGateway {
    client: Client,
    token: String,
    base_url: String,
}

impl NotionGateway {
    /// Creates a gateway authenticated with an integration token.
    pub fn new(token: impl Into<String>) -> GatewayResult<Self> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Creates a gateway against a non-default API origin.
    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> GatewayResult<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            token: token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, builder: RequestBuilder) -> GatewayResult<Value> {
        let response = builder
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: truncate(&body, ERROR_BODY_MAX_CHARS),
            });
        }
        response.json::<Value>().map_err(GatewayError::from)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

impl DocumentGateway for NotionGateway {
    fn verify_document(&self, page: &BlockId) -> GatewayResult<()> {
        // A 404 here also covers the integration not being invited to
        // the page; the CLI surfaces that hint.
        self.request(self.client.get(self.url(&format!("pages/{page}"))))?;
        Ok(())
    }

    fn list_children(&self, parent: &BlockId) -> GatewayResult<Vec<Block>> {
        let url = self.url(&format!("blocks/{parent}/children"));
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut builder = self.client.get(url.as_str());
            if let Some(cursor) = &cursor {
                builder = builder.query(&[("start_cursor", cursor.as_str())]);
            }
            let page = self.request(builder)?;
            let results = page
                .get("results")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    GatewayError::InvalidResponse("children listing without results".into())
                })?;
            for value in results {
                blocks.push(decode_block(value)?);
            }
            if page.get("has_more").and_then(Value::as_bool) == Some(true) {
                cursor = page
                    .get("next_cursor")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                if cursor.is_none() {
                    return Err(GatewayError::InvalidResponse(
                        "has_more set without next_cursor".into(),
                    ));
                }
            } else {
                break;
            }
        }
        debug!(
            "event=list_children module=gateway status=ok parent={parent} count={}",
            blocks.len()
        );
        Ok(blocks)
    }

    fn insert_after(
        &self,
        parent: &BlockId,
        anchor: &BlockId,
        items: &[NewTodo],
    ) -> GatewayResult<()> {
        let children: Vec<Value> = items.iter().map(encode_new_todo).collect();
        let payload = json!({ "children": children, "after": anchor });
        self.request(
            self.client
                .patch(self.url(&format!("blocks/{parent}/children")))
                .json(&payload),
        )?;
        Ok(())
    }

    fn archive_block(&self, id: &BlockId) -> GatewayResult<()> {
        self.request(
            self.client
                .patch(self.url(&format!("blocks/{id}")))
                .json(&json!({ "archived": true })),
        )?;
        Ok(())
    }

    fn set_todo_checked(&self, id: &BlockId, checked: bool) -> GatewayResult<()> {
        self.request(
            self.client
                .patch(self.url(&format!("blocks/{id}")))
                .json(&json!({ "to_do": { "checked": checked } })),
        )?;
        Ok(())
    }

    fn append_record(&self, store: &StoreId, record: &LogRecord) -> GatewayResult<()> {
        let payload = json!({
            "parent": { "type": "database_id", "database_id": store },
            "properties": record_properties(record),
        });
        self.request(self.client.post(self.url("pages")).json(&payload))?;
        Ok(())
    }

    fn find_store_by_title(&self, title: &str) -> GatewayResult<Option<StoreId>> {
        let payload = json!({
            "query": title,
            "filter": { "value": "database", "property": "object" },
            "page_size": SEARCH_PAGE_SIZE,
        });
        let found = self.request(self.client.post(self.url("search")).json(&payload))?;
        let results = found
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| GatewayError::InvalidResponse("search without results".into()))?;
        for item in results {
            let candidate = item
                .get("title")
                .map(joined_plain_text)
                .unwrap_or_default();
            if candidate.trim().eq_ignore_ascii_case(title) {
                if let Some(id) = item.get("id").and_then(Value::as_str) {
                    return Ok(Some(id.to_string()));
                }
            }
        }
        Ok(None)
    }
}

/// Joins the `plain_text` of every span in a rich-text array.
fn joined_plain_text(spans: &Value) -> String {
    spans
        .as_array()
        .map(|spans| {
            spans
                .iter()
                .filter_map(|span| span.get("plain_text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Decodes one remote block payload into a `Block` snapshot.
fn decode_block(value: &Value) -> GatewayResult<Block> {
    let id = value
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::InvalidResponse("block without id".into()))?
        .to_string();
    let kind = value.get("type").and_then(Value::as_str).unwrap_or("");
    let body = value.get(kind).cloned().unwrap_or(Value::Null);
    let text = body
        .get("rich_text")
        .map(joined_plain_text)
        .unwrap_or_default()
        .trim()
        .to_string();

    let block = match kind {
        "heading_1" | "heading_2" | "heading_3" => Block::heading(id, text),
        "paragraph" => Block::paragraph(id, text),
        "to_do" => {
            let checked = body.get("checked").and_then(Value::as_bool).unwrap_or(false);
            let color = body
                .get("color")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_COLOR)
                .to_string();
            let mut block = Block::todo(id, text, checked);
            block.color = color;
            block
        }
        _ => Block::other(id),
    };
    debug_assert!(block.kind != BlockKind::Other || block.text.is_empty());
    Ok(block)
}

/// Encodes one checklist creation payload.
fn encode_new_todo(item: &NewTodo) -> Value {
    json!({
        "object": "block",
        "type": "to_do",
        "to_do": {
            "rich_text": [{ "type": "text", "text": { "content": item.text } }],
            "checked": false,
            "color": item.color,
        }
    })
}

/// Maps a log record onto the properties of its store's schema.
///
/// Archived items use a `Name` title column, completion ratios a `State`
/// title column; both carry a `Date` column.
fn record_properties(record: &LogRecord) -> Value {
    let title = json!({ "title": [{ "type": "text", "text": { "content": record.label() } }] });
    let date = json!({ "date": { "start": record.date().to_string() } });
    match record {
        LogRecord::DoneItem { .. } => json!({ "Name": title, "Date": date }),
        LogRecord::DailyCompletion { .. } => json!({ "State": title, "Date": date }),
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    let mut truncated: String = value.chars().take(max_chars).collect();
    if value.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::{decode_block, encode_new_todo, joined_plain_text, record_properties};
    use crate::gateway::LogRecord;
    use crate::model::block::{BlockKind, NewTodo};
    use chrono::NaiveDate;
    use serde_json::json;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
    }

    #[test]
    fn decodes_heading_levels_to_heading_kind() {
        for level in ["heading_1", "heading_2", "heading_3"] {
            let value = json!({
                "id": "b1",
                "type": level,
                level: { "rich_text": [{ "plain_text": "Today:" }] },
            });
            let block = decode_block(&value).unwrap();
            assert_eq!(block.kind, BlockKind::Heading);
            assert_eq!(block.text, "Today:");
        }
    }

    #[test]
    fn decodes_todo_with_checked_state_and_color() {
        let value = json!({
            "id": "b2",
            "type": "to_do",
            "to_do": {
                "rich_text": [{ "plain_text": "ship " }, { "plain_text": "it" }],
                "checked": true,
                "color": "red",
            },
        });
        let block = decode_block(&value).unwrap();
        assert_eq!(block.kind, BlockKind::Todo);
        assert_eq!(block.text, "ship it");
        assert!(block.checked);
        assert_eq!(block.color, "red");
    }

    #[test]
    fn decodes_unknown_type_to_inert_other() {
        let value = json!({ "id": "b3", "type": "divider", "divider": {} });
        let block = decode_block(&value).unwrap();
        assert_eq!(block.kind, BlockKind::Other);
        assert!(block.text.is_empty());
        assert!(!block.is_empty_paragraph());
    }

    #[test]
    fn decode_rejects_block_without_id() {
        let value = json!({ "type": "paragraph", "paragraph": { "rich_text": [] } });
        assert!(decode_block(&value).is_err());
    }

    #[test]
    fn joined_plain_text_handles_missing_spans() {
        assert_eq!(joined_plain_text(&json!(null)), "");
        assert_eq!(
            joined_plain_text(&json!([{ "plain_text": "a" }, {}, { "plain_text": "b" }])),
            "ab"
        );
    }

    #[test]
    fn encoded_todo_is_always_unchecked() {
        let value = encode_new_todo(&NewTodo {
            text: "carry over".into(),
            color: "blue".into(),
        });
        assert_eq!(value["type"], "to_do");
        assert_eq!(value["to_do"]["checked"], false);
        assert_eq!(value["to_do"]["color"], "blue");
        assert_eq!(value["to_do"]["rich_text"][0]["text"]["content"], "carry over");
    }

    #[test]
    fn done_record_uses_name_column_with_task_fallback() {
        let value = record_properties(&LogRecord::DoneItem {
            text: String::new(),
            date: date(),
        });
        assert_eq!(value["Name"]["title"][0]["text"]["content"], "Task");
        assert_eq!(value["Date"]["date"]["start"], "2026-08-30");
        assert!(value.get("State").is_none());
    }

    #[test]
    fn completion_record_uses_state_column() {
        let value = record_properties(&LogRecord::DailyCompletion {
            completed: 2,
            total: 3,
            date: date(),
        });
        assert_eq!(value["State"]["title"][0]["text"]["content"], "2/3");
        assert!(value.get("Name").is_none());
    }
}
