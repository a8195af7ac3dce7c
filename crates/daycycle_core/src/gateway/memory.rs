//! In-memory document gateway for tests and offline exercising.
//!
//! # Responsibility
//! - Hold one page's block list and the two log stores entirely in
//!   process, behind the same `DocumentGateway` contract the engine
//!   consumes in production.
//! - Allow per-operation failure injection so the best-effort vs. fatal
//!   propagation policy is testable.
//!
//! # Invariants
//! - Single-threaded use only; interior mutability is `RefCell`-based.
//! - Minted block ids are unique for the lifetime of the gateway.

use crate::gateway::{DocumentGateway, GatewayError, GatewayResult, LogRecord, StoreId};
use crate::model::block::{Block, BlockId, NewTodo};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use uuid::Uuid;

/// In-memory gateway over one page and its log stores.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    blocks: RefCell<Vec<Block>>,
    stores: RefCell<BTreeMap<StoreId, Vec<LogRecord>>>,
    titles: RefCell<BTreeMap<String, StoreId>>,
    fail_record_appends: Cell<bool>,
    fail_store_lookup: Cell<bool>,
}

impl MemoryGateway {
    /// Creates a gateway whose page holds the given blocks.
    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        let gateway = Self::default();
        *gateway.blocks.borrow_mut() = blocks;
        gateway
    }

    /// Registers a log store under a title and returns its id.
    pub fn register_store(&self, title: &str) -> StoreId {
        let id = Uuid::new_v4().to_string();
        self.stores.borrow_mut().insert(id.clone(), Vec::new());
        self.titles.borrow_mut().insert(title.to_string(), id.clone());
        id
    }

    /// Snapshot of the page's current block list.
    pub fn blocks(&self) -> Vec<Block> {
        self.blocks.borrow().clone()
    }

    /// Records appended to one store so far.
    pub fn records(&self, store: &StoreId) -> Vec<LogRecord> {
        self.stores.borrow().get(store).cloned().unwrap_or_default()
    }

    /// Makes every subsequent `append_record` fail.
    pub fn fail_record_appends(&self) {
        self.fail_record_appends.set(true);
    }

    /// Makes every subsequent `find_store_by_title` fail.
    pub fn fail_store_lookup(&self) {
        self.fail_store_lookup.set(true);
    }

    fn position_of(&self, id: &BlockId) -> GatewayResult<usize> {
        self.blocks
            .borrow()
            .iter()
            .position(|block| &block.id == id)
            .ok_or_else(|| GatewayError::Api {
                status: 404,
                message: format!("unknown block {id}"),
            })
    }
}

impl DocumentGateway for MemoryGateway {
    fn verify_document(&self, _page: &BlockId) -> GatewayResult<()> {
        Ok(())
    }

    fn list_children(&self, _parent: &BlockId) -> GatewayResult<Vec<Block>> {
        Ok(self.blocks())
    }

    fn insert_after(
        &self,
        _parent: &BlockId,
        anchor: &BlockId,
        items: &[NewTodo],
    ) -> GatewayResult<()> {
        let position = self.position_of(anchor)?;
        let minted = items.iter().map(|item| {
            let mut block = Block::todo(Uuid::new_v4().to_string(), item.text.clone(), false);
            block.color = item.color.clone();
            block
        });
        self.blocks
            .borrow_mut()
            .splice(position + 1..position + 1, minted);
        Ok(())
    }

    fn archive_block(&self, id: &BlockId) -> GatewayResult<()> {
        let position = self.position_of(id)?;
        self.blocks.borrow_mut().remove(position);
        Ok(())
    }

    fn set_todo_checked(&self, id: &BlockId, checked: bool) -> GatewayResult<()> {
        let position = self.position_of(id)?;
        let mut blocks = self.blocks.borrow_mut();
        let block = &mut blocks[position];
        if !block.is_todo() {
            return Err(GatewayError::Api {
                status: 400,
                message: format!("block {id} is not a checklist item"),
            });
        }
        block.checked = checked;
        Ok(())
    }

    fn append_record(&self, store: &StoreId, record: &LogRecord) -> GatewayResult<()> {
        if self.fail_record_appends.get() {
            return Err(GatewayError::Api {
                status: 500,
                message: "record append failure injected".to_string(),
            });
        }
        let mut stores = self.stores.borrow_mut();
        let records = stores.get_mut(store).ok_or_else(|| GatewayError::Api {
            status: 404,
            message: format!("unknown store {store}"),
        })?;
        records.push(record.clone());
        Ok(())
    }

    fn find_store_by_title(&self, title: &str) -> GatewayResult<Option<StoreId>> {
        if self.fail_store_lookup.get() {
            return Err(GatewayError::Api {
                status: 500,
                message: "store lookup failure injected".to_string(),
            });
        }
        let titles = self.titles.borrow();
        Ok(titles
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(title))
            .map(|(_, id)| id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryGateway;
    use crate::gateway::DocumentGateway;
    use crate::model::block::{Block, NewTodo};

    #[test]
    fn insert_after_preserves_payload_order() {
        let gateway = MemoryGateway::with_blocks(vec![
            Block::heading("h", "Today:"),
            Block::todo("t", "existing", false),
        ]);
        let items = vec![
            NewTodo {
                text: "first".into(),
                color: "default".into(),
            },
            NewTodo {
                text: "second".into(),
                color: "default".into(),
            },
        ];
        gateway
            .insert_after(&"page".to_string(), &"h".to_string(), &items)
            .unwrap();

        let texts: Vec<_> = gateway.blocks().iter().map(|b| b.text.clone()).collect();
        assert_eq!(texts, vec!["Today:", "first", "second", "existing"]);
    }

    #[test]
    fn archive_removes_block_and_rejects_unknown_id() {
        let gateway = MemoryGateway::with_blocks(vec![Block::todo("t", "x", false)]);
        gateway.archive_block(&"t".to_string()).unwrap();
        assert!(gateway.blocks().is_empty());
        assert!(gateway.archive_block(&"t".to_string()).is_err());
    }

    #[test]
    fn store_lookup_is_case_insensitive() {
        let gateway = MemoryGateway::default();
        let id = gateway.register_store("Done");
        let found = gateway.find_store_by_title("done").unwrap();
        assert_eq!(found, Some(id));
        assert_eq!(gateway.find_store_by_title("Missing").unwrap(), None);
    }
}
