//! `kardex-engine` — orchestration layer of the inventory ledger.
//!
//! Composes the catalog and the inventory store with the pure domain from
//! `kardex-ledger`: movement processors stage a whole document against a
//! snapshot, and the store commits it atomically under an optimistic
//! version check; on conflict the engine re-stages and retries within a
//! bounded budget.

pub mod document;
pub mod engine;
pub mod processors;
pub mod store;


pub use document::StagedDocument;
pub use engine::{DEFAULT_RETRY_BUDGET, LedgerEngine, StockSummary};
pub use processors::adjustment::{AdjustmentReceipt, AdjustmentRequest};
pub use processors::entry::{EntryLine, EntryReceipt, EntryRequest, LineBalance, LotSpec};
pub use processors::exit::{DrawBalance, ExitLine, ExitLineResult, ExitReceipt, ExitRequest};
pub use store::{
    BucketWrite, CommittedDocument, DocumentWrite, InventoryStore, StockQuery, StoreError,
    in_memory::InMemoryInventoryStore,
};
