//! Inventory storage abstraction.
//!
//! The store exposes snapshot reads plus a single atomic `commit` of a
//! whole document: every staged bucket upsert (checked against the version
//! read at staging time), every kardex append (sequenced per bucket key),
//! and every adjustment record apply together or not at all. That commit is
//! the serialization point the running-balance invariant relies on.

pub mod in_memory;

use chrono::{DateTime, Utc};
use thiserror::Error;

use kardex_core::{DomainError, LotId, TenantId, VariantId, WarehouseId};
use kardex_ledger::{AdjustmentRecord, BucketKey, KardexEntry, StockBucket};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A staged bucket version no longer matches the stored row (or a
    /// create raced another create). Retryable by re-staging.
    #[error("concurrency conflict: {0}")]
    Conflict(String),

    /// The document mixes tenants.
    #[error("tenant isolation violation: {0}")]
    TenantIsolation(String),

    /// The document is internally inconsistent (broken balance chain,
    /// negative quantity, entry for an unstaged bucket).
    #[error("invalid commit: {0}")]
    InvalidCommit(String),
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(msg) => DomainError::conflict(msg),
            StoreError::TenantIsolation(msg) | StoreError::InvalidCommit(msg) => {
                DomainError::invariant(msg)
            }
        }
    }
}

/// One staged bucket upsert.
#[derive(Debug, Clone)]
pub struct BucketWrite {
    /// The bucket's post-document state.
    pub bucket: StockBucket,
    /// Version observed when staging began; `None` means the bucket was
    /// created by this document and no stored row may exist yet.
    pub expected_version: Option<u64>,
}

/// A fully staged document, ready for atomic commit.
#[derive(Debug, Clone)]
pub struct DocumentWrite {
    pub tenant_id: TenantId,
    pub buckets: Vec<BucketWrite>,
    /// Kardex entries in document order; sequences are assigned at commit.
    pub entries: Vec<KardexEntry>,
    pub adjustments: Vec<AdjustmentRecord>,
}

/// Commit result: the appended entries with their assigned sequences.
#[derive(Debug, Clone)]
pub struct CommittedDocument {
    pub entries: Vec<KardexEntry>,
}

/// Filter for current-stock listings.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct StockQuery {
    pub warehouse_id: Option<WarehouseId>,
    pub variant_id: Option<VariantId>,
}

pub trait InventoryStore: Send + Sync {
    /// Current state of one bucket, if it exists.
    fn bucket(&self, tenant_id: TenantId, key: &BucketKey) -> Option<StockBucket>;

    /// All buckets of a (warehouse, variant) pair — the FIFO candidate set.
    fn buckets_for_variant(
        &self,
        tenant_id: TenantId,
        warehouse_id: WarehouseId,
        variant_id: VariantId,
    ) -> Vec<StockBucket>;

    /// Current stock rows matching `query`.
    fn buckets(&self, tenant_id: TenantId, query: StockQuery) -> Vec<StockBucket>;

    /// Latest kardex entry for a bucket key, if any.
    fn last_entry(&self, tenant_id: TenantId, key: &BucketKey) -> Option<KardexEntry>;

    /// Kardex of a (warehouse, variant), ascending; a lot narrows to that
    /// lot's bucket, otherwise all of the pair's buckets are included.
    fn ledger(
        &self,
        tenant_id: TenantId,
        warehouse_id: WarehouseId,
        variant_id: VariantId,
        lot_id: Option<LotId>,
    ) -> Vec<KardexEntry>;

    /// Kardex across the tenant within `[from, to]`, ascending.
    fn ledger_between(
        &self,
        tenant_id: TenantId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<KardexEntry>;

    /// Adjustment audit log, ascending.
    fn adjustments(&self, tenant_id: TenantId) -> Vec<AdjustmentRecord>;

    /// Atomically apply a staged document.
    fn commit(&self, document: DocumentWrite) -> Result<CommittedDocument, StoreError>;
}
