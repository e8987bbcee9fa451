//! In-memory inventory store.
//!
//! Intended for tests/dev and as the reference behavior a persistence
//! adapter must reproduce. A single `RwLock` guards all state; `commit`
//! validates and applies under one write acquisition, which makes it the
//! serialization point for concurrent documents.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use kardex_core::{LotId, TenantId, VariantId, WarehouseId};
use kardex_ledger::{AdjustmentRecord, BucketKey, KardexEntry, StockBucket};

use super::{
    BucketWrite, CommittedDocument, DocumentWrite, InventoryStore, StockQuery, StoreError,
};

#[derive(Debug, Default)]
struct State {
    buckets: HashMap<(TenantId, BucketKey), StockBucket>,
    /// Global append order; per-key order is the subsequence.
    entries: Vec<KardexEntry>,
    next_sequence: HashMap<(TenantId, BucketKey), u64>,
    adjustments: Vec<AdjustmentRecord>,
}

#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    inner: RwLock<State>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::InvalidCommit("store lock poisoned".to_string())
}

/// Validate a staged document against current state. Returns the balance
/// each entry chain starts from, keyed by bucket key.
fn validate(
    state: &State,
    document: &DocumentWrite,
) -> Result<HashMap<BucketKey, i64>, StoreError> {
    let tenant_id = document.tenant_id;

    for (idx, write) in document.buckets.iter().enumerate() {
        if write.bucket.tenant_id != tenant_id {
            return Err(StoreError::TenantIsolation(format!(
                "bucket write {idx} targets another tenant"
            )));
        }
        if write.bucket.quantity < 0 {
            return Err(StoreError::InvalidCommit(format!(
                "bucket write {idx} would store a negative quantity"
            )));
        }

        let current = state.buckets.get(&(tenant_id, write.bucket.key));
        match (write.expected_version, current) {
            (None, None) => {}
            (None, Some(_)) => {
                return Err(StoreError::Conflict(format!(
                    "bucket {:?} was created concurrently",
                    write.bucket.key
                )));
            }
            (Some(expected), Some(current)) if current.version == expected => {}
            (Some(expected), Some(current)) => {
                return Err(StoreError::Conflict(format!(
                    "bucket {:?} moved from version {expected} to {}",
                    write.bucket.key, current.version
                )));
            }
            (Some(_), None) => {
                return Err(StoreError::Conflict(format!(
                    "bucket {:?} disappeared during staging",
                    write.bucket.key
                )));
            }
        }
    }

    // Entries must chain off the stored balance, bucket writes must land on
    // the final chained balance, and every entry needs its staged bucket.
    let staged_keys: HashMap<BucketKey, &BucketWrite> = document
        .buckets
        .iter()
        .map(|w| (w.bucket.key, w))
        .collect();

    let mut chain: HashMap<BucketKey, i64> = HashMap::new();
    for (idx, entry) in document.entries.iter().enumerate() {
        if entry.tenant_id != tenant_id {
            return Err(StoreError::TenantIsolation(format!(
                "entry {idx} targets another tenant"
            )));
        }
        if !staged_keys.contains_key(&entry.key) {
            return Err(StoreError::InvalidCommit(format!(
                "entry {idx} references a bucket the document did not stage"
            )));
        }
        let previous = *chain.entry(entry.key).or_insert_with(|| {
            state
                .entries
                .iter()
                .rev()
                .find(|e| e.tenant_id == tenant_id && e.key == entry.key)
                .map(|e| e.balance_quantity)
                .unwrap_or(0)
        });
        if !entry.chains_from(previous) {
            return Err(StoreError::InvalidCommit(format!(
                "entry {idx} breaks the balance chain (previous {previous}, \
                 balance {} after {:+})",
                entry.balance_quantity,
                entry.delta()
            )));
        }
        chain.insert(entry.key, entry.balance_quantity);
    }

    for (key, final_balance) in &chain {
        let staged = staged_keys[key];
        if staged.bucket.quantity != *final_balance {
            return Err(StoreError::InvalidCommit(format!(
                "bucket {key:?} stores quantity {} but its entries chain to {final_balance}",
                staged.bucket.quantity
            )));
        }
    }

    Ok(chain)
}

impl InventoryStore for InMemoryInventoryStore {
    fn bucket(&self, tenant_id: TenantId, key: &BucketKey) -> Option<StockBucket> {
        let state = self.inner.read().ok()?;
        state.buckets.get(&(tenant_id, *key)).cloned()
    }

    fn buckets_for_variant(
        &self,
        tenant_id: TenantId,
        warehouse_id: WarehouseId,
        variant_id: VariantId,
    ) -> Vec<StockBucket> {
        let Ok(state) = self.inner.read() else {
            return vec![];
        };
        state
            .buckets
            .iter()
            .filter(|((t, key), _)| {
                *t == tenant_id && key.warehouse_id == warehouse_id && key.variant_id == variant_id
            })
            .map(|(_, bucket)| bucket.clone())
            .collect()
    }

    fn buckets(&self, tenant_id: TenantId, query: StockQuery) -> Vec<StockBucket> {
        let Ok(state) = self.inner.read() else {
            return vec![];
        };
        let mut rows: Vec<StockBucket> = state
            .buckets
            .iter()
            .filter(|((t, key), _)| {
                *t == tenant_id
                    && query.warehouse_id.is_none_or(|w| key.warehouse_id == w)
                    && query.variant_id.is_none_or(|v| key.variant_id == v)
            })
            .map(|(_, bucket)| bucket.clone())
            .collect();
        rows.sort_by_key(|b| b.id);
        rows
    }

    fn last_entry(&self, tenant_id: TenantId, key: &BucketKey) -> Option<KardexEntry> {
        let state = self.inner.read().ok()?;
        state
            .entries
            .iter()
            .rev()
            .find(|e| e.tenant_id == tenant_id && e.key == *key)
            .cloned()
    }

    fn ledger(
        &self,
        tenant_id: TenantId,
        warehouse_id: WarehouseId,
        variant_id: VariantId,
        lot_id: Option<LotId>,
    ) -> Vec<KardexEntry> {
        let Ok(state) = self.inner.read() else {
            return vec![];
        };
        let mut rows: Vec<KardexEntry> = state
            .entries
            .iter()
            .filter(|e| {
                e.tenant_id == tenant_id
                    && e.key.warehouse_id == warehouse_id
                    && e.key.variant_id == variant_id
                    && lot_id.is_none_or(|lot| e.key.lot_id == Some(lot))
            })
            .cloned()
            .collect();
        rows.sort_by_key(|e| e.recorded_at);
        rows
    }

    fn ledger_between(
        &self,
        tenant_id: TenantId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<KardexEntry> {
        let Ok(state) = self.inner.read() else {
            return vec![];
        };
        let mut rows: Vec<KardexEntry> = state
            .entries
            .iter()
            .filter(|e| e.tenant_id == tenant_id && e.recorded_at >= from && e.recorded_at <= to)
            .cloned()
            .collect();
        rows.sort_by_key(|e| e.recorded_at);
        rows
    }

    fn adjustments(&self, tenant_id: TenantId) -> Vec<AdjustmentRecord> {
        let Ok(state) = self.inner.read() else {
            return vec![];
        };
        state
            .adjustments
            .iter()
            .filter(|a| a.tenant_id == tenant_id)
            .cloned()
            .collect()
    }

    fn commit(&self, document: DocumentWrite) -> Result<CommittedDocument, StoreError> {
        let mut state = self.inner.write().map_err(|_| poisoned())?;

        validate(&state, &document)?;

        // Validation passed: apply everything. Nothing below can fail.
        let tenant_id = document.tenant_id;
        for write in document.buckets {
            state
                .buckets
                .insert((tenant_id, write.bucket.key), write.bucket);
        }

        let mut committed = Vec::with_capacity(document.entries.len());
        for mut entry in document.entries {
            let next = state
                .next_sequence
                .entry((tenant_id, entry.key))
                .or_insert(1);
            entry.sequence = *next;
            *next += 1;
            state.entries.push(entry.clone());
            committed.push(entry);
        }

        state.adjustments.extend(document.adjustments);

        Ok(CommittedDocument { entries: committed })
    }
}
