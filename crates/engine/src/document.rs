//! Document staging.
//!
//! A `StagedDocument` accumulates every mutation of one top-level document
//! (purchase, sale, adjustment) against a snapshot of the store: bucket
//! post-states with the versions observed at first touch, kardex entries
//! chained per bucket key, and adjustment audit rows. Later lines of the
//! same document see earlier lines' staged effects, so a two-line sale of
//! the same variant consumes stock exactly once. Nothing reaches the store
//! until `into_write` + `commit`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use kardex_core::{DomainResult, TenantId, UserId, VariantId, WarehouseId};
use kardex_ledger::{
    AdjustmentRecord, BucketKey, KardexEntry, MovementDirection, MovementKind, StockBucket,
    weighted_average,
};

use crate::store::{BucketWrite, DocumentWrite, InventoryStore};

struct StagedBucket {
    bucket: StockBucket,
    expected_version: Option<u64>,
    touched: bool,
}

pub struct StagedDocument<'a, S: InventoryStore> {
    store: &'a S,
    tenant_id: TenantId,
    buckets: HashMap<BucketKey, StagedBucket>,
    /// Keys in first-touch order, for a deterministic commit layout.
    order: Vec<BucketKey>,
    entries: Vec<KardexEntry>,
    adjustments: Vec<AdjustmentRecord>,
}

impl<'a, S: InventoryStore> StagedDocument<'a, S> {
    pub fn new(store: &'a S, tenant_id: TenantId) -> Self {
        Self {
            store,
            tenant_id,
            buckets: HashMap::new(),
            order: Vec::new(),
            entries: Vec::new(),
            adjustments: Vec::new(),
        }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Staged state of `key`: the already-staged bucket, else the stored
    /// row, else a lazily opened empty bucket.
    fn staged_mut(&mut self, key: BucketKey) -> &mut StagedBucket {
        match self.buckets.entry(key) {
            std::collections::hash_map::Entry::Occupied(occupied) => occupied.into_mut(),
            std::collections::hash_map::Entry::Vacant(vacant) => {
                let staged = match self.store.bucket(self.tenant_id, &key) {
                    Some(bucket) => StagedBucket {
                        expected_version: Some(bucket.version),
                        bucket,
                        touched: false,
                    },
                    None => StagedBucket {
                        bucket: StockBucket::open(self.tenant_id, key),
                        expected_version: None,
                        touched: false,
                    },
                };
                self.order.push(key);
                vacant.insert(staged)
            }
        }
    }

    /// Staged state of a bucket this document already touched.
    pub fn staged_bucket(&self, key: &BucketKey) -> Option<&StockBucket> {
        self.buckets.get(key).map(|s| &s.bucket)
    }

    /// FIFO candidate view of a (warehouse, variant): stored buckets with
    /// staged states substituted, plus buckets this document created.
    pub fn candidate_buckets(
        &self,
        warehouse_id: WarehouseId,
        variant_id: VariantId,
    ) -> Vec<StockBucket> {
        let mut by_key: HashMap<BucketKey, StockBucket> = self
            .store
            .buckets_for_variant(self.tenant_id, warehouse_id, variant_id)
            .into_iter()
            .map(|b| (b.key, b))
            .collect();
        for (key, staged) in &self.buckets {
            if key.warehouse_id == warehouse_id && key.variant_id == variant_id {
                by_key.insert(*key, staged.bucket.clone());
            }
        }
        by_key.into_values().collect()
    }

    /// Stage a stock increase: WAC recomputation, bucket update, chained
    /// kardex entry. Returns the entry for the caller's receipt.
    pub fn receive(
        &mut self,
        key: BucketKey,
        quantity: i64,
        unit_cost: Decimal,
        recorded_at: DateTime<Utc>,
        reference: &str,
        recorded_by: Option<UserId>,
    ) -> DomainResult<KardexEntry> {
        let staged = self.staged_mut(key);
        let new_average = weighted_average(
            staged.bucket.quantity,
            staged.bucket.average_unit_cost,
            quantity,
            unit_cost,
        );
        staged.bucket.receive(quantity, new_average);
        staged.touched = true;
        let entry = KardexEntry::record(
            MovementKind::Entry,
            MovementDirection::Increase,
            quantity,
            unit_cost,
            &staged.bucket,
            recorded_at,
            reference,
            recorded_by,
        )?;
        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Stage one FIFO draw: decrement at the bucket's own average cost and
    /// chain the exit entry. Availability is the allocator's business; the
    /// release guard only catches plans gone stale.
    pub fn draw(
        &mut self,
        key: BucketKey,
        quantity: i64,
        recorded_at: DateTime<Utc>,
        reference: &str,
        recorded_by: Option<UserId>,
    ) -> DomainResult<KardexEntry> {
        let staged = self.staged_mut(key);
        let cost_at_draw = staged.bucket.average_unit_cost;
        staged.bucket.release(quantity)?;
        staged.touched = true;
        let entry = KardexEntry::record(
            MovementKind::Exit,
            MovementDirection::Decrease,
            quantity,
            cost_at_draw,
            &staged.bucket,
            recorded_at,
            reference,
            recorded_by,
        )?;
        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Stage a manual correction to an absolute quantity. Writes the audit
    /// row unconditionally and a kardex entry only when the quantity moved.
    pub fn correct(
        &mut self,
        key: BucketKey,
        new_quantity: i64,
        recorded_at: DateTime<Utc>,
        reason: &str,
        recorded_by: Option<UserId>,
    ) -> DomainResult<AdjustmentRecord> {
        let tenant_id = self.tenant_id;
        let staged = self.staged_mut(key);
        let stock_before = staged.bucket.quantity;
        let diff = new_quantity - stock_before;

        if diff != 0 {
            staged.bucket.set_quantity(new_quantity)?;
            staged.touched = true;
            let direction = if diff > 0 {
                MovementDirection::Increase
            } else {
                MovementDirection::Decrease
            };
            let entry = KardexEntry::record(
                MovementKind::Adjustment,
                direction,
                diff.abs(),
                staged.bucket.average_unit_cost,
                &staged.bucket,
                recorded_at,
                reason,
                recorded_by,
            )?;
            self.entries.push(entry);
        } else {
            // The audit row still lands; make sure a lazily opened bucket
            // is persisted too, matching get-or-create semantics.
            staged.touched = true;
        }

        let record = AdjustmentRecord::new(
            tenant_id,
            key,
            recorded_at,
            stock_before,
            new_quantity,
            reason,
            recorded_by,
        );
        self.adjustments.push(record.clone());
        Ok(record)
    }

    pub fn into_write(mut self) -> DocumentWrite {
        let buckets = self
            .order
            .iter()
            .filter_map(|key| self.buckets.remove(key))
            .filter(|staged| staged.touched)
            .map(|staged| BucketWrite {
                bucket: staged.bucket,
                expected_version: staged.expected_version,
            })
            .collect();
        DocumentWrite {
            tenant_id: self.tenant_id,
            buckets,
            entries: self.entries,
            adjustments: self.adjustments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::in_memory::InMemoryInventoryStore;
    use crate::store::InventoryStore as _;
    use rust_decimal_macros::dec;

    fn key() -> BucketKey {
        BucketKey::new(WarehouseId::new(), VariantId::new(), None)
    }

    #[test]
    fn later_lines_see_earlier_staged_state() {
        let store = InMemoryInventoryStore::new();
        let tenant = TenantId::new();
        let key = key();
        let mut doc = StagedDocument::new(&store, tenant);

        let now = Utc::now();
        doc.receive(key, 10, dec!(20.00), now, "PO-1", None).unwrap();
        let second = doc.receive(key, 10, dec!(30.00), now, "PO-1", None).unwrap();

        // The second line blends against the first line's staged state.
        assert_eq!(second.balance_quantity, 20);
        assert_eq!(second.balance_unit_cost, dec!(25.00));

        let write = doc.into_write();
        assert_eq!(write.buckets.len(), 1);
        assert_eq!(write.buckets[0].expected_version, None);
        assert_eq!(write.entries.len(), 2);
        store.commit(write).unwrap();
        assert_eq!(store.bucket(tenant, &key).unwrap().quantity, 20);
    }

    #[test]
    fn draws_consume_at_the_staged_average() {
        let store = InMemoryInventoryStore::new();
        let tenant = TenantId::new();
        let key = key();
        let now = Utc::now();

        let mut seed = StagedDocument::new(&store, tenant);
        seed.receive(key, 10, dec!(4.00), now, "PO-1", None).unwrap();
        store.commit(seed.into_write()).unwrap();

        let mut doc = StagedDocument::new(&store, tenant);
        let exit = doc.draw(key, 4, now, "SALE-1", None).unwrap();
        assert_eq!(exit.unit_cost, dec!(4.00));
        assert_eq!(exit.balance_quantity, 6);

        let write = doc.into_write();
        assert_eq!(write.buckets[0].expected_version, Some(1));
        store.commit(write).unwrap();
        assert_eq!(store.bucket(tenant, &key).unwrap().quantity, 6);
    }

    #[test]
    fn noop_correction_stages_audit_but_no_entry() {
        let store = InMemoryInventoryStore::new();
        let tenant = TenantId::new();
        let key = key();
        let mut doc = StagedDocument::new(&store, tenant);

        let record = doc.correct(key, 0, Utc::now(), "recount", None).unwrap();
        assert_eq!((record.stock_before, record.stock_after), (0, 0));

        let write = doc.into_write();
        assert!(write.entries.is_empty());
        assert_eq!(write.adjustments.len(), 1);
        // Bucket is still created, per get-or-create semantics.
        assert_eq!(write.buckets.len(), 1);
        store.commit(write).unwrap();
        assert_eq!(store.bucket(tenant, &key).unwrap().quantity, 0);
    }
}
