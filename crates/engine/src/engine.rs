//! The ledger engine: public operations over catalog + inventory store.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kardex_catalog::CatalogStore;
use kardex_core::{BucketId, DomainResult, LotId, TenantId, VariantId, WarehouseId};
use kardex_ledger::{AdjustmentRecord, KardexEntry};

use crate::document::StagedDocument;
use crate::processors;
use crate::processors::adjustment::{AdjustmentReceipt, AdjustmentRequest};
use crate::processors::entry::{EntryReceipt, EntryRequest};
use crate::processors::exit::{ExitReceipt, ExitRequest};
use crate::store::{InventoryStore, StockQuery, StoreError};

/// Conflict retries before a concurrent-mutation failure surfaces.
pub const DEFAULT_RETRY_BUDGET: usize = 5;

/// A current-stock row joined with its catalog labels, valorized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSummary {
    pub bucket_id: BucketId,
    pub warehouse_id: WarehouseId,
    pub warehouse_name: String,
    pub variant_id: VariantId,
    pub variant_name: String,
    pub sku: String,
    pub lot_id: Option<LotId>,
    pub lot_code: Option<String>,
    pub quantity: i64,
    pub average_unit_cost: Decimal,
    pub total_value: Decimal,
}

/// Movement processors + read queries behind one tenant-scoped facade.
///
/// Every operation stages a whole document against a snapshot and commits
/// it atomically; a `Conflict` from the store (another document touched the
/// same bucket in between) restages from a fresh snapshot, up to
/// `retry_budget` times.
pub struct LedgerEngine<C: CatalogStore, S: InventoryStore> {
    catalog: C,
    store: S,
    retry_budget: usize,
}

impl<C: CatalogStore, S: InventoryStore> LedgerEngine<C, S> {
    pub fn new(catalog: C, store: S) -> Self {
        Self {
            catalog,
            store,
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }

    pub fn with_retry_budget(mut self, retry_budget: usize) -> Self {
        self.retry_budget = retry_budget;
        self
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn run<'s, R>(
        &'s self,
        tenant_id: TenantId,
        operation: &'static str,
        stage: impl Fn(&mut StagedDocument<'s, S>) -> DomainResult<R>,
    ) -> DomainResult<R> {
        let mut attempt = 0;
        loop {
            let mut doc = StagedDocument::new(&self.store, tenant_id);
            let receipt = stage(&mut doc)?;
            match self.store.commit(doc.into_write()) {
                Ok(_) => return Ok(receipt),
                Err(StoreError::Conflict(reason)) if attempt < self.retry_budget => {
                    attempt += 1;
                    tracing::debug!(
                        tenant = %tenant_id,
                        operation,
                        attempt,
                        reason,
                        "commit conflict, restaging"
                    );
                }
                Err(err) => {
                    tracing::warn!(tenant = %tenant_id, operation, error = %err, "commit failed");
                    return Err(err.into());
                }
            }
        }
    }

    /// Record a purchase document: WAC recomputation per line, one kardex
    /// entry per bucket touched.
    pub fn record_entry(
        &self,
        tenant_id: TenantId,
        request: EntryRequest,
    ) -> DomainResult<EntryReceipt> {
        let receipt = self.run(tenant_id, "entry", |doc| {
            processors::entry::stage(&self.catalog, doc, &request)
        })?;
        tracing::info!(
            tenant = %tenant_id,
            document = %receipt.document_id,
            total = %receipt.document_total,
            lines = receipt.lines.len(),
            "entry recorded"
        );
        Ok(receipt)
    }

    /// Record a sale document: FIFO allocation per line, one kardex entry
    /// per bucket drawn, at each bucket's own average cost.
    pub fn record_exit(
        &self,
        tenant_id: TenantId,
        request: ExitRequest,
    ) -> DomainResult<ExitReceipt> {
        let receipt = self.run(tenant_id, "exit", |doc| {
            processors::exit::stage(&self.catalog, doc, &request)
        })?;
        tracing::info!(
            tenant = %tenant_id,
            document = %receipt.document_id,
            total = %receipt.document_total,
            lines = receipt.lines.len(),
            "exit recorded"
        );
        Ok(receipt)
    }

    /// Record a manual correction: audit row always, kardex entry only when
    /// the quantity actually moved.
    pub fn record_adjustment(
        &self,
        tenant_id: TenantId,
        request: AdjustmentRequest,
    ) -> DomainResult<AdjustmentReceipt> {
        let receipt = self.run(tenant_id, "adjustment", |doc| {
            processors::adjustment::stage(&self.catalog, doc, &request)
        })?;
        tracing::info!(
            tenant = %tenant_id,
            adjustment = %receipt.adjustment_id,
            before = receipt.stock_before,
            after = receipt.stock_after,
            "adjustment recorded"
        );
        Ok(receipt)
    }

    /// Kardex of a (warehouse, variant), ascending; `lot_id` narrows to a
    /// single bucket.
    pub fn ledger(
        &self,
        tenant_id: TenantId,
        variant_id: VariantId,
        warehouse_id: WarehouseId,
        lot_id: Option<LotId>,
    ) -> Vec<KardexEntry> {
        self.store.ledger(tenant_id, warehouse_id, variant_id, lot_id)
    }

    /// Tenant-wide kardex within a date window, ascending.
    pub fn ledger_between(
        &self,
        tenant_id: TenantId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<KardexEntry> {
        self.store.ledger_between(tenant_id, from, to)
    }

    /// Current stock rows (optionally filtered), joined with catalog labels
    /// and valorized.
    pub fn current_stock(
        &self,
        tenant_id: TenantId,
        query: StockQuery,
    ) -> DomainResult<Vec<StockSummary>> {
        let mut rows = Vec::new();
        for bucket in self.store.buckets(tenant_id, query) {
            let warehouse = self.catalog.warehouse(tenant_id, bucket.key.warehouse_id)?;
            let variant = self.catalog.variant(tenant_id, bucket.key.variant_id)?;
            let lot = match bucket.key.lot_id {
                Some(lot_id) => Some(self.catalog.lot(tenant_id, lot_id)?),
                None => None,
            };
            rows.push(StockSummary {
                bucket_id: bucket.id,
                warehouse_id: warehouse.id,
                warehouse_name: warehouse.name,
                variant_id: variant.id,
                variant_name: variant.name,
                sku: variant.sku,
                lot_id: bucket.key.lot_id,
                lot_code: lot.map(|l| l.code),
                quantity: bucket.quantity,
                average_unit_cost: bucket.average_unit_cost,
                total_value: bucket.valorized_worth(),
            });
        }
        Ok(rows)
    }

    /// Adjustment audit log for the tenant.
    pub fn adjustments(&self, tenant_id: TenantId) -> Vec<AdjustmentRecord> {
        self.store.adjustments(tenant_id)
    }
}
