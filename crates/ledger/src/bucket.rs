//! Stock buckets: the current-state projection of the ledger.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kardex_core::{
    BucketId, DomainError, DomainResult, LotId, TenantId, VariantId, WarehouseId, line_cost,
};

/// Logical key of a stock bucket: one warehouse, one variant, one lot or
/// none. The tenant travels alongside on the bucket itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BucketKey {
    pub warehouse_id: WarehouseId,
    pub variant_id: VariantId,
    pub lot_id: Option<LotId>,
}

impl BucketKey {
    pub fn new(warehouse_id: WarehouseId, variant_id: VariantId, lot_id: Option<LotId>) -> Self {
        Self {
            warehouse_id,
            variant_id,
            lot_id,
        }
    }
}

/// Current quantity and weighted-average unit cost for one bucket key.
///
/// Buckets are created lazily on the first entry or adjustment touching the
/// key and persist at zero quantity afterwards. `version` increases on every
/// mutation and backs the store's optimistic concurrency check; a bucket's
/// state must always equal the balance of the latest kardex entry for its
/// key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockBucket {
    pub id: BucketId,
    pub tenant_id: TenantId,
    pub key: BucketKey,
    pub quantity: i64,
    pub average_unit_cost: Decimal,
    pub version: u64,
}

impl StockBucket {
    /// A fresh, empty bucket for `key` (quantity 0, cost 0, version 0).
    pub fn open(tenant_id: TenantId, key: BucketKey) -> Self {
        Self {
            id: BucketId::new(),
            tenant_id,
            key,
            quantity: 0,
            average_unit_cost: Decimal::ZERO,
            version: 0,
        }
    }

    /// quantity × average unit cost, normalized to 2dp.
    pub fn valorized_worth(&self) -> Decimal {
        line_cost(self.quantity, self.average_unit_cost)
    }

    /// Add stock at a recomputed average cost (entries, increase
    /// adjustments keep their own cost rules; callers pass the result).
    pub fn receive(&mut self, quantity: i64, new_average_cost: Decimal) {
        self.quantity += quantity;
        self.average_unit_cost = new_average_cost;
        self.version += 1;
    }

    /// Remove stock at the unchanged average cost.
    ///
    /// Callers pre-validate availability through the FIFO allocator; the
    /// guard here is the last line of defense for the never-negative
    /// invariant.
    pub fn release(&mut self, quantity: i64) -> DomainResult<()> {
        if quantity > self.quantity {
            return Err(DomainError::invariant(format!(
                "release of {quantity} exceeds bucket quantity {}",
                self.quantity
            )));
        }
        self.quantity -= quantity;
        self.version += 1;
        Ok(())
    }

    /// Set the quantity outright (manual adjustments; cost unchanged).
    pub fn set_quantity(&mut self, quantity: i64) -> DomainResult<()> {
        if quantity < 0 {
            return Err(DomainError::invariant(
                "bucket quantity cannot go negative",
            ));
        }
        self.quantity = quantity;
        self.version += 1;
        Ok(())
    }
}
