//! Manual stock adjustment processing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kardex_catalog::CatalogStore;
use kardex_core::{
    AdjustmentId, DomainError, DomainResult, LotId, UserId, VariantId, WarehouseId,
};
use kardex_ledger::BucketKey;

use crate::document::StagedDocument;
use crate::store::InventoryStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentRequest {
    pub warehouse_id: WarehouseId,
    pub variant_id: VariantId,
    pub lot_id: Option<LotId>,
    /// Absolute target quantity for the bucket.
    pub new_quantity: i64,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
    pub recorded_by: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentReceipt {
    pub adjustment_id: AdjustmentId,
    pub stock_before: i64,
    pub stock_after: i64,
}

fn validate(request: &AdjustmentRequest) -> DomainResult<()> {
    if request.new_quantity < 0 {
        return Err(DomainError::validation(
            "adjusted quantity cannot be negative",
        ));
    }
    if request.reason.trim().is_empty() {
        return Err(DomainError::validation("an adjustment needs a reason"));
    }
    Ok(())
}

pub(crate) fn stage<C: CatalogStore, S: InventoryStore>(
    catalog: &C,
    doc: &mut StagedDocument<'_, S>,
    request: &AdjustmentRequest,
) -> DomainResult<AdjustmentReceipt> {
    validate(request)?;

    let tenant_id = doc.tenant_id();
    catalog.warehouse(tenant_id, request.warehouse_id)?;
    let variant = catalog.variant(tenant_id, request.variant_id)?;

    // Corrections may target any bucket, lot mandate or not; they fix what
    // is physically on the shelf and never consult FIFO order.
    if let Some(lot_id) = request.lot_id {
        let lot = catalog.lot(tenant_id, lot_id)?;
        if lot.variant_id != request.variant_id {
            return Err(DomainError::validation(format!(
                "lot '{}' does not belong to variant '{}'",
                lot.code, variant.name
            )));
        }
    }

    let key = BucketKey::new(request.warehouse_id, request.variant_id, request.lot_id);
    let record = doc.correct(
        key,
        request.new_quantity,
        request.occurred_at,
        &request.reason,
        request.recorded_by,
    )?;

    Ok(AdjustmentReceipt {
        adjustment_id: record.id,
        stock_before: record.stock_before,
        stock_after: record.stock_after,
    })
}
