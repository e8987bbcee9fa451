//! Exit (sale) processing.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kardex_catalog::CatalogStore;
use kardex_core::{
    BucketId, DocumentId, DomainError, DomainResult, LotId, UserId, VariantId, WarehouseId,
    line_cost, round_money,
};
use kardex_ledger::{BucketKey, FifoCandidate, LotSelection, StockBucket, allocate};

use crate::document::StagedDocument;
use crate::store::InventoryStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitLine {
    pub variant_id: VariantId,
    /// Pin the draw to one lot; otherwise FIFO picks.
    pub lot_id: Option<LotId>,
    pub quantity: i64,
    /// Revenue figure; never feeds the cost computation.
    pub sale_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitRequest {
    pub warehouse_id: WarehouseId,
    pub reference: String,
    pub occurred_at: DateTime<Utc>,
    pub recorded_by: Option<UserId>,
    pub lines: Vec<ExitLine>,
}

/// One FIFO draw as it landed: the bucket, the cost it was consumed at and
/// the bucket's post-draw balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawBalance {
    pub bucket_id: BucketId,
    pub lot_id: Option<LotId>,
    pub quantity: i64,
    pub unit_cost: Decimal,
    pub line_cost: Decimal,
    pub balance_quantity: i64,
    pub balance_unit_cost: Decimal,
    pub balance_total_cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitLineResult {
    pub variant_id: VariantId,
    pub quantity: i64,
    pub sale_price: Decimal,
    pub subtotal: Decimal,
    pub draws: Vec<DrawBalance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitReceipt {
    pub document_id: DocumentId,
    pub document_total: Decimal,
    pub lines: Vec<ExitLineResult>,
}

fn validate(request: &ExitRequest) -> DomainResult<()> {
    if request.lines.is_empty() {
        return Err(DomainError::validation("an exit needs at least one line"));
    }
    for (idx, line) in request.lines.iter().enumerate() {
        if line.quantity <= 0 {
            return Err(DomainError::validation(format!(
                "line {idx}: quantity must be positive"
            )));
        }
        if line.sale_price < Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "line {idx}: sale price cannot be negative"
            )));
        }
    }
    Ok(())
}

fn fifo_candidates(
    buckets: &[StockBucket],
    expiries: &HashMap<LotId, Option<NaiveDate>>,
) -> Vec<FifoCandidate> {
    buckets
        .iter()
        .map(|bucket| FifoCandidate {
            bucket_id: bucket.id,
            lot_id: bucket.key.lot_id,
            // A lot the catalog no longer knows sorts with the undated.
            expiry: bucket
                .key
                .lot_id
                .and_then(|lot| expiries.get(&lot).copied().flatten()),
            quantity: bucket.quantity,
        })
        .collect()
}

pub(crate) fn stage<C: CatalogStore, S: InventoryStore>(
    catalog: &C,
    doc: &mut StagedDocument<'_, S>,
    request: &ExitRequest,
) -> DomainResult<ExitReceipt> {
    validate(request)?;

    let tenant_id = doc.tenant_id();
    catalog.warehouse(tenant_id, request.warehouse_id)?;

    let mut document_total = Decimal::ZERO;
    let mut lines = Vec::with_capacity(request.lines.len());

    for line in &request.lines {
        let variant = catalog.variant(tenant_id, line.variant_id)?;

        let selection = match line.lot_id {
            Some(lot_id) => {
                let lot = catalog.lot(tenant_id, lot_id)?;
                if lot.variant_id != line.variant_id {
                    return Err(DomainError::validation(format!(
                        "lot '{}' does not belong to variant '{}'",
                        lot.code, variant.name
                    )));
                }
                LotSelection::Specific(lot_id)
            }
            None if variant.lot_tracked => LotSelection::LotTrackedOnly,
            None => LotSelection::Any,
        };

        let expiries: HashMap<LotId, Option<NaiveDate>> = catalog
            .lots_for_variant(tenant_id, line.variant_id)?
            .into_iter()
            .map(|lot| (lot.id, lot.expiry))
            .collect();

        // Candidates come from the staged view, so earlier lines of this
        // document have already consumed their share.
        let buckets = doc.candidate_buckets(request.warehouse_id, line.variant_id);
        let keys_by_bucket: HashMap<BucketId, BucketKey> =
            buckets.iter().map(|b| (b.id, b.key)).collect();

        let plan = allocate(&fifo_candidates(&buckets, &expiries), line.quantity, selection)?;

        let mut draws = Vec::with_capacity(plan.len());
        for draw in plan {
            let key = keys_by_bucket.get(&draw.bucket_id).copied().ok_or_else(|| {
                DomainError::invariant("allocation plan references an unknown bucket")
            })?;
            let entry = doc.draw(
                key,
                draw.quantity,
                request.occurred_at,
                &request.reference,
                request.recorded_by,
            )?;
            draws.push(DrawBalance {
                bucket_id: draw.bucket_id,
                lot_id: key.lot_id,
                quantity: draw.quantity,
                unit_cost: entry.unit_cost,
                line_cost: entry.line_cost,
                balance_quantity: entry.balance_quantity,
                balance_unit_cost: entry.balance_unit_cost,
                balance_total_cost: entry.balance_total_cost,
            });
        }

        let subtotal = line_cost(line.quantity, line.sale_price);
        document_total += subtotal;
        lines.push(ExitLineResult {
            variant_id: line.variant_id,
            quantity: line.quantity,
            sale_price: line.sale_price,
            subtotal,
            draws,
        });
    }

    Ok(ExitReceipt {
        document_id: DocumentId::new(),
        document_total: round_money(document_total),
        lines,
    })
}
