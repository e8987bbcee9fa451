//! Entry (purchase) processing.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kardex_catalog::{CatalogStore, Lot};
use kardex_core::{
    BucketId, DocumentId, DomainError, DomainResult, LotId, TenantId, UserId, VariantId,
    WarehouseId, round_money,
};
use kardex_ledger::BucketKey;

use crate::document::StagedDocument;
use crate::store::InventoryStore;

/// How an entry line names its lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum LotSpec {
    /// No lot: stock lands in the variant's lot-less bucket.
    None,
    /// An existing lot of the line's variant.
    Existing { lot_id: LotId },
    /// Create a lot on the fly (receiving a fresh batch).
    New {
        code: String,
        expiry: Option<NaiveDate>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryLine {
    pub variant_id: VariantId,
    pub lot: LotSpec,
    pub quantity: i64,
    pub unit_cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRequest {
    pub warehouse_id: WarehouseId,
    /// Free-text document reference (supplier invoice, PO number, ...).
    pub reference: String,
    pub occurred_at: DateTime<Utc>,
    pub recorded_by: Option<UserId>,
    pub lines: Vec<EntryLine>,
}

/// Post-movement bucket state for one receipt line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBalance {
    pub variant_id: VariantId,
    pub lot_id: Option<LotId>,
    pub bucket_id: BucketId,
    pub quantity: i64,
    pub line_cost: Decimal,
    pub balance_quantity: i64,
    pub balance_unit_cost: Decimal,
    pub balance_total_cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryReceipt {
    pub document_id: DocumentId,
    pub document_total: Decimal,
    pub lines: Vec<LineBalance>,
}

fn validate(request: &EntryRequest) -> DomainResult<()> {
    if request.lines.is_empty() {
        return Err(DomainError::validation("an entry needs at least one line"));
    }
    for (idx, line) in request.lines.iter().enumerate() {
        if line.quantity <= 0 {
            return Err(DomainError::validation(format!(
                "line {idx}: quantity must be positive"
            )));
        }
        if line.unit_cost <= Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "line {idx}: unit cost must be positive"
            )));
        }
        if let LotSpec::New { code, .. } = &line.lot {
            if code.trim().is_empty() {
                return Err(DomainError::validation(format!(
                    "line {idx}: new lot code cannot be empty"
                )));
            }
        }
    }
    Ok(())
}

/// Resolve the lot an entry line targets, creating it when asked to.
///
/// A lot created here lands in the catalog before the inventory commit; a
/// retried document finds it again by code instead of minting a duplicate.
fn resolve_lot<C: CatalogStore>(
    catalog: &C,
    tenant_id: TenantId,
    line: &EntryLine,
    lot_tracked: bool,
    variant_label: &str,
) -> DomainResult<Option<LotId>> {
    let resolved = match &line.lot {
        LotSpec::None => None,
        LotSpec::Existing { lot_id } => {
            let lot = catalog.lot(tenant_id, *lot_id)?;
            if lot.variant_id != line.variant_id {
                return Err(DomainError::validation(format!(
                    "lot '{}' does not belong to variant '{variant_label}'",
                    lot.code
                )));
            }
            Some(lot.id)
        }
        LotSpec::New { code, expiry } => {
            if lot_tracked && expiry.is_none() {
                return Err(DomainError::validation(format!(
                    "variant '{variant_label}' requires an expiry date for new lots"
                )));
            }
            match catalog.lot_by_code(tenant_id, line.variant_id, code)? {
                Some(existing) => Some(existing.id),
                None => {
                    let lot = Lot::new(line.variant_id, code.clone(), *expiry)?;
                    let id = lot.id;
                    catalog.insert_lot(tenant_id, lot)?;
                    Some(id)
                }
            }
        }
    };

    if lot_tracked && resolved.is_none() {
        return Err(DomainError::validation(format!(
            "variant '{variant_label}' requires a lot"
        )));
    }
    Ok(resolved)
}

pub(crate) fn stage<C: CatalogStore, S: InventoryStore>(
    catalog: &C,
    doc: &mut StagedDocument<'_, S>,
    request: &EntryRequest,
) -> DomainResult<EntryReceipt> {
    validate(request)?;

    let tenant_id = doc.tenant_id();
    catalog.warehouse(tenant_id, request.warehouse_id)?;

    let mut document_total = Decimal::ZERO;
    let mut lines = Vec::with_capacity(request.lines.len());

    for line in &request.lines {
        let variant = catalog.variant(tenant_id, line.variant_id)?;
        let lot_id = resolve_lot(catalog, tenant_id, line, variant.lot_tracked, &variant.name)?;

        let key = BucketKey::new(request.warehouse_id, line.variant_id, lot_id);
        let entry = doc.receive(
            key,
            line.quantity,
            line.unit_cost,
            request.occurred_at,
            &request.reference,
            request.recorded_by,
        )?;

        let bucket_id = doc
            .staged_bucket(&key)
            .map(|b| b.id)
            .ok_or_else(|| DomainError::invariant("bucket staged by receive is missing"))?;

        document_total += entry.line_cost;
        lines.push(LineBalance {
            variant_id: line.variant_id,
            lot_id,
            bucket_id,
            quantity: line.quantity,
            line_cost: entry.line_cost,
            balance_quantity: entry.balance_quantity,
            balance_unit_cost: entry.balance_unit_cost,
            balance_total_cost: entry.balance_total_cost,
        });
    }

    Ok(EntryReceipt {
        document_id: DocumentId::new(),
        document_total: round_money(document_total),
        lines,
    })
}
