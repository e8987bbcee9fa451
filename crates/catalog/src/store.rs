//! Tenant-scoped catalog storage abstraction.
//!
//! Every lookup takes an explicit `TenantId` and reports cross-tenant access
//! as `NotFound`, indistinguishable from a missing row. Lots carry no tenant
//! of their own; ownership flows through the owning variant, checked here by
//! plain ids rather than object-graph navigation.

use chrono::NaiveDate;

use kardex_core::{DomainResult, LotId, TenantId, VariantId, WarehouseId};

use crate::{Lot, ProductVariant, Warehouse};

pub trait CatalogStore: Send + Sync {
    /// Resolve a warehouse owned by `tenant_id`, or `NotFound`.
    fn warehouse(&self, tenant_id: TenantId, id: WarehouseId) -> DomainResult<Warehouse>;

    /// Resolve a variant owned by `tenant_id`, or `NotFound`.
    fn variant(&self, tenant_id: TenantId, id: VariantId) -> DomainResult<ProductVariant>;

    /// Resolve a lot whose variant is owned by `tenant_id`, or `NotFound`.
    fn lot(&self, tenant_id: TenantId, id: LotId) -> DomainResult<Lot>;

    /// Find a lot of `variant_id` by its code (codes are unique per variant).
    fn lot_by_code(
        &self,
        tenant_id: TenantId,
        variant_id: VariantId,
        code: &str,
    ) -> DomainResult<Option<Lot>>;

    /// All lots of a variant, in no particular order.
    fn lots_for_variant(&self, tenant_id: TenantId, variant_id: VariantId)
    -> DomainResult<Vec<Lot>>;

    /// Lots across the tenant expiring strictly before `date` (expiry
    /// alerting; undated lots never match).
    fn lots_expiring_before(&self, tenant_id: TenantId, date: NaiveDate) -> DomainResult<Vec<Lot>>;

    /// Register a warehouse. Fails validation on a duplicate code.
    fn insert_warehouse(&self, warehouse: Warehouse) -> DomainResult<()>;

    /// Register a variant. Fails validation on a duplicate sku.
    fn insert_variant(&self, variant: ProductVariant) -> DomainResult<()>;

    /// Register a lot under a variant the tenant owns. Fails validation on a
    /// duplicate code for that variant; `NotFound` for a foreign variant.
    fn insert_lot(&self, tenant_id: TenantId, lot: Lot) -> DomainResult<()>;

    /// Administrative edit of a lot's code/expiry.
    fn update_lot(
        &self,
        tenant_id: TenantId,
        id: LotId,
        code: String,
        expiry: Option<NaiveDate>,
    ) -> DomainResult<Lot>;
}
