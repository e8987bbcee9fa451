//! In-memory catalog.
//!
//! Intended for tests/dev and as the reference behavior a persistence
//! adapter must reproduce. Not optimized for performance.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::NaiveDate;

use kardex_core::{DomainError, DomainResult, LotId, TenantId, VariantId, WarehouseId};

use crate::store::CatalogStore;
use crate::{Lot, ProductVariant, Warehouse};

#[derive(Debug, Default)]
struct State {
    warehouses: HashMap<(TenantId, WarehouseId), Warehouse>,
    variants: HashMap<(TenantId, VariantId), ProductVariant>,
    // Lots are owned through their variant; the tenant is denormalized into
    // the key's companion value for O(1) ownership checks.
    lots: HashMap<LotId, (TenantId, Lot)>,
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    inner: RwLock<State>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> DomainError {
    DomainError::invariant("catalog lock poisoned")
}

impl CatalogStore for InMemoryCatalog {
    fn warehouse(&self, tenant_id: TenantId, id: WarehouseId) -> DomainResult<Warehouse> {
        let state = self.inner.read().map_err(|_| poisoned())?;
        state
            .warehouses
            .get(&(tenant_id, id))
            .cloned()
            .ok_or(DomainError::NotFound)
    }

    fn variant(&self, tenant_id: TenantId, id: VariantId) -> DomainResult<ProductVariant> {
        let state = self.inner.read().map_err(|_| poisoned())?;
        state
            .variants
            .get(&(tenant_id, id))
            .cloned()
            .ok_or(DomainError::NotFound)
    }

    fn lot(&self, tenant_id: TenantId, id: LotId) -> DomainResult<Lot> {
        let state = self.inner.read().map_err(|_| poisoned())?;
        match state.lots.get(&id) {
            Some((owner, lot)) if *owner == tenant_id => Ok(lot.clone()),
            _ => Err(DomainError::NotFound),
        }
    }

    fn lot_by_code(
        &self,
        tenant_id: TenantId,
        variant_id: VariantId,
        code: &str,
    ) -> DomainResult<Option<Lot>> {
        let state = self.inner.read().map_err(|_| poisoned())?;
        Ok(state
            .lots
            .values()
            .find(|(owner, lot)| {
                *owner == tenant_id && lot.variant_id == variant_id && lot.code == code
            })
            .map(|(_, lot)| lot.clone()))
    }

    fn lots_for_variant(
        &self,
        tenant_id: TenantId,
        variant_id: VariantId,
    ) -> DomainResult<Vec<Lot>> {
        let state = self.inner.read().map_err(|_| poisoned())?;
        Ok(state
            .lots
            .values()
            .filter(|(owner, lot)| *owner == tenant_id && lot.variant_id == variant_id)
            .map(|(_, lot)| lot.clone())
            .collect())
    }

    fn lots_expiring_before(&self, tenant_id: TenantId, date: NaiveDate) -> DomainResult<Vec<Lot>> {
        let state = self.inner.read().map_err(|_| poisoned())?;
        let mut lots: Vec<Lot> = state
            .lots
            .values()
            .filter(|(owner, lot)| *owner == tenant_id && lot.expires_before(date))
            .map(|(_, lot)| lot.clone())
            .collect();
        lots.sort_by_key(|l| l.expiry);
        Ok(lots)
    }

    fn insert_warehouse(&self, warehouse: Warehouse) -> DomainResult<()> {
        let mut state = self.inner.write().map_err(|_| poisoned())?;
        let duplicate = state
            .warehouses
            .values()
            .any(|w| w.tenant_id == warehouse.tenant_id && w.code == warehouse.code);
        if duplicate {
            return Err(DomainError::validation(format!(
                "warehouse code '{}' already exists",
                warehouse.code
            )));
        }
        state
            .warehouses
            .insert((warehouse.tenant_id, warehouse.id), warehouse);
        Ok(())
    }

    fn insert_variant(&self, variant: ProductVariant) -> DomainResult<()> {
        let mut state = self.inner.write().map_err(|_| poisoned())?;
        let duplicate = state
            .variants
            .values()
            .any(|v| v.tenant_id == variant.tenant_id && v.sku == variant.sku);
        if duplicate {
            return Err(DomainError::validation(format!(
                "sku '{}' already exists",
                variant.sku
            )));
        }
        state.variants.insert((variant.tenant_id, variant.id), variant);
        Ok(())
    }

    fn insert_lot(&self, tenant_id: TenantId, lot: Lot) -> DomainResult<()> {
        let mut state = self.inner.write().map_err(|_| poisoned())?;
        if !state.variants.contains_key(&(tenant_id, lot.variant_id)) {
            return Err(DomainError::NotFound);
        }
        let duplicate = state.lots.values().any(|(owner, existing)| {
            *owner == tenant_id && existing.variant_id == lot.variant_id && existing.code == lot.code
        });
        if duplicate {
            return Err(DomainError::validation(format!(
                "lot code '{}' already exists for variant",
                lot.code
            )));
        }
        state.lots.insert(lot.id, (tenant_id, lot));
        Ok(())
    }

    fn update_lot(
        &self,
        tenant_id: TenantId,
        id: LotId,
        code: String,
        expiry: Option<NaiveDate>,
    ) -> DomainResult<Lot> {
        if code.trim().is_empty() {
            return Err(DomainError::validation("lot code cannot be empty"));
        }
        let mut state = self.inner.write().map_err(|_| poisoned())?;
        let owner_variant = match state.lots.get(&id) {
            Some((owner, lot)) if *owner == tenant_id => lot.variant_id,
            _ => return Err(DomainError::NotFound),
        };
        let collision = state.lots.values().any(|(owner, other)| {
            *owner == tenant_id
                && other.variant_id == owner_variant
                && other.id != id
                && other.code == code
        });
        if collision {
            return Err(DomainError::validation(format!(
                "lot code '{code}' already exists for variant"
            )));
        }
        let (_, lot) = state.lots.get_mut(&id).ok_or(DomainError::NotFound)?;
        lot.code = code;
        lot.expiry = expiry;
        Ok(lot.clone())
    }
}
