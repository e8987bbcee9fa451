//! Product variant entity.

use serde::{Deserialize, Serialize};

use kardex_core::{DomainError, DomainResult, Entity, TenantId, VariantId};

/// The stockable unit: a concrete variant of a product (size, color, grade).
///
/// `lot_tracked` is the lot mandate: when set, every entry must resolve a
/// lot and exits only ever draw from lot-assigned buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: VariantId,
    pub tenant_id: TenantId,
    /// Display name of the parent product (catalog CRUD is external; the
    /// engine only needs it for messages and listings).
    pub product_name: String,
    pub name: String,
    /// Stock-keeping unit, unique per tenant.
    pub sku: String,
    pub lot_tracked: bool,
}

impl ProductVariant {
    pub fn new(
        tenant_id: TenantId,
        product_name: impl Into<String>,
        name: impl Into<String>,
        sku: impl Into<String>,
        lot_tracked: bool,
    ) -> DomainResult<Self> {
        let product_name = product_name.into();
        let name = name.into();
        let sku = sku.into();
        if product_name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if name.trim().is_empty() {
            return Err(DomainError::validation("variant name cannot be empty"));
        }
        if sku.trim().is_empty() {
            return Err(DomainError::validation("sku cannot be empty"));
        }
        Ok(Self {
            id: VariantId::new(),
            tenant_id,
            product_name,
            name,
            sku,
            lot_tracked,
        })
    }
}

impl Entity for ProductVariant {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_sku() {
        let tenant = TenantId::new();
        assert!(ProductVariant::new(tenant, "Tee", "Tee M", " ", false).is_err());
        assert!(ProductVariant::new(tenant, "Tee", "Tee M", "TEE-M", true).is_ok());
    }
}
