//! Warehouse entity.

use serde::{Deserialize, Serialize};

use kardex_core::{DomainError, DomainResult, Entity, TenantId, WarehouseId};

/// A physical or logical storage location; every stock bucket belongs to
/// exactly one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub tenant_id: TenantId,
    pub name: String,
    /// Short code, unique per tenant.
    pub code: String,
}

impl Warehouse {
    pub fn new(
        tenant_id: TenantId,
        name: impl Into<String>,
        code: impl Into<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        let code = code.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("warehouse name cannot be empty"));
        }
        if code.trim().is_empty() {
            return Err(DomainError::validation("warehouse code cannot be empty"));
        }
        Ok(Self {
            id: WarehouseId::new(),
            tenant_id,
            name,
            code,
        })
    }
}

impl Entity for Warehouse {
    type Id = WarehouseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
