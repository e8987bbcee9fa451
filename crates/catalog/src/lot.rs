//! Lot entity: a traceable batch of a variant.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use kardex_core::{DomainError, DomainResult, Entity, LotId, VariantId};

/// A batch of a single variant, optionally carrying an expiry date.
///
/// Lots referenced by ledger entries are never deleted; code and expiry may
/// still be edited administratively (history stores the lot id, not a copy).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    pub id: LotId,
    pub variant_id: VariantId,
    /// Lot code, unique per variant.
    pub code: String,
    pub expiry: Option<NaiveDate>,
}

impl Lot {
    pub fn new(
        variant_id: VariantId,
        code: impl Into<String>,
        expiry: Option<NaiveDate>,
    ) -> DomainResult<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(DomainError::validation("lot code cannot be empty"));
        }
        Ok(Self {
            id: LotId::new(),
            variant_id,
            code,
            expiry,
        })
    }

    /// True when the lot carries an expiry date strictly before `date`.
    pub fn expires_before(&self, date: NaiveDate) -> bool {
        self.expiry.is_some_and(|e| e < date)
    }
}

impl Entity for Lot {
    type Id = LotId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
