//! Kardex entries: the append-only, valorized movement history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kardex_core::{DomainError, DomainResult, EntryId, TenantId, UserId, line_cost};

use crate::bucket::{BucketKey, StockBucket};

/// Movement class. A closed set, matched exhaustively everywhere.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Entry,
    Exit,
    Adjustment,
}

/// Which way the movement pushes the balance. Entries always increase,
/// exits always decrease; adjustments go either way.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementDirection {
    Increase,
    Decrease,
}

/// One immutable row of the kardex.
///
/// Every row carries the movement itself (quantity, unit cost, line cost)
/// and the post-movement running balance of its bucket, copied from the
/// bucket's post-update state so the two can never drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KardexEntry {
    pub id: EntryId,
    pub tenant_id: TenantId,
    pub key: BucketKey,
    /// Per-bucket-key sequence number, assigned by the store at commit.
    /// Total order per key is (recorded_at, sequence).
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub kind: MovementKind,
    pub direction: MovementDirection,
    pub quantity: i64,
    pub unit_cost: Decimal,
    pub line_cost: Decimal,
    pub balance_quantity: i64,
    pub balance_unit_cost: Decimal,
    pub balance_total_cost: Decimal,
    /// Free-text document reference (invoice number, reason tag, ...).
    pub reference: String,
    pub recorded_by: Option<UserId>,
}

impl KardexEntry {
    /// Record a movement against `bucket_after`, the bucket's state *after*
    /// the mutation this entry describes. Balance fields are copied from it.
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        kind: MovementKind,
        direction: MovementDirection,
        quantity: i64,
        unit_cost: Decimal,
        bucket_after: &StockBucket,
        recorded_at: DateTime<Utc>,
        reference: impl Into<String>,
        recorded_by: Option<UserId>,
    ) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::invariant(
                "kardex entries carry strictly positive quantities",
            ));
        }
        match (kind, direction) {
            (MovementKind::Entry, MovementDirection::Decrease) => {
                return Err(DomainError::invariant("entry movements must increase"));
            }
            (MovementKind::Exit, MovementDirection::Increase) => {
                return Err(DomainError::invariant("exit movements must decrease"));
            }
            _ => {}
        }

        Ok(Self {
            id: EntryId::new(),
            tenant_id: bucket_after.tenant_id,
            key: bucket_after.key,
            sequence: 0,
            recorded_at,
            kind,
            direction,
            quantity,
            unit_cost,
            line_cost: line_cost(quantity, unit_cost),
            balance_quantity: bucket_after.quantity,
            balance_unit_cost: bucket_after.average_unit_cost,
            balance_total_cost: bucket_after.valorized_worth(),
            reference: reference.into(),
            recorded_by,
        })
    }

    /// Signed effect of this entry on the running balance.
    pub fn delta(&self) -> i64 {
        match self.direction {
            MovementDirection::Increase => self.quantity,
            MovementDirection::Decrease => -self.quantity,
        }
    }

    /// True when this entry's balance follows arithmetically from the
    /// preceding balance quantity for the same bucket key (zero for the
    /// first entry of a key).
    pub fn chains_from(&self, previous_balance: i64) -> bool {
        self.balance_quantity == previous_balance + self.delta()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kardex_core::{VariantId, WarehouseId};
    use rust_decimal_macros::dec;

    fn bucket_with(quantity: i64, cost: Decimal) -> StockBucket {
        let mut b = StockBucket::open(
            TenantId::new(),
            BucketKey::new(WarehouseId::new(), VariantId::new(), None),
        );
        b.receive(quantity, cost);
        b
    }

    #[test]
    fn record_copies_balance_from_bucket() {
        let bucket = bucket_with(12, dec!(3.10));
        let entry = KardexEntry::record(
            MovementKind::Entry,
            MovementDirection::Increase,
            12,
            dec!(3.10),
            &bucket,
            Utc::now(),
            "PO-1",
            None,
        )
        .unwrap();

        assert_eq!(entry.line_cost, dec!(37.20));
        assert_eq!(entry.balance_quantity, 12);
        assert_eq!(entry.balance_unit_cost, dec!(3.10));
        assert_eq!(entry.balance_total_cost, dec!(37.20));
        assert!(entry.chains_from(0));
    }

    #[test]
    fn direction_must_match_kind() {
        let bucket = bucket_with(5, dec!(1.00));
        let err = KardexEntry::record(
            MovementKind::Exit,
            MovementDirection::Increase,
            5,
            dec!(1.00),
            &bucket,
            Utc::now(),
            "",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn delta_is_signed_by_direction() {
        let bucket = bucket_with(5, dec!(1.00));
        let exit = KardexEntry::record(
            MovementKind::Exit,
            MovementDirection::Decrease,
            2,
            dec!(1.00),
            &bucket,
            Utc::now(),
            "",
            None,
        )
        .unwrap();
        assert_eq!(exit.delta(), -2);
        assert!(exit.chains_from(7));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let bucket = bucket_with(1, dec!(1.00));
        assert!(
            KardexEntry::record(
                MovementKind::Adjustment,
                MovementDirection::Increase,
                0,
                dec!(1.00),
                &bucket,
                Utc::now(),
                "",
                None,
            )
            .is_err()
        );
    }
}
