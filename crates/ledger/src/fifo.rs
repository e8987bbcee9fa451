//! FIFO exit allocation.
//!
//! Given the candidate buckets of a (warehouse, variant) pair, decide which
//! buckets satisfy an exit and in which order: oldest-expiring lots first,
//! expiry-less lots and lot-less buckets after every dated lot, ties broken
//! by bucket id so the plan is reproducible. Pure; callers resolve buckets
//! and expiry dates, and apply the returned plan.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use kardex_core::{BucketId, DomainError, DomainResult, LotId};

/// Which buckets are eligible for an exit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LotSelection {
    /// The caller named a lot: only that lot's bucket may be drawn.
    Specific(LotId),
    /// The variant mandates lot tracking: only lot-assigned buckets.
    LotTrackedOnly,
    /// No mandate: every bucket, lot-less included.
    Any,
}

/// A candidate bucket as seen by the allocator: identity, lot assignment,
/// the lot's expiry (resolved by the caller), and the available quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FifoCandidate {
    pub bucket_id: BucketId,
    pub lot_id: Option<LotId>,
    pub expiry: Option<NaiveDate>,
    pub quantity: i64,
}

/// One step of an allocation plan: draw `quantity` from `bucket_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    pub bucket_id: BucketId,
    pub quantity: i64,
}

/// Rank used for ordering: dated lots first (by expiry), then everything
/// without a date, tie-broken by bucket id for determinism.
fn fifo_rank(candidate: &FifoCandidate) -> (u8, Option<NaiveDate>, BucketId) {
    match candidate.expiry {
        Some(date) => (0, Some(date), candidate.bucket_id),
        None => (1, None, candidate.bucket_id),
    }
}

/// Produce the ordered draw plan satisfying `requested`, or fail with
/// `InsufficientStock { available, requested }` before anything is mutated.
///
/// Zero- and negative-quantity candidates are never drawn from; candidates
/// outside `selection` do not count toward availability.
pub fn allocate(
    candidates: &[FifoCandidate],
    requested: i64,
    selection: LotSelection,
) -> DomainResult<Vec<Draw>> {
    if requested <= 0 {
        return Err(DomainError::validation(
            "requested exit quantity must be positive",
        ));
    }

    let mut eligible: Vec<&FifoCandidate> = candidates
        .iter()
        .filter(|c| c.quantity > 0)
        .filter(|c| match selection {
            LotSelection::Specific(lot_id) => c.lot_id == Some(lot_id),
            LotSelection::LotTrackedOnly => c.lot_id.is_some(),
            LotSelection::Any => true,
        })
        .collect();

    let available: i64 = eligible.iter().map(|c| c.quantity).sum();
    if available < requested {
        return Err(DomainError::insufficient_stock(available, requested));
    }

    eligible.sort_by_key(|c| fifo_rank(c));

    let mut remaining = requested;
    let mut plan = Vec::new();
    for candidate in eligible {
        if remaining == 0 {
            break;
        }
        let draw = candidate.quantity.min(remaining);
        plan.push(Draw {
            bucket_id: candidate.bucket_id,
            quantity: draw,
        });
        remaining -= draw;
    }

    Ok(plan)
}
