//! Adjustment audit records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kardex_core::{AdjustmentId, TenantId, UserId};

use crate::bucket::BucketKey;

/// Audit row for a manual stock correction.
///
/// Always written, even when the correction is a no-op (before == after, in
/// which case no kardex entry accompanies it). Otherwise paired 1:1 with
/// exactly one adjustment kardex entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentRecord {
    pub id: AdjustmentId,
    pub tenant_id: TenantId,
    pub key: BucketKey,
    pub recorded_at: DateTime<Utc>,
    pub stock_before: i64,
    pub stock_after: i64,
    pub reason: String,
    pub recorded_by: Option<UserId>,
}

impl AdjustmentRecord {
    pub fn new(
        tenant_id: TenantId,
        key: BucketKey,
        recorded_at: DateTime<Utc>,
        stock_before: i64,
        stock_after: i64,
        reason: impl Into<String>,
        recorded_by: Option<UserId>,
    ) -> Self {
        Self {
            id: AdjustmentId::new(),
            tenant_id,
            key,
            recorded_at,
            stock_before,
            stock_after,
            reason: reason.into(),
            recorded_by,
        }
    }

    /// Signed correction applied to the bucket.
    pub fn diff(&self) -> i64 {
        self.stock_after - self.stock_before
    }
}
