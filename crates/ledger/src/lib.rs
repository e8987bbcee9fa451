//! `kardex-ledger` — pure domain of the inventory ledger engine.
//!
//! Stock buckets, valorized kardex entries, adjustment audit records, the
//! weighted-average cost function and the FIFO allocator. Everything in this
//! crate is deterministic and free of I/O; orchestration and storage live in
//! `kardex-engine`.

pub mod adjustment;
pub mod bucket;
pub mod cost;
pub mod entry;
pub mod fifo;

pub use adjustment::AdjustmentRecord;
pub use bucket::{BucketKey, StockBucket};
pub use cost::weighted_average;
pub use entry::{KardexEntry, MovementDirection, MovementKind};
pub use fifo::{Draw, FifoCandidate, LotSelection, allocate};
