//! `kardex-catalog` — the catalog surface the ledger engine resolves against.
//!
//! Warehouses, product variants and lots, with tenant-scoped lookups and the
//! ownership checks every movement runs before touching stock. Catalog CRUD
//! has no invariants beyond uniqueness and tenant scoping; the interesting
//! rules (lot mandates, expiry ordering) are enforced by the engine.

pub mod in_memory;
pub mod lot;
pub mod store;
pub mod variant;
pub mod warehouse;

pub use in_memory::InMemoryCatalog;
pub use lot::Lot;
pub use store::CatalogStore;
pub use variant::ProductVariant;
pub use warehouse::Warehouse;
