//! Movement processors: one use-case-specific staging routine per document
//! kind. Each validates its request, resolves catalog entities, stages the
//! whole document and hands back a receipt; the engine owns the commit and
//! the conflict retry around it.

pub mod adjustment;
pub mod entry;
pub mod exit;
