// ── Kindred Atoms Layer ────────────────────────────────────────────────────
// Pure constants, data types, errors and seam traits. No side effects, no I/O.
// Dependency rule: atoms may only depend on std and external pure crates.
// Nothing here may import from engine/ or lib.rs.

pub mod constants;
pub mod error;
pub mod policy_types;
pub mod traits;
