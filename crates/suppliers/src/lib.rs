//! Suppliers domain module (service providers used by the condominium).
//!
//! Deterministic domain logic only (no IO, no HTTP, no storage).

pub mod supplier;

pub use supplier::{ContactInfo, NewSupplier, Supplier, SupplierFilter, SupplierId, SupplierPatch, sort_by_name};
