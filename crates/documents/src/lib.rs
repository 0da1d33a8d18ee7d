//! Document references (contracts, certificates, minutes) with optional expiry.

pub mod document;

pub use document::{
    Document, DocumentFilter, DocumentId, DocumentPatch, NewDocument, expiring_within, sort_newest_first,
};
