//! Serde helper for patch fields where `null` means "clear".
//!
//! ```ignore
//! #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
//! pub due_date: Option<Option<NaiveDate>>,
//! ```
//!
//! Absent field: `None` (keep). `null`: `Some(None)` (clear). Value: `Some(Some(v))`.

use serde::{Deserialize, Deserializer};

pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
