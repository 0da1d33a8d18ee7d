//! The closed set of functional modules and an exhaustive map keyed by them.

use std::collections::BTreeMap;

use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A functional area gated independently by permission level.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Water,
    Tasks,
    Documents,
    Equipment,
    Structural,
    Suppliers,
    AdminPanel,
}

impl Module {
    pub const COUNT: usize = 7;

    pub const ALL: [Module; Module::COUNT] = [
        Module::Water,
        Module::Tasks,
        Module::Documents,
        Module::Equipment,
        Module::Structural,
        Module::Suppliers,
        Module::AdminPanel,
    ];

    /// Storage/wire key (e.g. `"admin_panel"`).
    pub const fn key(self) -> &'static str {
        match self {
            Module::Water => "water",
            Module::Tasks => "tasks",
            Module::Documents => "documents",
            Module::Equipment => "equipment",
            Module::Structural => "structural",
            Module::Suppliers => "suppliers",
            Module::AdminPanel => "admin_panel",
        }
    }

    /// Modules whose records carry an owner (assignee / reporter).
    ///
    /// A READ_WRITE holder may only update records they own in these modules.
    pub const fn is_owner_scoped(self) -> bool {
        matches!(self, Module::Tasks | Module::Structural)
    }

    const fn index(self) -> usize {
        match self {
            Module::Water => 0,
            Module::Tasks => 1,
            Module::Documents => 2,
            Module::Equipment => 3,
            Module::Structural => 4,
            Module::Suppliers => 5,
            Module::AdminPanel => 6,
        }
    }
}

impl core::fmt::Display for Module {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Module {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Module::ALL
            .into_iter()
            .find(|m| m.key() == s)
            .ok_or_else(|| format!("unknown module '{s}'"))
    }
}

/// Fixed-size map from [`Module`] to a value.
///
/// Absent entries are distinct from present ones so callers can apply their own
/// fail-closed default. Serializes as a JSON object keyed by module key;
/// unknown keys are rejected on deserialization.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ModuleMap<T: Copy> {
    slots: [Option<T>; Module::COUNT],
}

impl<T: Copy> ModuleMap<T> {
    pub fn new() -> Self {
        Self {
            slots: [None; Module::COUNT],
        }
    }

    /// A map with every module set to `value`.
    pub fn filled(value: T) -> Self {
        Self {
            slots: [Some(value); Module::COUNT],
        }
    }

    pub fn get(&self, module: Module) -> Option<T> {
        self.slots[module.index()]
    }

    pub fn set(&mut self, module: Module, value: T) {
        self.slots[module.index()] = Some(value);
    }

    pub fn remove(&mut self, module: Module) -> Option<T> {
        self.slots[module.index()].take()
    }

    pub fn contains(&self, module: Module) -> bool {
        self.get(module).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Present entries in [`Module::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Module, T)> + '_ {
        Module::ALL
            .into_iter()
            .filter_map(|m| self.get(m).map(|v| (m, v)))
    }
}

impl<T: Copy> Default for ModuleMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> FromIterator<(Module, T)> for ModuleMap<T> {
    fn from_iter<I: IntoIterator<Item = (Module, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (m, v) in iter {
            map.set(m, v);
        }
        map
    }
}

impl<T: Copy + core::fmt::Debug> core::fmt::Debug for ModuleMap<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<T: Copy + Serialize> Serialize for ModuleMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de, T: Copy + Deserialize<'de>> Deserialize<'de> for ModuleMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<Module, T>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_from_str() {
        for m in Module::ALL {
            assert_eq!(m.key().parse::<Module>().unwrap(), m);
        }
        assert!("parking".parse::<Module>().is_err());
    }

    #[test]
    fn only_tasks_and_structural_are_owner_scoped() {
        let scoped: Vec<_> = Module::ALL.into_iter().filter(|m| m.is_owner_scoped()).collect();
        assert_eq!(scoped, vec![Module::Tasks, Module::Structural]);
    }

    #[test]
    fn map_serializes_present_entries_only() {
        let mut map = ModuleMap::new();
        map.set(Module::AdminPanel, true);
        map.set(Module::Water, false);

        let json = serde_json::to_value(map).unwrap();
        assert_eq!(json, serde_json::json!({ "water": false, "admin_panel": true }));
    }

    #[test]
    fn map_rejects_unknown_module_keys() {
        let res: Result<ModuleMap<bool>, _> =
            serde_json::from_value(serde_json::json!({ "parking": true }));
        assert!(res.is_err());
    }

    #[test]
    fn remove_makes_entry_absent() {
        let mut map = ModuleMap::filled(1u8);
        assert_eq!(map.remove(Module::Suppliers), Some(1));
        assert!(!map.contains(Module::Suppliers));
        assert_eq!(map.iter().count(), Module::COUNT - 1);
    }
}
