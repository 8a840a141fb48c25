//! Manufacturer → model catalog used by the form/CLI layer.
//!
//! The renderer itself is catalog-agnostic and accepts arbitrary strings;
//! this table exists so a caller can offer sensible choices and warn on
//! unknown entries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Ordered map of manufacturer name to an ordered list of model names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleCatalog(BTreeMap<String, Vec<String>>);

impl VehicleCatalog {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn makes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn models(&self, make: &str) -> Option<&[String]> {
        self.0.get(make).map(Vec::as_slice)
    }

    /// True when both make and model appear in the table.
    pub fn contains(&self, make: &str, model: &str) -> bool {
        self.models(make)
            .is_some_and(|models| models.iter().any(|m| m == model))
    }
}

impl Default for VehicleCatalog {
    fn default() -> Self {
        let entries: [(&str, &[&str]); 10] = [
            ("BYD", &["Sealion 7"]),
            ("Hyundai", &["Ioniq", "Tucson"]),
            ("Kia", &["EV6", "Niro EV", "Sportage", "Xeed"]),
            ("MG", &["MG-5", "MG-ZS"]),
            ("Nissan", &["Ariya", "Leaf"]),
            ("Polestar", &["Polestar 2"]),
            ("Skoda", &["Enyaq", "Octavia"]),
            ("Tesla", &["Model 3", "Model Y"]),
            ("Toyota", &["BZ4X", "Corolla", "Prius"]),
            ("Volkswagen", &["ID3", "ID4", "ID7", "ID-Buzz"]),
        ];
        let map = entries
            .into_iter()
            .map(|(make, models)| {
                (
                    make.to_string(),
                    models.iter().map(|m| m.to_string()).collect(),
                )
            })
            .collect();
        VehicleCatalog(map)
    }
}
