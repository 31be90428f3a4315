//! Crop code resolver.
//!
//! Maps the integer crop codes written by the upstream classifier to
//! human-readable labels. Resolution is total: null codes and codes
//! outside the table both resolve to deterministic fallback labels.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label for a missing crop code and for gap-filled timeline positions.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Coarse economic grouping of a crop label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropCategory {
    Grain,
    Cash,
    Other,
}

/// One row of the crop table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub code: i64,
    pub label: String,
    #[serde(default = "default_category")]
    pub category: CropCategory,
}

fn default_category() -> CropCategory {
    CropCategory::Other
}

/// Immutable code to label table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CatalogEntry>", into = "Vec<CatalogEntry>")]
pub struct CropCatalog {
    entries: BTreeMap<i64, CatalogEntry>,
}

impl CropCatalog {
    /// Build a catalog, rejecting duplicate codes and the reserved
    /// [`UNKNOWN_LABEL`].
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, ConfigError> {
        let mut map = BTreeMap::new();
        for entry in entries {
            let code = entry.code;
            if entry.label.trim() == UNKNOWN_LABEL {
                return Err(ConfigError::ReservedCropLabel {
                    code,
                    label: entry.label,
                });
            }
            if map.insert(code, entry).is_some() {
                return Err(ConfigError::DuplicateCropCode { code });
            }
        }
        Ok(CropCatalog { entries: map })
    }

    /// The default ten-class parcel classification table.
    pub fn builtin() -> Self {
        use CropCategory::*;
        let rows = [
            (1, "Bare land", Other),
            (2, "Cotton", Cash),
            (3, "Wheat", Grain),
            (4, "Corn", Grain),
            (5, "Tomato", Cash),
            (6, "Sugar beet", Cash),
            (7, "Seed melon", Cash),
            (8, "Pepper", Cash),
            (9, "Seed gourd", Cash),
            (10, "Other cropland", Other),
        ];
        let entries = rows
            .into_iter()
            .map(|(code, label, category)| {
                (
                    code,
                    CatalogEntry {
                        code,
                        label: label.to_string(),
                        category,
                    },
                )
            })
            .collect();
        CropCatalog { entries }
    }

    /// Resolve a raw code to its display label.
    pub fn resolve(&self, code: Option<i64>) -> String {
        match code {
            None => UNKNOWN_LABEL.to_string(),
            Some(code) => match self.entries.get(&code) {
                Some(entry) => entry.label.clone(),
                None => format!("Unknown code ({})", code),
            },
        }
    }

    pub fn is_mapped(&self, code: i64) -> bool {
        self.entries.contains_key(&code)
    }

    /// Category of a resolved label. Labels not in the table are `Other`.
    pub fn category(&self, label: &str) -> CropCategory {
        self.entries
            .values()
            .find(|entry| entry.label == label)
            .map(|entry| entry.category)
            .unwrap_or(CropCategory::Other)
    }

    /// All entries, sorted by code.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CropCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TryFrom<Vec<CatalogEntry>> for CropCatalog {
    type Error = ConfigError;

    fn try_from(entries: Vec<CatalogEntry>) -> Result<Self, Self::Error> {
        CropCatalog::new(entries)
    }
}

impl From<CropCatalog> for Vec<CatalogEntry> {
    fn from(catalog: CropCatalog) -> Self {
        catalog.entries.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_codes() {
        let catalog = CropCatalog::builtin();
        assert_eq!(catalog.resolve(Some(2)), "Cotton");
        assert_eq!(catalog.resolve(Some(4)), "Corn");
        assert_eq!(catalog.resolve(Some(10)), "Other cropland");
    }

    #[test]
    fn test_resolve_fallbacks() {
        let catalog = CropCatalog::builtin();
        assert_eq!(catalog.resolve(None), UNKNOWN_LABEL);
        assert_eq!(catalog.resolve(Some(0)), "Unknown code (0)");
        assert_eq!(catalog.resolve(Some(-7)), "Unknown code (-7)");
        assert_eq!(catalog.resolve(Some(42)), catalog.resolve(Some(42)));
    }

    #[test]
    fn test_category_lookup() {
        let catalog = CropCatalog::builtin();
        assert_eq!(catalog.category("Wheat"), CropCategory::Grain);
        assert_eq!(catalog.category("Pepper"), CropCategory::Cash);
        assert_eq!(catalog.category("Bare land"), CropCategory::Other);
        assert_eq!(catalog.category(UNKNOWN_LABEL), CropCategory::Other);
        assert_eq!(catalog.category("Unknown code (99)"), CropCategory::Other);
    }

    #[test]
    fn test_entries_sorted_by_code() {
        let catalog = CropCatalog::builtin();
        let codes: Vec<i64> = catalog.entries().map(|e| e.code).collect();
        assert_eq!(codes, (1..=10).collect::<Vec<_>>());
        assert!(catalog.is_mapped(9));
        assert!(!catalog.is_mapped(11));
    }

    #[test]
    fn test_duplicate_codes_rejected() {
        let entry = CatalogEntry {
            code: 1,
            label: "Rice".to_string(),
            category: CropCategory::Grain,
        };
        let err = CropCatalog::new(vec![entry.clone(), entry]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateCropCode { code: 1 }));
    }

    #[test]
    fn test_unknown_label_rejected() {
        let entries = vec![
            CatalogEntry {
                code: 1,
                label: "Rice".to_string(),
                category: CropCategory::Grain,
            },
            CatalogEntry {
                code: 2,
                label: UNKNOWN_LABEL.to_string(),
                category: CropCategory::Other,
            },
        ];
        let err = CropCatalog::new(entries).unwrap_err();
        assert!(matches!(err, ConfigError::ReservedCropLabel { code: 2, .. }));

        let parsed: Result<CropCatalog, _> =
            serde_json::from_value(serde_json::json!([{"code": 3, "label": "Unknown "}]));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_catalog_serde_as_entry_list() {
        let catalog: CropCatalog = serde_json::from_value(serde_json::json!([
            {"code": 7, "label": "Rice", "category": "grain"},
            {"code": 8, "label": "Fallow"}
        ]))
        .unwrap();
        assert_eq!(catalog.resolve(Some(7)), "Rice");
        assert_eq!(catalog.category("Fallow"), CropCategory::Other);

        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 2);
        assert_eq!(json[0]["category"], "grain");
    }
}
