//! Product categories.
//!
//! The category list is enforced here and only here; both the catalog
//! validation and the category-filter endpoint parse into this enum, so the
//! server is the single canonical source of the list.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error parsing a [`Category`] from its display form.
#[derive(thiserror::Error, Debug, Clone)]
#[error("unknown category: {0}")]
pub struct CategoryError(pub String);

/// Fixed set of catalog categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Eco Bags")]
    EcoBags,
    #[serde(rename = "Water Bottles")]
    WaterBottles,
    #[serde(rename = "Reusable Items")]
    ReusableItems,
    #[serde(rename = "Solar Products")]
    SolarProducts,
    #[serde(rename = "Organic")]
    Organic,
    #[serde(rename = "Bamboo Products")]
    BambooProducts,
    #[serde(rename = "Recycled Materials")]
    RecycledMaterials,
}

impl Category {
    /// All known categories, in display order.
    pub const ALL: [Self; 7] = [
        Self::EcoBags,
        Self::WaterBottles,
        Self::ReusableItems,
        Self::SolarProducts,
        Self::Organic,
        Self::BambooProducts,
        Self::RecycledMaterials,
    ];

    /// The display/stored form of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EcoBags => "Eco Bags",
            Self::WaterBottles => "Water Bottles",
            Self::ReusableItems => "Reusable Items",
            Self::SolarProducts => "Solar Products",
            Self::Organic => "Organic",
            Self::BambooProducts => "Bamboo Products",
            Self::RecycledMaterials => "Recycled Materials",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Case-insensitive match so URL path segments work without exact casing
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CategoryError(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_display_form() {
        assert_eq!(
            "Eco Bags".parse::<Category>().unwrap(),
            Category::EcoBags
        );
        assert_eq!(
            "water bottles".parse::<Category>().unwrap(),
            Category::WaterBottles
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert!("Gadgets".parse::<Category>().is_err());
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&Category::BambooProducts).unwrap();
        assert_eq!(json, "\"Bamboo Products\"");
        let cat: Category = serde_json::from_str("\"Organic\"").unwrap();
        assert_eq!(cat, Category::Organic);
    }

    #[test]
    fn test_all_roundtrip() {
        for cat in Category::ALL {
            assert_eq!(cat.as_str().parse::<Category>().unwrap(), cat);
        }
    }
}
