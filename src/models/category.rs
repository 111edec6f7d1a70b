//! Cuisine categories offered as search filters

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::FoodGuideError;

/// One of the fixed cuisine filters.
///
/// The display string is also the literal text placed in the prompt, so there
/// is no separate internal code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CuisineCategory {
    #[default]
    Recommended,
    Japanese,
    Italian,
    Chinese,
    Cafe,
    #[serde(rename = "BBQ")]
    Bbq,
    Vegan,
    Bar,
}

impl CuisineCategory {
    /// Every category, in filter-bar order
    pub const ALL: [CuisineCategory; 8] = [
        CuisineCategory::Recommended,
        CuisineCategory::Japanese,
        CuisineCategory::Italian,
        CuisineCategory::Chinese,
        CuisineCategory::Cafe,
        CuisineCategory::Bbq,
        CuisineCategory::Vegan,
        CuisineCategory::Bar,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CuisineCategory::Recommended => "Recommended",
            CuisineCategory::Japanese => "Japanese",
            CuisineCategory::Italian => "Italian",
            CuisineCategory::Chinese => "Chinese",
            CuisineCategory::Cafe => "Cafe",
            CuisineCategory::Bbq => "BBQ",
            CuisineCategory::Vegan => "Vegan",
            CuisineCategory::Bar => "Bar",
        }
    }
}

impl Display for CuisineCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CuisineCategory {
    type Err = FoodGuideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CuisineCategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let names: Vec<&str> = CuisineCategory::ALL.iter().map(|c| c.as_str()).collect();
                FoodGuideError::invalid_input(format!(
                    "unknown category '{wanted}'. Must be one of: {}",
                    names.join(", ")
                ))
            })
    }
}
