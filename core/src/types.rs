//! Domain DTOs for the skip API.
//!
//! # Design
//! `RawSkipRecord` mirrors the upstream JSON (snake_case) and is never
//! mutated once decoded. `DisplaySkipRecord` is what the wizard renders; it
//! serializes camelCase so a JavaScript or C host reads the same names the
//! views use. The mock-server crate defines its own copy of the upstream
//! shape; integration tests catch drift between the two.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_AREA, DEFAULT_POSTCODE};

/// Where to look for skips. An empty `area` is not sent upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub postcode: String,
    pub area: String,
}

impl Location {
    pub fn new(postcode: impl Into<String>, area: impl Into<String>) -> Self {
        Self {
            postcode: postcode.into(),
            area: area.into(),
        }
    }

    /// A location with no area filter.
    pub fn postcode_only(postcode: impl Into<String>) -> Self {
        Self::new(postcode, String::new())
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new(DEFAULT_POSTCODE, DEFAULT_AREA)
    }
}

/// Waste restrictions on a skip. Production sends a boolean; some feeds
/// send the list of forbidden categories instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Forbidden {
    Flag(bool),
    Categories(Vec<String>),
}

impl Forbidden {
    pub fn is_restricted(&self) -> bool {
        match self {
            Forbidden::Flag(flag) => *flag,
            Forbidden::Categories(categories) => !categories.is_empty(),
        }
    }
}

impl Default for Forbidden {
    fn default() -> Self {
        Forbidden::Flag(false)
    }
}

/// A skip as returned by `GET /skips/by-location`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSkipRecord {
    pub id: u64,
    /// Capacity in cubic yards.
    pub size: u32,
    pub hire_period_days: u32,
    pub price_before_vat: f64,
    /// VAT rate as a percentage, e.g. `20.0`.
    pub vat: f64,
    pub allowed_on_road: bool,
    pub allows_heavy_waste: bool,
    #[serde(default)]
    pub forbidden: Forbidden,
    #[serde(default)]
    pub transport_cost: Option<f64>,
    #[serde(default)]
    pub per_tonne_cost: Option<f64>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// A skip ready for display. Built by `transform::transform_skip`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySkipRecord {
    pub id: u64,
    pub name: String,
    /// VAT-inclusive price, e.g. `£240.00`.
    pub price: String,
    pub capacity: String,
    pub size: u32,
    pub hire_period: u32,
    pub allowed_on_road: bool,
    pub allows_heavy_waste: bool,
    pub price_before_vat: f64,
    pub price_after_vat: f64,
    pub vat: f64,
    pub transport_cost: Option<f64>,
    pub per_tonne_cost: Option<f64>,
    pub forbidden: Forbidden,
    pub postcode: Option<String>,
    pub area: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}
