//! Raw-to-display mapping for skip records.
//!
//! Pure functions: no I/O, no logging, same input gives bit-identical output.

use crate::types::{DisplaySkipRecord, RawSkipRecord};

/// VAT-inclusive price. Always recomputed from the pre-tax price and rate.
pub fn price_after_vat(price_before_vat: f64, vat: f64) -> f64 {
    price_before_vat * (1.0 + vat / 100.0)
}

/// Currency string rounded to two decimals, e.g. `£240.00`.
pub fn format_price(amount: f64) -> String {
    format!("£{amount:.2}")
}

pub fn skip_name(size: u32) -> String {
    format!("{size} YARD SKIP CONTAINER")
}

pub fn capacity_label(size: u32) -> String {
    format!("{size} cubic yards")
}

pub fn transform_skip(raw: &RawSkipRecord) -> DisplaySkipRecord {
    let after_vat = price_after_vat(raw.price_before_vat, raw.vat);
    DisplaySkipRecord {
        id: raw.id,
        name: skip_name(raw.size),
        price: format_price(after_vat),
        capacity: capacity_label(raw.size),
        size: raw.size,
        hire_period: raw.hire_period_days,
        allowed_on_road: raw.allowed_on_road,
        allows_heavy_waste: raw.allows_heavy_waste,
        price_before_vat: raw.price_before_vat,
        price_after_vat: after_vat,
        vat: raw.vat,
        transport_cost: raw.transport_cost,
        per_tonne_cost: raw.per_tonne_cost,
        forbidden: raw.forbidden.clone(),
        postcode: raw.postcode.clone(),
        area: raw.area.clone(),
        created_at: raw.created_at.clone(),
        updated_at: raw.updated_at.clone(),
    }
}

/// Order-preserving, one output per input.
pub fn transform_skips(raw: &[RawSkipRecord]) -> Vec<DisplaySkipRecord> {
    raw.iter().map(transform_skip).collect()
}
