//! Build-time configuration.
//!
//! The API origin is baked in at compile time. Set `SKIP_API_BASE_URL` when
//! building to point the crate at a staging or mock deployment.

/// Production origin of the skip pricing API.
pub const PRODUCTION_BASE_URL: &str = "https://app.wewantwaste.co.uk/api";

/// Origin compiled into this build.
pub const DEFAULT_BASE_URL: &str = match option_env!("SKIP_API_BASE_URL") {
    Some(url) => url,
    None => PRODUCTION_BASE_URL,
};

pub const DEFAULT_POSTCODE: &str = "NR32";
pub const DEFAULT_AREA: &str = "Lowestoft";

/// Sub-path of the location lookup, relative to the base URL.
pub const BY_LOCATION_PATH: &str = "/skips/by-location";
