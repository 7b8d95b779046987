//! Stateless HTTP request builder and response parser for the skip API.
//!
//! # Design
//! `SkipClient` holds only a `base_url` and carries no mutable state between
//! calls. The location lookup is split into `build_skips_by_location`, which
//! produces an `HttpRequest`, and `parse_skips_by_location`, which consumes
//! an `HttpResponse`. The round-trip itself belongs to a `Transport` or the
//! foreign host, keeping this module deterministic.
//!
//! The body must be a JSON array. Elements are decoded one at a time so a
//! single malformed record is dropped (and logged) instead of sinking the
//! whole batch.

use serde_json::Value;
use tracing::warn;

use crate::config::{BY_LOCATION_PATH, DEFAULT_BASE_URL};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Location, RawSkipRecord};

/// Records decoded from one response.
#[derive(Debug, Clone, PartialEq)]
pub struct SkipBatch {
    pub records: Vec<RawSkipRecord>,
    /// Array elements that did not decode as a skip record.
    pub rejected: usize,
}

/// Synchronous, stateless client for the skip API.
#[derive(Debug, Clone)]
pub struct SkipClient {
    base_url: String,
}

impl SkipClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_skips_by_location(&self, location: &Location) -> Result<HttpRequest, ApiError> {
        let postcode = location.postcode.trim();
        if postcode.is_empty() {
            return Err(ApiError::InvalidQuery("postcode must not be empty".to_string()));
        }

        let mut url = format!(
            "{}{BY_LOCATION_PATH}?postcode={}",
            self.base_url,
            urlencoding::encode(postcode)
        );
        let area = location.area.trim();
        if !area.is_empty() {
            url.push_str("&area=");
            url.push_str(&urlencoding::encode(area));
        }

        Ok(HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
        })
    }

    pub fn parse_skips_by_location(&self, response: HttpResponse) -> Result<SkipBatch, ApiError> {
        check_status(&response)?;
        let elements: Vec<Value> = serde_json::from_str(&response.body)?;

        let mut records = Vec::with_capacity(elements.len());
        let mut rejected = 0;
        for (index, element) in elements.into_iter().enumerate() {
            match serde_json::from_value::<RawSkipRecord>(element) {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!(index, error = %err, "dropping malformed skip record");
                    rejected += 1;
                }
            }
        }
        Ok(SkipBatch { records, rejected })
    }
}

impl Default for SkipClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Map any status outside 2xx to `ApiError::Status`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Status {
        status: response.status,
        status_text: response.status_text.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SkipClient {
        SkipClient::new("http://localhost:3000")
    }

    fn response(status: u16, status_text: &str, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            status_text: status_text.to_string(),
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    const ONE_SKIP: &str = r#"[{"id":1,"size":8,"hire_period_days":14,"price_before_vat":200,"vat":20,"allowed_on_road":true,"allows_heavy_waste":false,"forbidden":false,"transport_cost":null,"per_tonne_cost":null,"postcode":"NR32","area":"Lowestoft","created_at":"2025-04-03T13:51:46","updated_at":"2025-04-07T13:16:52"}]"#;

    #[test]
    fn build_with_area() {
        let req = client()
            .build_skips_by_location(&Location::new("NR32", "Lowestoft"))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "http://localhost:3000/skips/by-location?postcode=NR32&area=Lowestoft"
        );
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn build_without_area_omits_param() {
        let req = client()
            .build_skips_by_location(&Location::postcode_only("NR32"))
            .unwrap();
        assert_eq!(req.url, "http://localhost:3000/skips/by-location?postcode=NR32");
    }

    #[test]
    fn build_encodes_query_values() {
        let req = client()
            .build_skips_by_location(&Location::new("NR32 1AB", "St Olaves & Fritton"))
            .unwrap();
        assert_eq!(
            req.url,
            "http://localhost:3000/skips/by-location?postcode=NR32%201AB&area=St%20Olaves%20%26%20Fritton"
        );
    }

    #[test]
    fn build_rejects_blank_postcode() {
        let err = client()
            .build_skips_by_location(&Location::new("  ", "Lowestoft"))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidQuery(_)));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = SkipClient::new("http://localhost:3000/");
        let req = client
            .build_skips_by_location(&Location::postcode_only("NR32"))
            .unwrap();
        assert_eq!(req.url, "http://localhost:3000/skips/by-location?postcode=NR32");
    }

    #[test]
    fn default_client_targets_compiled_origin() {
        assert_eq!(SkipClient::default().base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn parse_success() {
        let batch = client()
            .parse_skips_by_location(response(200, "OK", ONE_SKIP))
            .unwrap();
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.rejected, 0);
        assert_eq!(batch.records[0].size, 8);
    }

    #[test]
    fn parse_keeps_record_with_null_pass_through_fields() {
        let body = r#"[{"id":1,"size":8,"hire_period_days":14,"price_before_vat":200,"vat":20,"allowed_on_road":true,"allows_heavy_waste":false,"postcode":"NR32","created_at":"2025-04-03T13:51:46","updated_at":null}]"#;
        let batch = client()
            .parse_skips_by_location(response(200, "OK", body))
            .unwrap();
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.rejected, 0);
        assert_eq!(batch.records[0].updated_at, None);
    }

    #[test]
    fn parse_empty_array_is_success() {
        let batch = client()
            .parse_skips_by_location(response(200, "OK", "[]"))
            .unwrap();
        assert!(batch.records.is_empty());
    }

    #[test]
    fn parse_server_error_carries_status_text() {
        let err = client()
            .parse_skips_by_location(response(500, "Internal Server Error", "boom"))
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Status {
                status: 500,
                status_text: "Internal Server Error".to_string()
            }
        );
        assert_eq!(err.to_string(), "API Error: 500 Internal Server Error");
    }

    #[test]
    fn parse_not_found_is_a_status_error() {
        let err = client()
            .parse_skips_by_location(response(404, "Not Found", ""))
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn parse_bad_json() {
        let err = client()
            .parse_skips_by_location(response(200, "OK", "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn parse_object_body_is_a_parse_error() {
        let err = client()
            .parse_skips_by_location(response(200, "OK", r#"{"skips":[]}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn parse_drops_malformed_records_and_keeps_order() {
        let body = r#"[
            {"id":1,"size":4,"hire_period_days":14,"price_before_vat":100,"vat":20,"allowed_on_road":true,"allows_heavy_waste":true,"postcode":"NR32"},
            {"id":2,"size":6,"hire_period_days":14,"vat":20,"allowed_on_road":true,"allows_heavy_waste":true,"postcode":"NR32"},
            {"id":3,"size":8,"hire_period_days":14,"price_before_vat":"cheap","vat":20,"allowed_on_road":true,"allows_heavy_waste":true,"postcode":"NR32"},
            {"id":4,"size":10,"hire_period_days":14,"price_before_vat":300,"vat":20,"allowed_on_road":false,"allows_heavy_waste":false,"postcode":"NR32"}
        ]"#;
        let batch = client()
            .parse_skips_by_location(response(200, "OK", body))
            .unwrap();
        let ids: Vec<u64> = batch.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(batch.rejected, 2);
    }
}
