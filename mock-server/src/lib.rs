use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Skip {
    pub id: u64,
    pub size: u32,
    pub hire_period_days: u32,
    pub transport_cost: Option<f64>,
    pub per_tonne_cost: Option<f64>,
    pub price_before_vat: f64,
    pub vat: f64,
    pub postcode: String,
    pub area: String,
    pub forbidden: bool,
    pub created_at: String,
    pub updated_at: String,
    pub allowed_on_road: bool,
    pub allows_heavy_waste: bool,
}

/// What the mock serves. `fail_with` forces every lookup to that status.
#[derive(Clone, Debug, Default)]
pub struct MockConfig {
    pub skips: Vec<Skip>,
    pub fail_with: Option<u16>,
}

impl MockConfig {
    pub fn seeded() -> Self {
        Self {
            skips: seed_skips(),
            fail_with: None,
        }
    }
}

#[derive(Deserialize)]
pub struct LocationQuery {
    pub postcode: Option<String>,
    pub area: Option<String>,
}

#[derive(Deserialize)]
pub struct FailureToggle {
    pub status: Option<u16>,
}

pub type Db = Arc<RwLock<MockConfig>>;

pub fn app() -> Router {
    app_with(MockConfig::seeded())
}

pub fn app_with(config: MockConfig) -> Router {
    let db: Db = Arc::new(RwLock::new(config));
    Router::new()
        .route("/skips/by-location", get(skips_by_location))
        .route("/__mock/failure", put(set_failure))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

async fn skips_by_location(
    State(db): State<Db>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<Vec<Skip>>, StatusCode> {
    let config = db.read().await;
    if let Some(status) = config.fail_with {
        debug!(status, "forced failure");
        return Err(StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR));
    }

    let postcode = query.postcode.unwrap_or_default();
    let postcode = postcode.trim();
    if postcode.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let postcode = postcode.to_ascii_uppercase();
    let area = query.area.filter(|a| !a.trim().is_empty());

    let matches: Vec<Skip> = config
        .skips
        .iter()
        .filter(|skip| postcode.starts_with(&skip.postcode.to_ascii_uppercase()))
        .filter(|skip| match &area {
            Some(area) => skip.area.eq_ignore_ascii_case(area.trim()),
            None => true,
        })
        .cloned()
        .collect();
    info!(%postcode, ?area, count = matches.len(), "skips by location");
    Ok(Json(matches))
}

async fn set_failure(State(db): State<Db>, Json(toggle): Json<FailureToggle>) -> StatusCode {
    if let Some(status) = toggle.status {
        match StatusCode::from_u16(status) {
            Ok(code) if code.is_client_error() || code.is_server_error() => {}
            _ => return StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
    db.write().await.fail_with = toggle.status;
    StatusCode::NO_CONTENT
}

/// Nine skip sizes for NR32 / Lowestoft at a 20% VAT rate.
pub fn seed_skips() -> Vec<Skip> {
    let rows: [(u64, u32, f64, Option<f64>, bool, bool); 9] = [
        (17933, 4, 278.0, None, true, false),
        (17934, 6, 305.0, None, true, false),
        (17935, 8, 375.0, None, true, false),
        (17936, 10, 400.0, None, false, false),
        (17937, 12, 439.0, None, false, false),
        (17938, 14, 470.0, None, false, false),
        (17939, 16, 496.0, None, false, false),
        (17940, 20, 992.0, Some(248.0), false, true),
        (17941, 40, 992.0, Some(248.0), false, true),
    ];
    rows.into_iter()
        .map(
            |(id, size, price_before_vat, per_tonne_cost, allowed_on_road, allows_heavy_waste)| Skip {
                id,
                size,
                hire_period_days: 14,
                transport_cost: per_tonne_cost,
                per_tonne_cost,
                price_before_vat,
                vat: 20.0,
                postcode: "NR32".to_string(),
                area: "Lowestoft".to_string(),
                forbidden: false,
                created_at: "2025-04-03T13:51:46.897146".to_string(),
                updated_at: "2025-04-07T13:16:52.813".to_string(),
                allowed_on_road,
                allows_heavy_waste,
            },
        )
        .collect()
}
