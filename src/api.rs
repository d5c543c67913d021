// 🌐 REST API - axum router over RankService
// Thin mapping of query strings → service calls → JSON

use crate::demographics::{age_group_label, check_age, demographic_for_age};
use crate::distribution::{DistributionRecord, ALL_DEMOGRAPHIC};
use crate::error::RankError;
use crate::interpolation::Anchor;
use crate::service::RankService;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RankService>,
    pub default_geography: String,
}

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ApiError>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    error: &'static str,
    message: String,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Handler failure → status code + JSON body
pub struct AppError(RankError);

impl From<RankError> for AppError {
    fn from(e: RankError) -> Self {
        AppError(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match &self.0 {
            RankError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Bad Request"),
            RankError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
            RankError::InvariantViolation(_) | RankError::UnknownQuintile(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }

        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(ApiError {
                error,
                message: self.0.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

// ============================================================================
// QUERY PARSING
// ============================================================================

/// Raw query strings; parsed by hand so bad numbers get a JSON 400
#[derive(Debug, Default, Deserialize)]
pub struct IncomeQuery {
    income: Option<String>,
    age: Option<String>,
    geography: Option<String>,
    demographic: Option<String>,
}

fn parse_income(raw: Option<&str>) -> Result<f64, RankError> {
    let raw = raw.ok_or_else(|| RankError::invalid("income is required"))?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| RankError::invalid(format!("income must be a number, got '{}'", raw)))
}

fn parse_age(raw: &str) -> Result<u32, RankError> {
    let age = raw
        .trim()
        .parse::<u32>()
        .map_err(|_| RankError::invalid(format!("age must be a whole number, got '{}'", raw)))?;
    check_age(age)
}

impl IncomeQuery {
    /// Demographic code from `age` if given, else `demographic`, else `"all"`
    fn demographic(&self) -> Result<(String, Option<u32>), RankError> {
        if let Some(raw) = self.age.as_deref() {
            let age = parse_age(raw)?;
            return Ok((demographic_for_age(age).to_string(), Some(age)));
        }
        let code = self
            .demographic
            .clone()
            .unwrap_or_else(|| ALL_DEMOGRAPHIC.to_string());
        Ok((code, None))
    }

    fn geography<'a>(&'a self, state: &'a AppState) -> &'a str {
        self.geography
            .as_deref()
            .unwrap_or(&state.default_geography)
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    age_group: Option<&'static str>,
    #[serde(flatten)]
    comparison: crate::comparison::IncomeComparison,
}

#[derive(Serialize)]
pub struct DistributionResponse {
    #[serde(flatten)]
    record: DistributionRecord,
    anchors: Vec<Anchor>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    message: &'static str,
    version: &'static str,
    timestamp: String,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "OK",
        message: "Income rank API is running",
        version: crate::VERSION,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /api/income/percentile?income=&age=&geography=&demographic=
async fn get_percentile(
    State(state): State<AppState>,
    Query(query): Query<IncomeQuery>,
) -> ApiResult<PercentileResponse> {
    let income = parse_income(query.income.as_deref())?;
    let (demographic, age) = query.demographic()?;

    let comparison = state
        .service
        .compare_income(income, query.geography(&state), &demographic)?;

    Ok(Json(ApiResponse::ok(PercentileResponse {
        age,
        age_group: age.and_then(age_group_label),
        comparison,
    })))
}

/// GET /api/income/distribution?age=&geography=&demographic=
async fn get_distribution(
    State(state): State<AppState>,
    Query(query): Query<IncomeQuery>,
) -> ApiResult<DistributionResponse> {
    let (demographic, _) = query.demographic()?;
    let record = state.service.lookup(query.geography(&state), &demographic)?;

    Ok(Json(ApiResponse::ok(DistributionResponse {
        anchors: state.service.engine().anchors(record).to_vec(),
        record: record.clone(),
    })))
}

/// GET /api/income/household-percentile?income=
async fn get_household_percentile(
    State(state): State<AppState>,
    Query(query): Query<IncomeQuery>,
) -> ApiResult<crate::comparison::HouseholdComparison> {
    let income = parse_income(query.income.as_deref())?;
    let comparison = state.service.compare_household(income)?;
    Ok(Json(ApiResponse::ok(comparison)))
}

/// GET /api/income/household-distribution
async fn get_household_distribution(
    State(state): State<AppState>,
) -> ApiResult<crate::household::HouseholdRecord> {
    let household = state.service.household()?;
    Ok(Json(ApiResponse::ok(household.clone())))
}

/// GET /api/income/geographies
async fn get_geographies(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<crate::store::GeographyDescriptor>>> {
    Json(ApiResponse::ok(state.service.store().geographies().to_vec()))
}

/// GET /api/income/demographics
async fn get_demographics(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<crate::store::DemographicDescriptor>>> {
    Json(ApiResponse::ok(state.service.store().demographics().to_vec()))
}

/// Fallback for unknown routes
async fn not_found() -> AppError {
    AppError(RankError::not_found("route not found"))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let income_routes = Router::new()
        .route("/percentile", get(get_percentile))
        .route("/distribution", get(get_distribution))
        .route("/household-percentile", get(get_household_percentile))
        .route("/household-distribution", get(get_household_distribution))
        .route("/geographies", get(get_geographies))
        .route("/demographics", get(get_demographics));

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .nest("/income", income_routes);

    Router::new()
        .nest("/api", api_routes)
        .fallback(not_found)
        .with_state(state)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::household::{HouseholdRecord, Quintile};
    use crate::store::DistributionStore;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn state(with_household: bool) -> AppState {
        let mut store = DistributionStore::new();
        store.register(DistributionRecord::default_canada());

        if with_household {
            let quintile = |label: &str, average: f64| Quintile {
                label: label.to_string(),
                average: Some(average),
                min: None,
                max: None,
            };
            store.set_household(HouseholdRecord {
                geography_label: "Canada".to_string(),
                year: 2021,
                median: 84000.0,
                average: 106000.0,
                total_households: 15_000_000,
                quintiles: [
                    quintile("Q1", 20000.0),
                    quintile("Q2", 45000.0),
                    quintile("Q3", 75000.0),
                    quintile("Q4", 115000.0),
                    quintile("Q5", 250000.0),
                ],
            });
        }

        AppState {
            service: Arc::new(RankService::new(store, &EngineConfig::default()).unwrap()),
            default_geography: "CA".to_string(),
        }
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json(router(state(false)), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "OK");
    }

    #[tokio::test]
    async fn test_percentile_with_age_falls_back_to_all() {
        let (status, body) =
            get_json(router(state(false)), "/api/income/percentile?income=37358&age=27").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["percentile"], 50.0);
        assert_eq!(body["data"]["bracket"], "Above Median");
        assert_eq!(body["data"]["ageGroup"], "25-29");
        assert_eq!(body["data"]["geography"], "Canada");
    }

    #[tokio::test]
    async fn test_percentile_bad_input() {
        let (status, body) =
            get_json(router(state(false)), "/api/income/percentile?income=-10").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["error"], "Bad Request");

        let (status, _) = get_json(router(state(false)), "/api/income/percentile?income=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            get_json(router(state(false)), "/api/income/percentile?income=100&age=12").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_geography_is_404() {
        let (status, body) = get_json(
            router(state(false)),
            "/api/income/percentile?income=100&geography=ZZ",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["error"], "Not Found");
    }

    #[tokio::test]
    async fn test_distribution_includes_anchors() {
        let (status, body) = get_json(router(state(false)), "/api/income/distribution").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["geographyCode"], "CA");
        assert_eq!(body["data"]["percentiles"]["p50"], 37358.0);
        assert_eq!(body["data"]["anchors"].as_array().unwrap().len(), 9);
        assert_eq!(body["data"]["anchors"][8]["income"], 300000.0);
    }

    #[tokio::test]
    async fn test_household_routes() {
        let (status, body) = get_json(
            router(state(true)),
            "/api/income/household-percentile?income=10000",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["quintile"], 1);
        assert_eq!(body["data"]["percentile"], 6.2);
        assert_eq!(body["data"]["bracket"], "First Quintile (Q1) - Bottom 20%");

        let (status, body) =
            get_json(router(state(true)), "/api/income/household-distribution").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["totalHouseholds"], 15_000_000);

        let (status, _) =
            get_json(router(state(false)), "/api/income/household-distribution").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_indexes_and_fallback_route() {
        let (_, body) = get_json(router(state(false)), "/api/income/geographies").await;
        assert_eq!(body["data"][0]["code"], "CA");
        assert_eq!(body["data"][0]["type"], "country");

        let (_, body) = get_json(router(state(false)), "/api/income/demographics").await;
        assert_eq!(body["data"].as_array().unwrap().len(), 0);

        let (status, _) = get_json(router(state(false)), "/api/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
