//! REST API handlers

use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, Method, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use podsim_core::{
    ApiConfig, Decision, PodsimError, Resource, RunRecord, RunSummary, Scenario, ScenarioRecord,
    Strategy,
};
use podsim_scheduler::Scheduler;
use podsim_store::{RunStore, ScenarioStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

/// Application state shared across handlers
pub struct AppState {
    pub scenarios: Arc<ScenarioStore>,
    pub runs: Arc<RunStore>,
    /// Strategy for runs that name none and whose scenario names none
    pub default_strategy: Strategy,
}

impl AppState {
    /// Create state over the given stores
    pub fn new(
        scenarios: Arc<ScenarioStore>,
        runs: Arc<RunStore>,
        default_strategy: Strategy,
    ) -> Self {
        Self {
            scenarios,
            runs,
            default_strategy,
        }
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/scenarios", post(create_scenario).get(list_scenarios))
        .route(
            "/api/v1/scenarios/:id",
            get(get_scenario).delete(delete_scenario),
        )
        .route("/api/v1/runs", post(create_run).get(list_runs))
        .route("/api/v1/runs/:id", get(get_run).delete(delete_run))
        .route("/api/v1/runs/:id/decisions", get(get_run_decisions))
        .route("/api/v1/runs/:id/cluster", get(get_run_cluster))
        .route("/api/v1/status", get(get_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the CORS layer described by the API configuration
pub fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let origin = if config.cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(config.cors_origins.iter().filter_map(|o| {
            match o.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            }
        }))
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

fn error_response(err: PodsimError) -> (StatusCode, String) {
    let status = match err {
        PodsimError::ScenarioNotFound(_) | PodsimError::RunNotFound(_) => StatusCode::NOT_FOUND,
        PodsimError::Validation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

/// Response for a created scenario
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateScenarioResponse {
    pub scenario_id: Uuid,
}

/// Create a new scenario
async fn create_scenario(
    State(state): State<Arc<AppState>>,
    Json(scenario): Json<Scenario>,
) -> Result<Json<CreateScenarioResponse>, (StatusCode, String)> {
    scenario.validate().map_err(error_response)?;

    let record = state.scenarios.insert(scenario).await;
    Ok(Json(CreateScenarioResponse {
        scenario_id: record.id,
    }))
}

/// Scenario listing entry
#[derive(Debug, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub id: Uuid,
    pub name: String,
    pub nodes: usize,
    pub pods: usize,
    pub strategy: Option<Strategy>,
    pub created_at: DateTime<Utc>,
}

impl From<ScenarioRecord> for ScenarioSummary {
    fn from(record: ScenarioRecord) -> Self {
        Self {
            id: record.id,
            name: record.scenario.name,
            nodes: record.scenario.cluster.nodes.len(),
            pods: record.scenario.pods.len(),
            strategy: record.scenario.strategy,
            created_at: record.created_at,
        }
    }
}

/// Scenario listing filter
#[derive(Debug, Default, Deserialize)]
pub struct ListScenariosQuery {
    /// Only the newest scenario with this name
    pub name: Option<String>,
}

/// List scenarios, oldest first, or the newest one with a given name
async fn list_scenarios(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListScenariosQuery>,
) -> Result<Json<Vec<ScenarioSummary>>, (StatusCode, String)> {
    let scenarios = match query.name {
        Some(name) => state
            .scenarios
            .find_by_name(&name)
            .await
            .into_iter()
            .collect(),
        None => state.scenarios.list().await,
    };
    Ok(Json(
        scenarios.into_iter().map(ScenarioSummary::from).collect(),
    ))
}

/// Get a specific scenario
async fn get_scenario(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScenarioRecord>, (StatusCode, String)> {
    let record = state.scenarios.get(id).await.map_err(error_response)?;
    Ok(Json(record))
}

/// Delete a scenario
async fn delete_scenario(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    info!(scenario_id = %id, "Deleting scenario");
    state.scenarios.remove(id).await.map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request to run the scheduler.
///
/// An inline scenario takes precedence over a stored one; an explicit
/// strategy takes precedence over the scenario's.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RunRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<Scenario>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
}

/// Run the scheduler over a scenario and store the result
async fn create_run(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RunRequest>,
) -> Result<Json<RunRecord>, (StatusCode, String)> {
    let (scenario_id, scenario) = match (req.scenario, req.scenario_id) {
        (Some(scenario), _) => {
            scenario.validate().map_err(error_response)?;
            (None, scenario)
        }
        (None, Some(id)) => {
            let record = state.scenarios.get(id).await.map_err(error_response)?;
            (Some(id), record.scenario)
        }
        (None, None) => {
            return Err((
                StatusCode::BAD_REQUEST,
                "scenario_id or scenario required".to_string(),
            ))
        }
    };

    let strategy = req
        .strategy
        .or(scenario.strategy)
        .unwrap_or(state.default_strategy);

    info!(
        scenario = %scenario.name,
        strategy = %strategy,
        nodes = scenario.cluster.nodes.len(),
        pods = scenario.pods.len(),
        "Running scheduler"
    );

    let schedule = Scheduler::new(strategy).run(&scenario.cluster, &scenario.pods);
    let record = RunRecord::new(scenario_id, strategy, schedule);
    state.runs.insert(record.clone()).await;

    Ok(Json(record))
}

/// Run listing entry
#[derive(Debug, Serialize, Deserialize)]
pub struct RunListEntry {
    pub id: Uuid,
    pub scenario_id: Option<Uuid>,
    pub strategy: Strategy,
    pub summary: RunSummary,
    pub created_at: DateTime<Utc>,
}

impl From<RunRecord> for RunListEntry {
    fn from(record: RunRecord) -> Self {
        Self {
            id: record.id,
            scenario_id: record.scenario_id,
            strategy: record.strategy,
            summary: record.summary,
            created_at: record.created_at,
        }
    }
}

/// List all runs
async fn list_runs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RunListEntry>>, (StatusCode, String)> {
    let runs = state.runs.list().await;
    Ok(Json(runs.into_iter().map(RunListEntry::from).collect()))
}

/// Get a specific run
async fn get_run(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RunRecord>, (StatusCode, String)> {
    let record = state.runs.get(id).await.map_err(error_response)?;
    Ok(Json(record))
}

/// Get the decisions of a run
async fn get_run_decisions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Decision>>, (StatusCode, String)> {
    let record = state.runs.get(id).await.map_err(error_response)?;
    Ok(Json(record.decisions))
}

/// Node state after a run
#[derive(Debug, Serialize, Deserialize)]
pub struct NodeState {
    pub name: String,
    pub capacity: Resource,
    pub allocated: Resource,
    pub remaining: Resource,
}

/// Get the final cluster state of a run
async fn get_run_cluster(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<NodeState>>, (StatusCode, String)> {
    let record = state.runs.get(id).await.map_err(error_response)?;
    let nodes = record
        .cluster
        .nodes
        .into_iter()
        .map(|n| NodeState {
            remaining: n.remaining(),
            name: n.name,
            capacity: n.capacity,
            allocated: n.allocated,
        })
        .collect();
    Ok(Json(nodes))
}

/// Delete a run
async fn delete_run(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    info!(run_id = %id, "Deleting run");
    state.runs.remove(id).await.map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

/// System status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub version: String,
    pub scenarios: usize,
    pub runs: usize,
    pub default_strategy: Strategy,
}

/// Get system status
async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, (StatusCode, String)> {
    Ok(Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        scenarios: state.scenarios.len().await,
        runs: state.runs.len().await,
        default_strategy: state.default_strategy,
    }))
}
