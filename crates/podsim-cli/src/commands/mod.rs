//! CLI commands implementation

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use podsim_core::{load_workload, Cluster, RunRecord, RunSummary, Scenario, Strategy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::render::{cluster_table, decisions_table, render_table};

/// API client for communicating with the daemon
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Scenario listing entry from API
#[derive(Debug, Deserialize)]
pub struct ScenarioEntry {
    pub id: Uuid,
    pub name: String,
    pub nodes: usize,
    pub pods: usize,
    pub strategy: Option<Strategy>,
    pub created_at: DateTime<Utc>,
}

/// Run listing entry from API
#[derive(Debug, Deserialize)]
pub struct RunEntry {
    pub id: Uuid,
    pub scenario_id: Option<Uuid>,
    pub strategy: Strategy,
    pub summary: RunSummary,
    pub created_at: DateTime<Utc>,
}

/// Status response
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub version: String,
    pub scenarios: usize,
    pub runs: usize,
    pub default_strategy: Strategy,
}

/// Turn a non-success response into an error carrying its body
async fn ensure_success(response: reqwest::Response, action: &str) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error = response.text().await.unwrap_or_default();
    anyhow::bail!("Failed to {} ({}): {}", action, status, error)
}

/// Schedule a workload locally and print the outcome
pub fn schedule(
    cluster_path: &Path,
    workload_path: &Path,
    strategy: Strategy,
    show_state: bool,
    json: bool,
) -> Result<()> {
    let report = schedule_report(cluster_path, workload_path, strategy, show_state, json)?;
    print!("{}", report);
    Ok(())
}

/// Load both definitions, run one pass and render the result.
///
/// `json` renders the decisions and final cluster as pretty JSON and takes
/// precedence over `show_state`.
pub fn schedule_report(
    cluster_path: &Path,
    workload_path: &Path,
    strategy: Strategy,
    show_state: bool,
    json: bool,
) -> Result<String> {
    let cluster = Cluster::from_file(cluster_path)
        .with_context(|| format!("loading cluster {}", cluster_path.display()))?;
    let pods = load_workload(workload_path)
        .with_context(|| format!("loading workload {}", workload_path.display()))?;

    let schedule = podsim_scheduler::run(&cluster, &pods, strategy);

    if json {
        let mut out = serde_json::to_string_pretty(&schedule)?;
        out.push('\n');
        return Ok(out);
    }

    let mut out = decisions_table(&schedule.decisions);
    if show_state {
        out.push('\n');
        out.push_str(&cluster_table(&schedule.cluster));
    }
    Ok(out)
}

/// Store a scenario built from cluster and workload files
pub async fn submit(
    client: &ApiClient,
    name: String,
    cluster_path: &Path,
    workload_path: &Path,
    strategy: Option<Strategy>,
) -> Result<()> {
    let cluster = Cluster::from_file(cluster_path)
        .with_context(|| format!("loading cluster {}", cluster_path.display()))?;
    let pods = load_workload(workload_path)
        .with_context(|| format!("loading workload {}", workload_path.display()))?;

    let mut scenario = Scenario::new(name, cluster, pods);
    scenario.strategy = strategy;

    #[derive(Deserialize)]
    struct CreateResponse {
        scenario_id: Uuid,
    }

    let response = client
        .client
        .post(client.url("/api/v1/scenarios"))
        .json(&scenario)
        .send()
        .await?;
    let created: CreateResponse = ensure_success(response, "create scenario")
        .await?
        .json()
        .await?;

    println!("Scenario '{}' created", scenario.name);
    println!("  ID: {}", created.scenario_id);
    println!("  Nodes: {}", scenario.cluster.nodes.len());
    println!("  Pods: {}", scenario.pods.len());

    Ok(())
}

/// List stored scenarios
pub async fn scenarios(client: &ApiClient) -> Result<()> {
    let entries = list_scenarios(client).await?;

    if entries.is_empty() {
        println!("No scenarios found");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = entries
        .into_iter()
        .map(|s| {
            vec![
                s.id.to_string(),
                s.name,
                s.nodes.to_string(),
                s.pods.to_string(),
                s.strategy.map(|st| st.to_string()).unwrap_or_else(|| "-".to_string()),
                s.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]
        })
        .collect();
    print!(
        "{}",
        render_table(&["ID", "NAME", "NODES", "PODS", "STRATEGY", "CREATED"], &rows)
    );

    Ok(())
}

/// Run a stored scenario on the daemon
pub async fn run(
    client: &ApiClient,
    scenario: String,
    strategy: Option<Strategy>,
    show_state: bool,
) -> Result<()> {
    let scenario_id = parse_scenario_id(client, &scenario).await?;

    #[derive(Serialize)]
    struct RunRequest {
        scenario_id: Uuid,
        #[serde(skip_serializing_if = "Option::is_none")]
        strategy: Option<Strategy>,
    }

    let response = client
        .client
        .post(client.url("/api/v1/runs"))
        .json(&RunRequest {
            scenario_id,
            strategy,
        })
        .send()
        .await?;
    let record: RunRecord = ensure_success(response, "run scenario")
        .await?
        .json()
        .await?;

    print_run(&record, show_state);
    Ok(())
}

/// List runs
pub async fn runs(client: &ApiClient) -> Result<()> {
    let response = client.client.get(client.url("/api/v1/runs")).send().await?;
    let entries: Vec<RunEntry> = ensure_success(response, "list runs")
        .await?
        .json()
        .await?;

    if entries.is_empty() {
        println!("No runs found");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = entries
        .into_iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.scenario_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "(inline)".to_string()),
                r.strategy.to_string(),
                format!("{}/{}", r.summary.scheduled, r.summary.total),
                r.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]
        })
        .collect();
    print!(
        "{}",
        render_table(&["ID", "SCENARIO", "STRATEGY", "SCHEDULED", "CREATED"], &rows)
    );

    Ok(())
}

/// Show a run
pub async fn show(client: &ApiClient, run: String, show_state: bool) -> Result<()> {
    let id = Uuid::parse_str(&run).with_context(|| format!("invalid run ID '{}'", run))?;

    let response = client
        .client
        .get(client.url(&format!("/api/v1/runs/{}", id)))
        .send()
        .await?;
    let record: RunRecord = ensure_success(response, "get run").await?.json().await?;

    print_run(&record, show_state);
    Ok(())
}

/// Show daemon status
pub async fn status(client: &ApiClient) -> Result<()> {
    let response = client
        .client
        .get(client.url("/api/v1/status"))
        .send()
        .await?;
    let status: StatusResponse = ensure_success(response, "get status")
        .await?
        .json()
        .await?;

    println!("podsim v{}", status.version);
    println!();
    println!("Scenarios: {}", status.scenarios);
    println!("Runs: {}", status.runs);
    println!("Default strategy: {}", status.default_strategy);

    Ok(())
}

async fn list_scenarios(client: &ApiClient) -> Result<Vec<ScenarioEntry>> {
    let response = client
        .client
        .get(client.url("/api/v1/scenarios"))
        .send()
        .await?;
    Ok(ensure_success(response, "list scenarios")
        .await?
        .json()
        .await?)
}

/// Helper to parse scenario ID (UUID or name)
async fn parse_scenario_id(client: &ApiClient, scenario: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(scenario) {
        return Ok(id);
    }

    // The daemon answers with the newest scenario of that name
    let response = client
        .client
        .get(client.url("/api/v1/scenarios"))
        .query(&[("name", scenario)])
        .send()
        .await?;
    let entries: Vec<ScenarioEntry> = ensure_success(response, "find scenario")
        .await?
        .json()
        .await?;

    entries
        .into_iter()
        .next()
        .map(|s| s.id)
        .ok_or_else(|| anyhow::anyhow!("Scenario '{}' not found", scenario))
}

/// Helper to print a run
fn print_run(record: &RunRecord, show_state: bool) {
    println!("Run: {}", record.id);
    println!("  Strategy: {}", record.strategy);
    println!(
        "  Scheduled: {}/{}",
        record.summary.scheduled, record.summary.total
    );
    println!();
    print!("{}", decisions_table(&record.decisions));
    if show_state {
        println!();
        print!("{}", cluster_table(&record.cluster));
    }
}
