use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AgentAction {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub endpoint: String,
    pub method: AgentAction,
    pub latency_ms: u64,
    pub success: bool,
    pub action_output: String,
}

/// Exercises an agent-facing endpoint the way an autonomous agent would.
#[derive(Debug, Clone)]
pub struct AgentSimulator {
    client: Client,
    timeout: Duration,
}

impl AgentSimulator {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    pub async fn simulate(
        &self,
        endpoint: &str,
        method: AgentAction,
        payload: Option<&serde_json::Value>,
    ) -> SimulationResult {
        let started = Instant::now();

        let request = match method {
            AgentAction::Get => self.client.get(endpoint),
            AgentAction::Post => {
                let request = self.client.post(endpoint);
                match payload {
                    Some(body) => request.json(body),
                    None => request,
                }
            }
        };

        let outcome = match request.timeout(self.timeout).send().await {
            Ok(response) => {
                let success = response.status().is_success();
                match response.text().await {
                    Ok(body) if body.is_empty() => (success, "No output generated".to_string()),
                    Ok(body) => (success, body),
                    Err(err) => (false, err.to_string()),
                }
            }
            Err(err) => (false, err.to_string()),
        };

        SimulationResult {
            endpoint: endpoint.to_string(),
            method,
            latency_ms: started.elapsed().as_millis() as u64,
            success: outcome.0,
            action_output: outcome.1,
        }
    }
}
