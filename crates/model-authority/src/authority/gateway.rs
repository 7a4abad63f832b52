//! Boundary to the generative-AI proxy.
//!
//! The proxy answers with loosely-typed JSON. Everything that crosses into the
//! scoring code is parsed here into typed values, with range checks, so the
//! calculators never see raw payloads.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::domain::{AggregatedScore, SubScoreSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayAction {
    ModelSampling,
    GeoReadability,
}

impl GatewayAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ModelSampling => "model_sampling",
            Self::GeoReadability => "geo_readability",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("gateway responded with status {0}")]
    Status(u16),
    #[error("invalid gateway payload: {0}")]
    InvalidPayload(String),
}

#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn invoke(&self, action: GatewayAction, payload: Value) -> Result<Value, GatewayError>;
}

/// Posts `{action, payload}` to the proxy endpoint.
#[derive(Debug, Clone)]
pub struct HttpModelGateway {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpModelGateway {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ModelGateway for HttpModelGateway {
    async fn invoke(&self, action: GatewayAction, payload: Value) -> Result<Value, GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&json!({ "action": action.as_str(), "payload": payload }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GatewayError::Status(response.status().as_u16()));
        }

        Ok(response.json::<Value>().await?)
    }
}

/// Parameters of a model sampling batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingRequest {
    pub brand: String,
    pub prompts: Vec<String>,
    #[serde(default)]
    pub competitors: Vec<String>,
    pub models: Vec<String>,
    pub temperature: f64,
    pub context: String,
}

/// Typed view of a model sampling response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelSampling {
    pub mention_frequency: f64,
    pub recommendation_rank: f64,
    pub cross_model_consistency: f64,
    pub share_of_model: f64,
    pub raw_responses: Vec<String>,
}

impl ModelSampling {
    pub fn from_value(value: Value) -> Result<Self, GatewayError> {
        let sampling: Self = parse(value, "model sampling")?;
        check_score("mentionFrequency", sampling.mention_frequency)?;
        check_score("recommendationRank", sampling.recommendation_rank)?;
        check_score("crossModelConsistency", sampling.cross_model_consistency)?;
        check_score("shareOfModel", sampling.share_of_model)?;
        Ok(sampling)
    }
}

/// Typed view of a GEO readability analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoReadability {
    pub score: f64,
    #[serde(default)]
    pub critical_alerts: Vec<String>,
    #[serde(default, alias = "rawReadingSim")]
    pub raw_reading: String,
}

impl GeoReadability {
    pub fn from_value(value: Value) -> Result<Self, GatewayError> {
        let readability: Self = parse(value, "geo readability")?;
        check_score("score", readability.score)?;
        Ok(readability)
    }
}

/// Validates an externally supplied breakdown before it reaches the calculator.
pub fn validate_sub_scores(breakdown: &SubScoreSet) -> Result<(), GatewayError> {
    check_score("infrastructure", breakdown.infrastructure)?;
    check_score("visibility", breakdown.visibility)?;
    check_score("recommendation", breakdown.recommendation)?;
    check_score("agentExecution", breakdown.agent_execution)?;
    check_score("protocolCompliance", breakdown.protocol_compliance)?;
    if let Some(som) = breakdown.som {
        check_score("som", som)?;
    }
    Ok(())
}

pub fn validate_aggregated(scores: &AggregatedScore) -> Result<(), GatewayError> {
    check_score("infrastructure", scores.infrastructure)?;
    check_score("visibility", scores.visibility)?;
    check_score("recommendation", scores.recommendation)?;
    check_score("agentExecution", scores.agent_execution)
}

fn parse<T: serde::de::DeserializeOwned>(value: Value, what: &str) -> Result<T, GatewayError> {
    serde_json::from_value(value)
        .map_err(|err| GatewayError::InvalidPayload(format!("{what}: {err}")))
}

fn check_score(field: &str, value: f64) -> Result<(), GatewayError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(GatewayError::InvalidPayload(format!(
            "{field} must be within 0..=100, got {value}"
        )))
    }
}

/// Runs one sampling batch through the gateway and parses the answer.
pub async fn run_model_sampling<G: ModelGateway + ?Sized>(
    gateway: &G,
    request: &SamplingRequest,
) -> Result<ModelSampling, GatewayError> {
    let payload = serde_json::to_value(request)
        .map_err(|err| GatewayError::InvalidPayload(format!("sampling request: {err}")))?;
    let response = gateway.invoke(GatewayAction::ModelSampling, payload).await?;
    ModelSampling::from_value(response)
}

/// Asks the proxy to grade how readable `content` (rendered from `url`) is
/// for answer engines.
pub async fn analyze_geo_readability<G: ModelGateway + ?Sized>(
    gateway: &G,
    url: &str,
    content: &str,
) -> Result<GeoReadability, GatewayError> {
    let payload = json!({ "url": url, "content": content });
    let response = gateway.invoke(GatewayAction::GeoReadability, payload).await?;
    GeoReadability::from_value(response)
}
