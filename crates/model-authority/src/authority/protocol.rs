use std::time::Duration;

use reqwest::{Client, Url};
use tracing::debug;

use super::domain::ProtocolAuditResult;

pub const LLM_TXT_PATH: &str = "/llm.txt";
pub const AI_PLUGIN_PATH: &str = "/.well-known/ai-plugin.json";
pub const MCP_JSON_PATH: &str = "/.well-known/mcp.json";

/// Checks a site for the machine-readable manifests AI agents look for.
#[derive(Debug, Clone)]
pub struct ProtocolAuditor {
    client: Client,
    timeout: Duration,
}

impl ProtocolAuditor {
    pub fn new(timeout: Duration) -> Self {
        Self::with_client(Client::new(), timeout)
    }

    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Runs the three manifest checks concurrently. Each failed check only
    /// degrades its own flag; the audit itself never fails.
    pub async fn audit(&self, base_url: &str) -> ProtocolAuditResult {
        let origin = normalize_base_url(base_url);

        let (llm_txt, ai_plugin, mcp_json) = tokio::join!(
            self.endpoint_reachable(format!("{origin}{LLM_TXT_PATH}")),
            self.endpoint_serves_json_object(format!("{origin}{AI_PLUGIN_PATH}")),
            self.endpoint_serves_json_object(format!("{origin}{MCP_JSON_PATH}")),
        );

        let result = ProtocolAuditResult::from_checks(llm_txt, ai_plugin, mcp_json);
        debug!(%origin, llm_txt, ai_plugin, mcp_json, score = result.score, "protocol audit finished");
        result
    }

    async fn endpoint_reachable(&self, url: String) -> bool {
        match self.client.get(&url).timeout(self.timeout).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!(%url, error = %err, "manifest check failed");
                false
            }
        }
    }

    async fn endpoint_serves_json_object(&self, url: String) -> bool {
        let response = match self.client.get(&url).timeout(self.timeout).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                debug!(%url, status = %response.status(), "manifest missing");
                return false;
            }
            Err(err) => {
                debug!(%url, error = %err, "manifest check failed");
                return false;
            }
        };

        match response.json::<serde_json::Value>().await {
            Ok(body) => body.is_object(),
            Err(err) => {
                debug!(%url, error = %err, "manifest is not valid json");
                false
            }
        }
    }
}

/// Reduces a user-supplied address to `scheme://host[:port]`.
///
/// Text that does not parse as an absolute URL with a host is kept as-is minus a
/// trailing slash, with `https://` prefixed unless it already starts with `http`.
pub fn normalize_base_url(base_url: &str) -> String {
    let raw = base_url.trim();

    if let Ok(url) = Url::parse(raw) {
        if let Some(host) = url.host_str() {
            // Non-default ports stay so local and self-hosted sites can be audited.
            return match url.port() {
                Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
                None => format!("{}://{}", url.scheme(), host),
            };
        }
    }

    let trimmed = raw.strip_suffix('/').unwrap_or(raw);
    if trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}
