pub mod error;
pub mod types;

pub use error::{Result, StatementError};
pub use types::{CloudKsqlRequest, KsqlRequest, StatementResponse};

use std::collections::BTreeMap;

use reqwest::StatusCode;

const KSQL_CONTENT_TYPE: &str = "application/vnd.ksql.v1+json";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Default base URL of the managed ksqlDB cluster API.
pub const CLOUD_API_URL: &str = "https://api.confluent.cloud";

/// Shape of the remote statement API. Both shapes take one statement per
/// request and authenticate with an API key/secret pair over basic auth.
#[derive(Debug, Clone)]
pub enum Endpoint {
    /// ksqlDB REST: `POST {base_url}/ksql`.
    Ksql { base_url: String },
    /// Managed ksqlDB cluster API:
    /// `POST {base_url}/ksql/v2/clusters/{cluster_id}/ksql`.
    CloudKsql { base_url: String, cluster_id: String },
}

impl Endpoint {
    pub fn url(&self) -> String {
        match self {
            Endpoint::Ksql { base_url } => format!("{}/ksql", base_url.trim_end_matches('/')),
            Endpoint::CloudKsql {
                base_url,
                cluster_id,
            } => format!(
                "{}/ksql/v2/clusters/{}/ksql",
                base_url.trim_end_matches('/'),
                cluster_id
            ),
        }
    }

    fn content_type(&self) -> &'static str {
        match self {
            Endpoint::Ksql { .. } => KSQL_CONTENT_TYPE,
            Endpoint::CloudKsql { .. } => JSON_CONTENT_TYPE,
        }
    }

    /// Request body for one statement. Both shapes read topics from the
    /// earliest offset.
    pub fn body(&self, statement: &str) -> Result<serde_json::Value> {
        let body = match self {
            Endpoint::Ksql { .. } => serde_json::to_value(KsqlRequest {
                ksql: statement.to_string(),
                streams_properties: BTreeMap::from([(
                    "ksql.streams.auto.offset.reset".to_string(),
                    "earliest".to_string(),
                )]),
            })?,
            Endpoint::CloudKsql { .. } => serde_json::to_value(CloudKsqlRequest {
                sql_string: statement.to_string(),
                properties: BTreeMap::from([
                    ("auto.offset.reset".to_string(), "earliest".to_string()),
                    (
                        "ksql.streams.auto.offset.reset".to_string(),
                        "earliest".to_string(),
                    ),
                ]),
            })?,
        };
        Ok(body)
    }
}

pub struct StatementClient {
    client: reqwest::Client,
    endpoint: Endpoint,
    api_key: String,
    api_secret: String,
}

impl StatementClient {
    pub fn new(endpoint: Endpoint, api_key: String, api_secret: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            api_secret,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Submit one statement. Anything but `200 OK` with a JSON body is an error;
    /// the error carries the response body so callers can log it.
    pub async fn submit(&self, statement: &str) -> Result<StatementResponse> {
        let url = self.endpoint.url();
        let content_type = self.endpoint.content_type();
        let body = self.endpoint.body(statement)?;

        tracing::debug!(%url, content_type, "Submitting statement");

        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .header("Content-Type", content_type)
            .header("Accept", content_type)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();

        if status != StatusCode::OK {
            return Err(StatementError::Api {
                status: status.as_u16(),
                message: pretty_or_raw(&text),
            });
        }

        let body: serde_json::Value = serde_json::from_str(&text)?;
        Ok(StatementResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// Pretty-print a JSON body for logs, or return it untouched if it isn't JSON.
fn pretty_or_raw(text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or_else(|| text.to_string())
}
