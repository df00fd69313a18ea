pub mod error;
pub mod types;

pub use error::{Result, SchemaRegistryError};
pub use types::{RegisterSchemaRequest, RegisterSchemaResponse};

use std::time::Duration;

const CONTENT_TYPE: &str = "application/vnd.schemaregistry.v1+json";

/// Subject a topic's value schema lives under (topic-name strategy).
pub fn value_subject(topic: &str) -> String {
    format!("{topic}-value")
}

pub struct SchemaRegistryClient {
    client: reqwest::Client,
    base_url: String,
    auth: Option<(String, String)>,
}

impl SchemaRegistryClient {
    pub fn new(base_url: &str, auth: Option<(String, String)>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Some((key, secret)) => req.basic_auth(key, Some(secret)),
            None => req,
        }
    }

    /// Register an Avro schema under `subject` and return its global id.
    /// Registering an identical schema again returns the existing id.
    pub async fn register_schema(&self, subject: &str, schema: &str) -> Result<u32> {
        let url = format!("{}/subjects/{}/versions", self.base_url, subject);
        let body = RegisterSchemaRequest {
            schema: schema.to_string(),
            schema_type: None,
        };

        let resp = self
            .authorize(self.client.post(&url))
            .header("Content-Type", CONTENT_TYPE)
            .header("Accept", CONTENT_TYPE)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SchemaRegistryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = resp.text().await?;
        let registered: RegisterSchemaResponse = serde_json::from_str(&text)?;
        tracing::info!(subject, schema_id = registered.id, "Schema registered");
        Ok(registered.id)
    }
}
