use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, ViewstreamError};

const DEFAULT_DATASET_PATH: &str = "./data/vodclickstream_uk_movies_03.csv";
const DEFAULT_KAGGLE_DATASET: &str = "vodclickstream/netflix-audience-behaviour-uk-movies";
const DEFAULT_SECURITY_PROTOCOL: &str = "SASL_SSL";
const DEFAULT_SASL_MECHANISMS: &str = "PLAIN";
const DEFAULT_PUBLISH_DELAY_MS: u64 = 100;
const DEFAULT_QUERY_DELAY_SECS: u64 = 5;
const DEFAULT_CLOUD_API_URL: &str = "https://api.confluent.cloud";

/// Snapshot of the process environment, taken once at startup.
pub type EnvVars = HashMap<String, String>;

/// Load `.env` (if any) and snapshot the process environment.
pub fn load_env() -> EnvVars {
    dotenvy::dotenv().ok();
    std::env::vars().collect()
}

/// Username/password pair used for SASL, HTTP basic auth and Kaggle.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// Configuration for the `produce` flow: broker, schema registry, dataset.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    // Kafka
    pub bootstrap_servers: String,
    pub topic: String,
    pub security_protocol: String,
    pub sasl_mechanisms: String,
    pub sasl_credentials: Option<BasicAuth>,

    // Schema registry
    pub schema_registry_url: String,
    pub schema_registry_auth: Option<BasicAuth>,

    // Dataset
    pub dataset_path: PathBuf,
    pub kaggle_dataset: String,
    pub kaggle_credentials: Option<BasicAuth>,
    /// Directory holding `kaggle.json`, used when the env credentials are unset.
    pub kaggle_config_dir: PathBuf,

    // Pacing
    pub publish_delay: Duration,
}

impl IngestConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(&load_env())
    }

    /// Build from an environment snapshot. Fails on the first missing
    /// required variable, before anything touches the network.
    pub fn from_vars(vars: &EnvVars) -> Result<Self> {
        let bootstrap_servers = required(vars, "BOOTSTRAP_SERVERS")?;
        let topic = required(vars, "KAFKA_TOPIC")?;
        let schema_registry_url = required(vars, "SCHEMA_REGISTRY_URL")?;

        let security_protocol = optional(vars, "SECURITY_PROTOCOL")
            .unwrap_or_else(|| DEFAULT_SECURITY_PROTOCOL.to_string());
        let sasl_mechanisms = optional(vars, "SASL_MECHANISMS")
            .unwrap_or_else(|| DEFAULT_SASL_MECHANISMS.to_string());

        let sasl_credentials = if security_protocol.to_ascii_uppercase().starts_with("SASL") {
            Some(BasicAuth::new(
                required(vars, "SASL_USERNAME")?,
                required(vars, "SASL_PASSWORD")?,
            ))
        } else {
            None
        };

        Ok(Self {
            bootstrap_servers,
            topic,
            security_protocol,
            sasl_mechanisms,
            sasl_credentials,
            schema_registry_url,
            schema_registry_auth: optional_pair(
                vars,
                "SCHEMA_REGISTRY_API_KEY",
                "SCHEMA_REGISTRY_API_SECRET",
            )?,
            dataset_path: optional(vars, "DATASET_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH)),
            kaggle_dataset: optional(vars, "KAGGLE_DATASET")
                .unwrap_or_else(|| DEFAULT_KAGGLE_DATASET.to_string()),
            kaggle_credentials: optional_pair(vars, "KAGGLE_USERNAME", "KAGGLE_KEY")?,
            kaggle_config_dir: optional(vars, "KAGGLE_CONFIG_DIR")
                .map(PathBuf::from)
                .or_else(|| optional(vars, "HOME").map(|h| PathBuf::from(h).join(".kaggle")))
                .unwrap_or_else(|| PathBuf::from(".kaggle")),
            publish_delay: Duration::from_millis(parse_or(
                vars,
                "PUBLISH_DELAY_MS",
                DEFAULT_PUBLISH_DELAY_MS,
            )?),
        })
    }

    pub fn log_redacted(&self) {
        tracing::info!("Ingest config loaded:");
        tracing::info!("  BOOTSTRAP_SERVERS: {}", self.bootstrap_servers);
        tracing::info!("  KAFKA_TOPIC: {}", self.topic);
        tracing::info!("  SECURITY_PROTOCOL: {}", self.security_protocol);
        tracing::info!("  SASL_USERNAME: {}", preview_auth(&self.sasl_credentials));
        tracing::info!("  SCHEMA_REGISTRY_URL: {}", self.schema_registry_url);
        tracing::info!(
            "  SCHEMA_REGISTRY_API_KEY: {}",
            preview_auth(&self.schema_registry_auth)
        );
        tracing::info!("  DATASET_PATH: {}", self.dataset_path.display());
    }
}

// ---------------------------------------------------------------------------
// Query dispatch
// ---------------------------------------------------------------------------

/// Which remote statement API the queries are sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryEndpointKind {
    #[default]
    Ksql,
    /// Managed ksqlDB cluster behind the cloud API.
    Cloud,
}

impl FromStr for QueryEndpointKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ksql" | "ksqldb" => Ok(Self::Ksql),
            "cloud" | "cluster" | "confluent" => Ok(Self::Cloud),
            other => Err(format!("unknown query endpoint '{other}' (expected 'ksql' or 'cloud')")),
        }
    }
}

impl QueryEndpointKind {
    /// `QUERY_ENDPOINT` from the snapshot, defaulting to `ksql`.
    pub fn from_vars(vars: &EnvVars) -> Result<Self> {
        match optional(vars, "QUERY_ENDPOINT") {
            Some(raw) => raw.parse().map_err(|message| ViewstreamError::InvalidEnv {
                name: "QUERY_ENDPOINT".to_string(),
                message,
            }),
            None => Ok(Self::default()),
        }
    }
}

impl fmt::Display for QueryEndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ksql => write!(f, "ksql"),
            Self::Cloud => write!(f, "cloud"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum QueryEndpointConfig {
    Ksql {
        endpoint: String,
        auth: BasicAuth,
    },
    Cloud {
        api_url: String,
        cluster_id: String,
        auth: BasicAuth,
    },
}

/// Configuration for the `queries` flow.
#[derive(Clone)]
pub struct QueryConfig {
    pub endpoint: QueryEndpointConfig,
    pub delay: Duration,
    /// Values for `${NAME}` placeholders and the bare connection tokens.
    pub variables: EnvVars,
}

impl QueryConfig {
    pub fn from_vars(vars: &EnvVars, kind: QueryEndpointKind) -> Result<Self> {
        let endpoint = match kind {
            QueryEndpointKind::Ksql => QueryEndpointConfig::Ksql {
                endpoint: required(vars, "KSQLDB_ENDPOINT")?,
                auth: BasicAuth::new(
                    required(vars, "KSQLDB_API_KEY")?,
                    required(vars, "KSQLDB_API_SECRET")?,
                ),
            },
            QueryEndpointKind::Cloud => QueryEndpointConfig::Cloud {
                api_url: optional(vars, "CONFLUENT_API_URL")
                    .unwrap_or_else(|| DEFAULT_CLOUD_API_URL.to_string()),
                cluster_id: required(vars, "CONFLUENT_CLUSTER_ID")?,
                auth: BasicAuth::new(
                    required(vars, "CONFLUENT_API_KEY")?,
                    required(vars, "CONFLUENT_API_SECRET")?,
                ),
            },
        };

        Ok(Self {
            endpoint,
            delay: Duration::from_secs(parse_or(
                vars,
                "QUERY_DELAY_SECS",
                DEFAULT_QUERY_DELAY_SECS,
            )?),
            variables: vars.clone(),
        })
    }

    pub fn kind(&self) -> QueryEndpointKind {
        match self.endpoint {
            QueryEndpointConfig::Ksql { .. } => QueryEndpointKind::Ksql,
            QueryEndpointConfig::Cloud { .. } => QueryEndpointKind::Cloud,
        }
    }

    pub fn log_redacted(&self) {
        tracing::info!("Query config loaded:");
        tracing::info!("  QUERY_ENDPOINT: {}", self.kind());
        match &self.endpoint {
            QueryEndpointConfig::Ksql { endpoint, auth } => {
                tracing::info!("  KSQLDB_ENDPOINT: {endpoint}");
                tracing::info!("  KSQLDB_API_KEY: {}", preview(&auth.username));
            }
            QueryEndpointConfig::Cloud {
                api_url,
                cluster_id,
                auth,
            } => {
                tracing::info!("  CONFLUENT_API_URL: {api_url}");
                tracing::info!("  CONFLUENT_CLUSTER_ID: {cluster_id}");
                tracing::info!("  CONFLUENT_API_KEY: {}", preview(&auth.username));
            }
        }
    }
}

impl fmt::Debug for QueryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryConfig")
            .field("endpoint", &self.endpoint)
            .field("delay", &self.delay)
            .field("variables", &self.variables.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Empty values count as unset.
fn optional(vars: &EnvVars, key: &str) -> Option<String> {
    vars.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn required(vars: &EnvVars, key: &str) -> Result<String> {
    optional(vars, key).ok_or_else(|| ViewstreamError::MissingEnv(key.to_string()))
}

/// Both halves of a credential pair, or neither.
fn optional_pair(vars: &EnvVars, user_key: &str, pass_key: &str) -> Result<Option<BasicAuth>> {
    match (optional(vars, user_key), optional(vars, pass_key)) {
        (Some(user), Some(pass)) => Ok(Some(BasicAuth::new(user, pass))),
        (None, None) => Ok(None),
        (Some(_), None) => Err(ViewstreamError::MissingEnv(pass_key.to_string())),
        (None, Some(_)) => Err(ViewstreamError::MissingEnv(user_key.to_string())),
    }
}

fn parse_or(vars: &EnvVars, key: &str, default: u64) -> Result<u64> {
    match optional(vars, key) {
        Some(raw) => raw.parse().map_err(|_| ViewstreamError::InvalidEnv {
            name: key.to_string(),
            message: format!("expected a non-negative integer, got '{raw}'"),
        }),
        None => Ok(default),
    }
}

fn preview(val: &str) -> String {
    let n = val.chars().take(5).map(char::len_utf8).sum::<usize>();
    format!("{}...({} chars)", &val[..n], val.chars().count())
}

fn preview_auth(auth: &Option<BasicAuth>) -> String {
    match auth {
        Some(a) => preview(&a.username),
        None => "<not set>".to_string(),
    }
}
