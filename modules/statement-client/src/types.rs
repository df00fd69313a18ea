use std::collections::BTreeMap;

use serde::Serialize;

/// Body of ksqlDB's `POST /ksql`.
#[derive(Debug, Clone, Serialize)]
pub struct KsqlRequest {
    pub ksql: String,
    #[serde(rename = "streamsProperties")]
    pub streams_properties: BTreeMap<String, String>,
}

/// Body of the managed cluster API's `POST .../ksql`.
#[derive(Debug, Clone, Serialize)]
pub struct CloudKsqlRequest {
    pub sql_string: String,
    pub properties: BTreeMap<String, String>,
}

/// A 200 reply from the statement endpoint.
#[derive(Debug, Clone)]
pub struct StatementResponse {
    pub status: u16,
    pub body: serde_json::Value,
}
