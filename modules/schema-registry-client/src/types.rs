use serde::{Deserialize, Serialize};

/// Body of `POST /subjects/{subject}/versions`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterSchemaRequest {
    /// The schema definition, as a JSON-encoded string.
    pub schema: String,
    /// Omitted for Avro, which is the registry default.
    #[serde(rename = "schemaType", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterSchemaResponse {
    pub id: u32,
}

