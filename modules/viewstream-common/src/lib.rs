pub mod config;
pub mod error;
pub mod types;

pub use config::{
    load_env, BasicAuth, EnvVars, IngestConfig, QueryConfig, QueryEndpointConfig,
    QueryEndpointKind,
};
pub use error::{Result, ViewstreamError};
pub use types::{ActivityEvent, VIEW_ACTIVITY};
