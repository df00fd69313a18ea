use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use statement_client::{Endpoint, StatementClient};
use viewstream_common::{load_env, QueryConfig, QueryEndpointConfig, QueryEndpointKind};
use viewstream_queries::{
    dispatch_all, DispatchOptions, QueryLoader, QuerySource, VariableSubstitutor,
};

#[derive(Args, Debug)]
pub struct QueriesArgs {
    /// Statement API to target: ksql or cloud (overrides QUERY_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<QueryEndpointKind>,

    /// Statement file, one statement per file (repeatable)
    #[arg(long = "file", conflicts_with = "dir")]
    pub files: Vec<PathBuf>,

    /// Directory of *.sql files, run in file name order
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Pause after each accepted statement (overrides QUERY_DELAY_SECS)
    #[arg(long)]
    pub delay_secs: Option<u64>,
}

pub async fn run(args: QueriesArgs) -> Result<()> {
    let vars = load_env();
    let kind = match args.endpoint {
        Some(kind) => kind,
        None => QueryEndpointKind::from_vars(&vars)?,
    };
    let config = QueryConfig::from_vars(&vars, kind)?;
    config.log_redacted();

    let source = query_source(&args);
    let statements = QueryLoader::load(&source)?;

    // Resolve every placeholder before the first request goes out.
    let statements = VariableSubstitutor::new(config.variables.clone()).apply_all(&statements)?;

    let client = statement_client(&config);
    let options = DispatchOptions {
        delay: args.delay_secs.map(Duration::from_secs).unwrap_or(config.delay),
    };

    let outcomes = dispatch_all(&statements, &client, &options).await;
    let accepted = outcomes.iter().filter(|ok| **ok).count();
    tracing::info!(
        total = outcomes.len(),
        accepted,
        "Finished executing all statements"
    );
    Ok(())
}

fn query_source(args: &QueriesArgs) -> QuerySource {
    if let Some(dir) = &args.dir {
        QuerySource::Dir(dir.clone())
    } else if !args.files.is_empty() {
        QuerySource::Files(args.files.clone())
    } else {
        QuerySource::BuiltIn
    }
}

fn statement_client(config: &QueryConfig) -> StatementClient {
    match &config.endpoint {
        QueryEndpointConfig::Ksql { endpoint, auth } => StatementClient::new(
            Endpoint::Ksql {
                base_url: endpoint.clone(),
            },
            auth.username.clone(),
            auth.password.clone(),
        ),
        QueryEndpointConfig::Cloud {
            api_url,
            cluster_id,
            auth,
        } => StatementClient::new(
            Endpoint::CloudKsql {
                base_url: api_url.clone(),
                cluster_id: cluster_id.clone(),
            },
            auth.username.clone(),
            auth.password.clone(),
        ),
    }
}
