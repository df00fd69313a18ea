use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use schema_registry_client::{value_subject, SchemaRegistryClient};
use viewstream_common::{BasicAuth, IngestConfig};
use viewstream_ingest::dataset::kaggle_credentials_from_file;
use viewstream_ingest::{
    run_ingest, AvroEncoder, DatasetFetcher, DatasetLoader, IngestOptions, KafkaPublisher,
    KaggleFetcher, ACTIVITY_EVENT_SCHEMA,
};

#[derive(Args, Debug)]
pub struct ProduceArgs {
    /// CSV dataset path (overrides DATASET_PATH)
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// Avro schema file to register instead of the built-in one
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Pause between sends in milliseconds (overrides PUBLISH_DELAY_MS)
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Stop after this many rows
    #[arg(long)]
    pub limit: Option<usize>,

    /// Fail instead of downloading a missing dataset
    #[arg(long)]
    pub no_download: bool,
}

pub async fn run(args: ProduceArgs) -> Result<()> {
    let mut config = IngestConfig::from_env()?;
    if let Some(path) = args.dataset {
        config.dataset_path = path;
    }
    if let Some(ms) = args.delay_ms {
        config.publish_delay = Duration::from_millis(ms);
    }
    config.log_redacted();

    // Dataset before broker: a missing file fails without touching Kafka.
    let loader = DatasetLoader::new(&config.dataset_path);
    let fetcher = if args.no_download || loader.path().exists() {
        None
    } else {
        Some(kaggle_fetcher(&config)?)
    };
    loader
        .ensure_present(fetcher.as_ref().map(|f| f as &dyn DatasetFetcher))
        .await?;
    let rows = loader.load()?;

    let schema = match &args.schema {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading schema {}", path.display()))?,
        None => ACTIVITY_EVENT_SCHEMA.to_string(),
    };

    let registry = SchemaRegistryClient::new(
        &config.schema_registry_url,
        config
            .schema_registry_auth
            .as_ref()
            .map(|a| (a.username.clone(), a.password.clone())),
    )?;
    let subject = value_subject(&config.topic);
    let schema_id = registry
        .register_schema(&subject, &schema)
        .await
        .with_context(|| format!("registering schema under {subject}"))?;

    let encoder = AvroEncoder::new(&schema, schema_id)?;
    let publisher = KafkaPublisher::new(&config, encoder)?;

    let options = IngestOptions {
        delay: config.publish_delay,
        limit: args.limit,
    };
    let attempted = run_ingest(&rows, &publisher, &config.topic, &options).await;
    tracing::info!(attempted, "Producer finished");
    Ok(())
}

fn kaggle_fetcher(config: &IngestConfig) -> Result<KaggleFetcher> {
    let credentials = kaggle_credentials(config)?;
    Ok(KaggleFetcher::new(&config.kaggle_dataset, credentials)?)
}

/// Env credentials first, then `kaggle.json` in the Kaggle config dir.
fn kaggle_credentials(config: &IngestConfig) -> Result<BasicAuth> {
    if let Some(creds) = &config.kaggle_credentials {
        return Ok(creds.clone());
    }

    let path = config.kaggle_config_dir.join("kaggle.json");
    if !path.exists() {
        bail!(
            "{} is missing and no Kaggle credentials were found \
             (set KAGGLE_USERNAME and KAGGLE_KEY, or create {})",
            config.dataset_path.display(),
            path.display()
        );
    }
    Ok(kaggle_credentials_from_file(&path)?)
}
