//! `viewstream` command line: stream the clickstream dataset into Kafka and
//! set up the streaming-SQL queries that read it.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "viewstream")]
#[command(about = "Clickstream producer and streaming query runner")]
#[command(version)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish every dataset row to Kafka as an Avro activity event
    Produce(cmd::produce::ProduceArgs),

    /// Submit streaming-SQL statements, one at a time
    Queries(cmd::queries::QueriesArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(cli.log_json) {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }

    if let Err(e) = run(cli.command).await {
        tracing::error!("{:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Produce(args) => cmd::produce::run(args).await,
        Commands::Queries(args) => cmd::queries::run(args).await,
    }
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("viewstream=info".parse()?)
        .add_directive("schema_registry_client=info".parse()?)
        .add_directive("statement_client=info".parse()?);

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use viewstream_common::QueryEndpointKind;

    #[test]
    fn produce_flags_parse() {
        let cli = Cli::try_parse_from([
            "viewstream",
            "produce",
            "--dataset",
            "/tmp/clicks.csv",
            "--delay-ms",
            "0",
            "--limit",
            "10",
            "--no-download",
        ])
        .unwrap();

        match cli.command {
            Commands::Produce(args) => {
                assert_eq!(args.dataset, Some(PathBuf::from("/tmp/clicks.csv")));
                assert_eq!(args.delay_ms, Some(0));
                assert_eq!(args.limit, Some(10));
                assert!(args.no_download);
                assert!(args.schema.is_none());
            }
            _ => panic!("expected produce"),
        }
    }

    #[test]
    fn queries_flags_parse() {
        let cli = Cli::try_parse_from([
            "viewstream",
            "--log-json",
            "queries",
            "--endpoint",
            "cloud",
            "--file",
            "a.sql",
            "--file",
            "b.sql",
            "--delay-secs",
            "1",
        ])
        .unwrap();

        assert!(cli.log_json);
        match cli.command {
            Commands::Queries(args) => {
                assert_eq!(args.endpoint, Some(QueryEndpointKind::Cloud));
                assert_eq!(args.files, vec![PathBuf::from("a.sql"), PathBuf::from("b.sql")]);
                assert_eq!(args.delay_secs, Some(1));
                assert!(args.dir.is_none());
            }
            _ => panic!("expected queries"),
        }
    }

    #[test]
    fn file_and_dir_conflict() {
        let parsed = Cli::try_parse_from([
            "viewstream",
            "queries",
            "--file",
            "a.sql",
            "--dir",
            "sql/",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn unknown_endpoint_is_rejected() {
        let parsed = Cli::try_parse_from(["viewstream", "queries", "--endpoint", "presto"]);
        assert!(parsed.is_err());
    }
}
