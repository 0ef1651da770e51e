mod cli;

use std::fs;

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

use backplane::{connect, introspect};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let url = connect::parse_database_url(&cli.url)?;

    tracing::debug!("Connecting to database...");
    let pool = connect::connect(&url).await?;

    // The pool is scoped to this invocation; close it on every exit path.
    let result = run(&cli, &pool).await;
    pool.close().await;
    let output = result?;

    match cli.outfile {
        Some(ref path) => {
            fs::write(path, &output)?;
            tracing::info!("Output written to {path}");
        }
        None => {
            println!("{output}");
        }
    }

    Ok(())
}

async fn run(cli: &Cli, pool: &PgPool) -> Result<String> {
    if let Some((schema, table)) = cli.indexes_target()? {
        let indexes = introspect::pg::query_indexes(pool, &schema, &table).await?;
        tracing::debug!("Found {} indexes on {schema}.{table}", indexes.len());
        return to_json(&indexes, cli.pretty);
    }

    let graph = introspect::pg::introspect(pool, &cli.schema_list()).await?;
    graph.validate()?;
    tracing::debug!("Found {} tables/views", graph.nodes.len());
    to_json(&graph, cli.pretty)
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
