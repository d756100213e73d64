//! tablegate CLI - interactive client and table admin commands
//!
//! Reads commands and sends them through the admission controller. Reads and
//! writes of tables are gated on the metadata cache; everything else goes
//! straight to storage.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tablegate_admission::{AdmissionController, GateError};
use tablegate_common::config::CacheBackend;
use tablegate_common::{Config, TableMetadata, TableName};
use tablegate_meta_store::{MemoryCache, MetadataAdapter, MetadataCache, RedbCache};
use tablegate_storage::MemoryEngine;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "tablegate-cli")]
#[command(about = "tablegate interactive client")]
#[command(version)]
struct Args {
    /// Configuration file path (TOML)
    #[arg(short, long, env = "TABLEGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive command loop (default)
    Shell,
    /// Run a single command and exit
    Exec {
        /// Command text
        #[arg(required = true, num_args = 1..)]
        command: Vec<String>,
    },
    /// Table metadata operations
    Table {
        #[command(subcommand)]
        action: TableCommands,
    },
}

#[derive(Subcommand, Debug)]
enum TableCommands {
    /// Show classification and content state
    Show {
        /// Table name
        name: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a metadata record
    Define {
        /// Table name
        name: String,
        /// Content is derived by the pipeline
        #[arg(long)]
        active: bool,
        /// Mark the table unavailable
        #[arg(long)]
        unavailable: bool,
        /// Upstream dependencies changed (active tables only)
        #[arg(long)]
        stale: bool,
    },
    /// Mark the table's content as settled
    Settle {
        /// Table name
        name: String,
    },
}

fn open_cache(config: &Config) -> Result<Arc<dyn MetadataCache>> {
    let cache: Arc<dyn MetadataCache> = match config.cache.backend {
        CacheBackend::Memory => Arc::new(MemoryCache::new(config.cache.name.clone())),
        CacheBackend::Redb => Arc::new(RedbCache::open(
            config.cache.name.clone(),
            &config.cache.path,
        )?),
    };
    info!("Using metadata cache '{}'", cache.name());
    Ok(cache)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load(args.config.as_deref())?;
    let cache = open_cache(&config)?;

    match args.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            let gate = gate(&config, cache);
            shell(&gate).await?;
        }
        Commands::Exec { command } => {
            let gate = gate(&config, cache);
            let rows = gate.handle(&command.join(" ")).await?;
            println!("{rows}");
        }
        Commands::Table { action } => table(MetadataAdapter::new(cache), action).await?,
    }

    info!("Finalizing...");
    Ok(())
}

fn gate(config: &Config, cache: Arc<dyn MetadataCache>) -> AdmissionController {
    // The bundled engine is in-process; the address names the column store
    // a networked engine would connect to
    info!(
        "Storage keyspace '{}' (column store endpoint {})",
        config.storage.keyspace, config.storage.address
    );
    let storage = Arc::new(MemoryEngine::new(config.storage.keyspace.clone()));
    AdmissionController::new(storage, cache, config.gate.clone())
}

const PROMPT: &str = "SELECT, INSERT, UPDATE and DELETE are gated, 'q' to quit";

async fn shell(gate: &AdmissionController) -> Result<()> {
    println!("---- tablegate client ----");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!("\n{PROMPT}");
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            break;
        }
        if line.is_empty() {
            continue;
        }

        match gate.handle(line).await {
            Ok(rows) => println!("{rows}"),
            Err(e) => println!("{}", describe(&e)),
        }
    }

    Ok(())
}

fn describe(err: &GateError) -> String {
    let hint = if err.is_retryable() { " (retry later)" } else { "" };
    match err {
        GateError::Rejected { table, reason } => {
            format!("rejected [{}] {}: {}{}", reason.code(), table, reason, hint)
        }
        e => format!("error: {e}{hint}"),
    }
}

async fn table(meta: MetadataAdapter, action: TableCommands) -> Result<()> {
    match action {
        TableCommands::Show { name, json } => {
            let name = TableName::new(name)?;
            let class = meta.classify(&name).await?;
            let content = meta.content_state(&name).await?;
            if json {
                let out = serde_json::json!({
                    "table": name.as_str(),
                    "class": class,
                    "content": content,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{name}: {class}, content {content}");
            }
        }
        TableCommands::Define {
            name,
            active,
            unavailable,
            stale,
        } => {
            let name = TableName::new(name)?;
            let record = match (active, stale) {
                (true, _) => TableMetadata::active(!unavailable, stale),
                (false, false) => TableMetadata::passive(!unavailable),
                (false, true) => bail!("--stale applies only to active tables"),
            };
            meta.put_metadata(&name, record).await?;
            println!("{name}: {}", meta.classify(&name).await?);
        }
        TableCommands::Settle { name } => {
            let name = TableName::new(name)?;
            meta.settle_content(&name).await?;
            println!("{name}: content {}", meta.content_state(&name).await?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default_to_shell() {
        let args = Args::try_parse_from(["tablegate-cli"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.log_level, "warn");
    }

    #[test]
    fn test_args_exec_joins_words() {
        let args =
            Args::try_parse_from(["tablegate-cli", "exec", "SELECT", "*", "FROM", "orders"])
                .unwrap();
        match args.command {
            Some(Commands::Exec { command }) => assert_eq!(command.join(" "), "SELECT * FROM orders"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_args_table_define() {
        let args = Args::try_parse_from([
            "tablegate-cli",
            "table",
            "define",
            "summary",
            "--active",
            "--stale",
        ])
        .unwrap();
        assert!(matches!(
            args.command,
            Some(Commands::Table {
                action: TableCommands::Define {
                    active: true,
                    stale: true,
                    unavailable: false,
                    ..
                }
            })
        ));
    }

    #[tokio::test]
    async fn test_define_and_settle_through_memory_cache() {
        let meta = MetadataAdapter::new(Arc::new(MemoryCache::default()));
        table(
            meta.clone(),
            TableCommands::Define {
                name: "summary".into(),
                active: true,
                unavailable: false,
                stale: false,
            },
        )
        .await
        .unwrap();
        table(
            meta.clone(),
            TableCommands::Settle {
                name: "summary".into(),
            },
        )
        .await
        .unwrap();

        let name = TableName::new("summary").unwrap();
        assert_eq!(
            meta.get_metadata(&name).await.unwrap(),
            Some(TableMetadata::active(true, false))
        );
        assert!(meta.content_state(&name).await.unwrap().is_present());
    }

    #[test]
    fn test_prompt_names_every_gated_verb() {
        for command in ["SELECT * FROM t", "INSERT INTO t VALUES (1)", "UPDATE t SET a = 1", "DELETE FROM t"] {
            let route = tablegate_admission::router::route(command).unwrap();
            let verb = command.split_whitespace().next().unwrap();
            assert_ne!(route, tablegate_admission::router::Route::Passthrough);
            assert!(PROMPT.contains(verb), "{verb} missing from prompt");
        }
    }

    #[tokio::test]
    async fn test_describe_marks_retryable_rejections() {
        let gate = AdmissionController::new(
            Arc::new(MemoryEngine::default()),
            Arc::new(MemoryCache::default()),
            Config::default().gate,
        );

        let err = gate.handle("SELECT * FROM orders").await.unwrap_err();
        assert_eq!(
            describe(&err),
            "rejected [ContentProcessing] orders: table content is processing (retry later)"
        );

        let err = gate.handle("SELECT *").await.unwrap_err();
        assert!(!describe(&err).ends_with("(retry later)"));
    }

    #[tokio::test]
    async fn test_define_rejects_stale_passive() {
        let meta = MetadataAdapter::new(Arc::new(MemoryCache::default()));
        let result = table(
            meta,
            TableCommands::Define {
                name: "orders".into(),
                active: false,
                unavailable: false,
                stale: true,
            },
        )
        .await;
        assert!(result.is_err());
    }
}
