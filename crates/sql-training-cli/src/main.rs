mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use sql_training_core::{find_lesson, lessons_for, Dataset, Query, LESSONS};
use sql_training_store_sqlite::{try_delete, Database, Pipeline, StageStore};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::{HarnessConfig, Overrides};

const CLI_CONTRACT_VERSION: &str = "sqlt.v1";
const LOG_ENV: &str = "SQLT_LOG";

#[derive(Debug, Parser)]
#[command(name = "sqlt")]
#[command(about = "SQL training harness: staged SQLite databases built from CSV datasets")]
struct Cli {
    /// YAML file with `data_dir`, `stage_dir` and `chunk_size`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding one folder of CSV files per dataset.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory for stage snapshots and manifests.
    #[arg(long, global = true)]
    stage_dir: Option<PathBuf>,

    /// Rows per multi-row insert statement.
    #[arg(long, global = true)]
    chunk_size: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Stage {
        #[command(subcommand)]
        command: StageCommand,
    },
    Lesson {
        #[command(subcommand)]
        command: LessonCommand,
    },
    /// Run a read-only statement against one stage snapshot.
    Query(QueryArgs),
    Db {
        #[command(subcommand)]
        command: DbCommand,
    },
}

#[derive(Debug, Subcommand)]
enum StageCommand {
    /// Build snapshots for every stage up to `--through` (default: the last one).
    Run(StageRunArgs),
    List(DatasetArgs),
}

#[derive(Debug, Subcommand)]
enum LessonCommand {
    List(LessonListArgs),
    Run(LessonRunArgs),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    Schema(DbSchemaArgs),
    IntegrityCheck(SnapshotArgs),
    /// Try deleting one row by id with foreign keys enforced.
    Delete(DbDeleteArgs),
}

#[derive(Debug, Args)]
struct DatasetArgs {
    #[arg(long, value_parser = parse_dataset)]
    dataset: Dataset,
}

#[derive(Debug, Args)]
struct StageRunArgs {
    #[arg(long, value_parser = parse_dataset)]
    dataset: Dataset,
    #[arg(long)]
    through: Option<u8>,
}

#[derive(Debug, Args)]
struct LessonListArgs {
    #[arg(long, value_parser = parse_dataset)]
    dataset: Option<Dataset>,
}

#[derive(Debug, Args)]
struct LessonRunArgs {
    #[arg(long)]
    id: String,
}

#[derive(Debug, Args)]
struct SnapshotArgs {
    #[arg(long, value_parser = parse_dataset)]
    dataset: Dataset,
    #[arg(long)]
    stage: u8,
}

#[derive(Debug, Args)]
struct QueryArgs {
    #[command(flatten)]
    snapshot: SnapshotArgs,
    #[arg(long)]
    sql: String,
}

#[derive(Debug, Args)]
struct DbSchemaArgs {
    #[command(flatten)]
    snapshot: SnapshotArgs,
    #[arg(long)]
    table: String,
}

#[derive(Debug, Args)]
struct DbDeleteArgs {
    #[command(flatten)]
    snapshot: SnapshotArgs,
    #[arg(long)]
    table: String,
    #[arg(long)]
    id: i64,
}

fn parse_dataset(value: &str) -> Result<Dataset, String> {
    Dataset::parse(value).map_err(|err| err.to_string())
}

fn with_contract_version(value: Value) -> Value {
    match value {
        Value::Object(mut object) => {
            object.insert(
                "contract_version".to_string(),
                Value::String(CLI_CONTRACT_VERSION.to_string()),
            );
            Value::Object(object)
        }
        other => json!({
            "contract_version": CLI_CONTRACT_VERSION,
            "payload": other
        }),
    }
}

fn emit_json(value: Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&with_contract_version(value))?);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = HarnessConfig::resolve(
        cli.config.as_deref(),
        Overrides { data_dir: cli.data_dir, stage_dir: cli.stage_dir, chunk_size: cli.chunk_size },
    )?;
    tracing::debug!(?config, "resolved configuration");
    let store = StageStore::new(&config.stage_dir);

    match cli.command {
        Command::Stage { command } => run_stage(command, &config, store),
        Command::Lesson { command } => run_lesson(command, &store),
        Command::Query(args) => run_query(&args, &store),
        Command::Db { command } => run_db(command, &store),
    }
}

fn run_stage(command: StageCommand, config: &HarnessConfig, store: StageStore) -> Result<()> {
    match command {
        StageCommand::Run(args) => {
            let through = args.through.unwrap_or_else(|| args.dataset.last_stage());
            let pipeline =
                Pipeline::new(store, &config.data_dir).with_chunk_size(config.chunk_size);
            let reports = pipeline.run_through(args.dataset, through)?;
            emit_json(json!({
                "dataset": args.dataset,
                "through": through,
                "data_dir": config.data_dir,
                "stage_dir": config.stage_dir,
                "stages": reports
            }))
        }
        StageCommand::List(args) => {
            let manifest = store.load_manifest(args.dataset)?;
            let stages = args
                .dataset
                .stages()
                .iter()
                .map(|stage| {
                    let entry = manifest.entry(stage.number);
                    json!({
                        "stage": stage.number,
                        "slug": stage.slug,
                        "title": stage.title,
                        "kind": stage.kind,
                        "completed": entry.is_some()
                            && store.has_snapshot(stage.dataset, stage.number),
                        "sha256": entry.map(|entry| entry.sha256.clone()),
                        "completed_at": entry.map(|entry| entry.completed_at.clone()),
                        "table_counts": entry.map(|entry| entry.table_counts.clone())
                    })
                })
                .collect::<Vec<_>>();
            emit_json(json!({
                "dataset": args.dataset,
                "stage_dir": store.root(),
                "stages": stages
            }))
        }
    }
}

fn run_lesson(command: LessonCommand, store: &StageStore) -> Result<()> {
    match command {
        LessonCommand::List(args) => {
            let lessons = match args.dataset {
                Some(dataset) => lessons_for(dataset).collect::<Vec<_>>(),
                None => LESSONS.iter().collect(),
            };
            emit_json(json!({
                "lessons": lessons
                    .iter()
                    .map(|lesson| json!({
                        "id": lesson.id,
                        "dataset": lesson.dataset,
                        "stage": lesson.stage,
                        "title": lesson.title,
                        "sql": lesson.sql.trim()
                    }))
                    .collect::<Vec<_>>()
            }))
        }
        LessonCommand::Run(args) => {
            let lesson = find_lesson(&args.id)?;
            let db = Database::open_snapshot_read_only(store, lesson.dataset, lesson.stage)?;
            let rows = db
                .select_multiple_rows(&lesson.query())
                .with_context(|| format!("lesson {} failed", lesson.id))?;
            emit_json(json!({
                "id": lesson.id,
                "dataset": lesson.dataset,
                "stage": lesson.stage,
                "title": lesson.title,
                "row_count": rows.len(),
                "rows": rows
            }))
        }
    }
}

fn run_query(args: &QueryArgs, store: &StageStore) -> Result<()> {
    let db = open_read_only(store, &args.snapshot)?;
    let rows = db.select_multiple_rows(&Query::new(args.sql.as_str()))?;
    emit_json(json!({
        "dataset": args.snapshot.dataset,
        "stage": args.snapshot.stage,
        "sql": args.sql,
        "row_count": rows.len(),
        "rows": rows
    }))
}

fn run_db(command: DbCommand, store: &StageStore) -> Result<()> {
    match command {
        DbCommand::Schema(args) => {
            let db = open_read_only(store, &args.snapshot)?;
            emit_json(json!({
                "dataset": args.snapshot.dataset,
                "stage": args.snapshot.stage,
                "table": args.table,
                "columns": db.table_info(&args.table)?,
                "indices": db.index_list(&args.table)?,
                "foreign_keys": db.foreign_key_list(&args.table)?
            }))
        }
        DbCommand::IntegrityCheck(args) => {
            let db = open_read_only(store, &args)?;
            let report = db.integrity_check()?;
            emit_json(json!({
                "dataset": args.dataset,
                "stage": args.stage,
                "foreign_keys_enabled": db.foreign_keys_enabled()?,
                "clean": report.is_clean(),
                "quick_check_ok": report.quick_check_ok,
                "quick_check_message": report.quick_check_message,
                "foreign_key_violations": report.foreign_key_violations
            }))
        }
        DbCommand::Delete(args) => {
            let mut db = open_checked(store, &args.snapshot)?;
            let outcome = try_delete(&mut db, &args.table, args.id)?;
            emit_json(json!({
                "dataset": args.snapshot.dataset,
                "stage": args.snapshot.stage,
                "table": args.table,
                "id": args.id,
                "result": outcome
            }))
        }
    }
}

fn open_checked(store: &StageStore, args: &SnapshotArgs) -> Result<Database> {
    args.dataset.stage(args.stage)?;
    Database::open_snapshot(store, args.dataset, args.stage)
}

fn open_read_only(store: &StageStore, args: &SnapshotArgs) -> Result<Database> {
    args.dataset.stage(args.stage)?;
    Database::open_snapshot_read_only(store, args.dataset, args.stage)
}
