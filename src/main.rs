//! actconf - compile action records into simulator configs
//!
//! Reads the table dumps under `--data`, compiles the requested entities
//! and writes one JSON config per entity (grouped per element for dragons)
//! under `--out`. Single actions are printed to stdout.

use action_timeline::core::{CompilerConfig, Result};
use action_timeline::export::{
    compile_action, compile_entity, export_kind, ActionTarget, EntityKind, ExportReport,
};
use action_timeline::records::RecordStore;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "actconf")]
#[command(about = "Compile combat action records into timing and effect configs")]
struct Args {
    /// Directory holding one `<Table>.json` dump per table
    #[arg(long, global = true, default_value = "data/records")]
    data: PathBuf,

    /// Output directory for exported configs
    #[arg(long, global = true, default_value = "out")]
    out: PathBuf,

    /// Compiler config (TOML); defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export adventurers, or print one by id
    Adv { id: Option<u64> },
    /// Export dragons, or print one by id
    Drg { id: Option<u64> },
    /// Export weapon-type bases, or print one by id
    Base { id: Option<u64> },
    /// Print one compiled skill
    Skill {
        id: u64,
        #[arg(long, short = 'l', default_value_t = 1)]
        level: u32,
    },
    /// Print one compiled burst (force strike) action
    Fs { id: u64 },
    /// Print one compiled combo hit
    Combo { id: u64 },
    /// Export every kind
    All,
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn export(
    kinds: &[EntityKind],
    store: &RecordStore,
    config: &CompilerConfig,
    out: &Path,
) -> Result<ExportReport> {
    let mut report = ExportReport::default();
    for &kind in kinds {
        report.merge(export_kind(kind, store, config, out)?);
    }
    for line in &report.missing_endlag {
        tracing::warn!("Missing endlag: {}", line);
    }
    Ok(report)
}

fn run(args: Args) -> Result<bool> {
    let config = match &args.config {
        Some(path) => CompilerConfig::load(path)?,
        None => CompilerConfig::default(),
    };
    let store = RecordStore::from_dir(&args.data)?;

    let (kind, id) = match args.command {
        Command::Adv { id } => (EntityKind::Adventurer, id),
        Command::Drg { id } => (EntityKind::Dragon, id),
        Command::Base { id } => (EntityKind::Base, id),
        Command::Skill { id, level } => {
            let slots = compile_action(ActionTarget::Skill { id, level }, &store, &config)?;
            print_json(&Value::Object(slots))?;
            return Ok(true);
        }
        Command::Fs { id } => {
            let slots = compile_action(ActionTarget::Burst { id }, &store, &config)?;
            print_json(&Value::Object(slots))?;
            return Ok(true);
        }
        Command::Combo { id } => {
            let slots = compile_action(ActionTarget::Combo { id }, &store, &config)?;
            print_json(&Value::Object(slots))?;
            return Ok(true);
        }
        Command::All => {
            let report = export(&EntityKind::ALL, &store, &config, &args.out)?;
            return Ok(report.is_clean());
        }
    };

    match id {
        Some(id) => {
            let output = compile_entity(kind, &store, &config, id)?;
            for slot in &output.missing_endlag {
                tracing::warn!("Missing endlag: {}: {}", output.name, slot);
            }
            let mut wrapped = serde_json::Map::new();
            wrapped.insert(output.name, Value::Object(output.slots));
            print_json(&Value::Object(wrapped))?;
            Ok(true)
        }
        None => Ok(export(&[kind], &store, &config, &args.out)?.is_clean()),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("action_timeline=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            tracing::error!("Some entities failed to compile");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
