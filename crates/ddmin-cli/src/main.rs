mod config;
mod elements;
mod logging;
mod oracle;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use config::OracleConfig;
use ddmin_core::{reduce, reduce_parallel, Outcome, Status};
use oracle::{CommandOracle, InteractiveOracle};
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "ddmin")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long, value_enum, default_value = "json", global = true)]
    format: OutputFormat,

    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[arg(long, default_value_t = 1, global = true)]
    jobs: usize,

    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    Reduce(OracleArgs),
    Check(OracleArgs),
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("oracle_source")
        .required(true)
        .args(["interactive", "oracle", "cmd"])
))]
struct OracleArgs {
    elements: PathBuf,

    #[arg(long)]
    interactive: bool,

    #[arg(long, value_name = "FILE")]
    oracle: Option<PathBuf>,

    #[arg(last = true, value_name = "CMD")]
    cmd: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

enum OracleSource {
    Interactive,
    Command(OracleConfig),
}

impl OracleSource {
    fn from_args(args: &OracleArgs) -> Result<Self> {
        if args.interactive {
            return Ok(OracleSource::Interactive);
        }
        if let Some(path) = &args.oracle {
            return Ok(OracleSource::Command(OracleConfig::load(path)?));
        }
        Ok(OracleSource::Command(OracleConfig::from_command(
            args.cmd.clone(),
        )?))
    }

    fn label(&self) -> &'static str {
        match self {
            OracleSource::Interactive => "interactive",
            OracleSource::Command(_) => "command",
        }
    }
}

#[derive(Serialize)]
struct ResultJson {
    schema_version: String,
    tool: ToolInfo,
    invocation: Invocation,
    inputs: Vec<InputInfo>,
    status: Status,
    exit_code: i32,
    started_at: String,
    finished_at: String,
    duration_ms: u64,
    reduction: Option<ReductionJson>,
}

#[derive(Serialize)]
struct ToolInfo {
    name: String,
    version: String,
    git_sha: String,
}

#[derive(Serialize)]
struct Invocation {
    command: String,
    elements_file: String,
    oracle: String,
    format: String,
    timeout_ms: Option<u64>,
    jobs: usize,
}

#[derive(Serialize)]
struct InputInfo {
    path: String,
    sha256: String,
}

#[derive(Serialize)]
struct ReductionJson {
    original_len: usize,
    minimized_len: usize,
    elements: Vec<String>,
    stats: StatsJson,
}

#[derive(Serialize)]
struct StatsJson {
    oracle_calls: u64,
    rounds: u64,
    timeouts: u64,
}

struct Execution {
    status: Status,
    reduction: Option<ReductionJson>,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref());
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("tool error: {err:#}");
            2
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    if cli.jobs == 0 {
        anyhow::bail!("--jobs must be >= 1");
    }
    let started_at = Utc::now();
    let timer = Instant::now();

    let (command, args) = match &cli.command {
        Command::Reduce(args) => ("reduce", args),
        Command::Check(args) => ("check", args),
    };
    let input = elements::load(&args.elements)?;
    let source = OracleSource::from_args(args)?;
    info!(
        command,
        elements = input.elements.len(),
        oracle = source.label(),
        "starting"
    );

    let invocation = Invocation {
        command: command.to_string(),
        elements_file: args.elements.to_string_lossy().to_string(),
        oracle: source.label().to_string(),
        format: match cli.format {
            OutputFormat::Json => "json".to_string(),
            OutputFormat::Text => "text".to_string(),
        },
        timeout_ms: cli.timeout_ms,
        jobs: cli.jobs,
    };
    let inputs = vec![InputInfo {
        path: args.elements.to_string_lossy().to_string(),
        sha256: input.sha256,
    }];

    let execution = match &cli.command {
        Command::Reduce(_) => execute_reduce(input.elements, source, &cli)?,
        Command::Check(_) => execute_check(&input.elements, source, &cli)?,
    };
    let exit_code = exit_code_for(&execution.status);

    let finished_at = Utc::now();
    let duration_ms = timer.elapsed().as_millis() as u64;

    let result = ResultJson {
        schema_version: "0.1".to_string(),
        tool: ToolInfo {
            name: "ddmin".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            git_sha: std::env::var("DDMIN_GIT_SHA").unwrap_or_else(|_| "UNKNOWN".to_string()),
        },
        invocation,
        inputs,
        status: execution.status,
        exit_code,
        started_at: started_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        finished_at: finished_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        duration_ms,
        reduction: execution.reduction,
    };

    match cli.format {
        OutputFormat::Json => emit_json(&result, cli.output.as_deref()),
        OutputFormat::Text => emit_text(&result, cli.output.as_deref()),
    }?;

    Ok(exit_code)
}

fn execute_reduce(elements: Vec<String>, source: OracleSource, cli: &Cli) -> Result<Execution> {
    let (outcome, timeouts) = match source {
        OracleSource::Interactive => {
            if cli.jobs > 1 {
                warn!(jobs = cli.jobs, "interactive oracle runs sequentially");
            }
            let stdin = io::stdin();
            let mut oracle = InteractiveOracle::new(stdin.lock(), io::stderr());
            let outcome = reduce(elements, |candidate| oracle.test(candidate))?;
            (outcome, 0)
        }
        OracleSource::Command(config) => {
            let oracle = CommandOracle::new(config, cli.timeout_ms);
            let outcome = if cli.jobs == 1 {
                reduce(elements, |candidate| oracle.test(candidate))?
            } else {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(cli.jobs)
                    .build()
                    .context("build thread pool")?;
                reduce_parallel(elements, |candidate| oracle.test(candidate), &pool)?
            };
            (outcome, oracle.timeouts())
        }
    };

    let status = outcome.status();
    info!(
        status = status.as_str(),
        oracle_calls = outcome.oracle_calls(),
        timeouts,
        "reduction finished"
    );
    let reduction = match outcome {
        Outcome::NothingToReduce { .. } => None,
        Outcome::Reduced(reduction) => Some(ReductionJson {
            original_len: reduction.original_len,
            minimized_len: reduction.minimized_len(),
            stats: StatsJson {
                oracle_calls: reduction.stats.oracle_calls,
                rounds: reduction.stats.rounds,
                timeouts,
            },
            elements: reduction.into_elements(),
        }),
    };
    Ok(Execution { status, reduction })
}

fn execute_check(elements: &[String], source: OracleSource, cli: &Cli) -> Result<Execution> {
    let reproduces = match source {
        OracleSource::Interactive => {
            let stdin = io::stdin();
            InteractiveOracle::new(stdin.lock(), io::stderr()).test(elements)?
        }
        OracleSource::Command(config) => CommandOracle::new(config, cli.timeout_ms).test(elements)?,
    };
    let status = if reproduces {
        Status::Reproduces
    } else {
        Status::NothingToReduce
    };
    Ok(Execution {
        status,
        reduction: None,
    })
}

fn exit_code_for(status: &Status) -> i32 {
    match status {
        Status::Reduced | Status::AlreadyMinimal | Status::Reproduces => 0,
        Status::NothingToReduce => 1,
    }
}

pub(crate) fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

fn emit_json(result: &ResultJson, output: Option<&Path>) -> Result<()> {
    let payload = serde_json::to_string_pretty(result).context("serialize result json")?;
    if let Some(path) = output {
        write_atomic(path, payload.as_bytes())?;
        return Ok(());
    }

    println!("{payload}");
    Ok(())
}

fn emit_text(result: &ResultJson, output: Option<&Path>) -> Result<()> {
    let mut summary = format!(
        "status={} exit_code={}",
        result.status.as_str(),
        result.exit_code
    );
    if let Some(reduction) = &result.reduction {
        summary.push_str(&format!(
            "\nminimal failing set ({} of {}):",
            reduction.minimized_len, reduction.original_len
        ));
        for element in &reduction.elements {
            summary.push_str(&format!("\n  {element}"));
        }
    }
    if let Some(path) = output {
        write_atomic(path, summary.as_bytes())?;
        return Ok(());
    }
    println!("{summary}");
    Ok(())
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, contents).with_context(|| format!("write {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("rename {}", path.display()))?;
    Ok(())
}
