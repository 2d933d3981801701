use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ferry_cli::data::{render_json, render_plain};
use ferry_cli::{registry, Plan, Step};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Run contract-checked transformation pipelines
#[derive(Debug, Parser)]
#[command(name = "ferry", version, about)]
struct Cli {
    /// Log filter, overriding RUST_LOG (e.g. "debug", "ferry_pipeline=trace")
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a pipeline over an input
    Run(RunArgs),
    /// List built-in transformations and their signatures
    List,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Input as CSV ("1,2,3") or JSON ("[1,2,3]")
    #[arg(long)]
    input: Option<String>,

    /// Plan file (.toml or .json)
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Step as op:name or fold:init:name; replaces the plan's steps
    #[arg(long = "step", value_name = "STEP")]
    steps: Vec<Step>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref(), cli.log_json)?;

    match cli.command {
        Command::Run(args) => run(args),
        Command::List => {
            list();
            Ok(())
        }
    }
}

fn init_tracing(level: Option<&str>, json: bool) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).context("invalid --log-level")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
    Ok(())
}

fn run(args: RunArgs) -> Result<()> {
    let mut plan = match &args.plan {
        Some(path) => Plan::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Plan::default(),
    };
    if let Some(input) = args.input {
        plan = plan.with_input(input);
    }
    if !args.steps.is_empty() {
        plan = plan.with_steps(args.steps);
    }

    let value = plan.run(&registry())?;
    if args.json {
        println!("{}", serde_json::to_string(&render_json(&value)?)?);
    } else {
        println!("{}", render_plain(&value)?);
    }
    Ok(())
}

fn list() {
    let registry = registry();
    let width = registry.names().iter().map(|n| n.len()).max().unwrap_or(0);
    for (name, f) in registry.iter() {
        println!("{name:<width$}  {}", f.signature());
    }
}
