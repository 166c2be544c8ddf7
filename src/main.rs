//! seshat CLI: build and inspect worlds-to-queries supervision tables.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use seshat::config::TaskConfig;
use seshat::ledger::{LedgerSchema, RunLedger};
use seshat::program::{annotated_disjunctions, compose_program, Mode, ADDITION_RULES};
use seshat::task::{Task, TaskParams};

#[derive(Parser)]
#[command(name = "seshat", version, about = "Worlds-to-queries supervision tables")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every task with its default table shape.
    Tasks,

    /// Build a task's table bundle and print a summary or export it as JSON.
    Build {
        /// Task name (see `seshat tasks`).
        #[arg(long, conflicts_with = "config")]
        task: Option<String>,

        /// TOML task config instead of command-line parameters.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of digit positions (arithmetic tasks).
        #[arg(long, default_value = "2")]
        len: usize,

        /// Digit domain size (arithmetic tasks).
        #[arg(long, default_value = "10")]
        digits: usize,

        /// Latent attribute count (Kandinsky tasks).
        #[arg(long, default_value = "6")]
        concepts: usize,

        /// Attribute domain size (Kandinsky tasks).
        #[arg(long, default_value = "3")]
        values: usize,

        /// Write the bundle as JSON to this path.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Show one world's query-weight row.
    Inspect {
        /// Task name.
        #[arg(long)]
        task: String,

        /// World tuple, comma-separated (e.g. "3,4").
        #[arg(long)]
        world: String,

        #[arg(long, default_value = "2")]
        len: usize,

        #[arg(long, default_value = "10")]
        digits: usize,

        #[arg(long, default_value = "6")]
        concepts: usize,

        #[arg(long, default_value = "3")]
        values: usize,
    },

    /// Render the templated logic program for an addition label.
    Program {
        /// Number of digit positions.
        #[arg(long, default_value = "2")]
        len: usize,

        /// Digit domain size.
        #[arg(long, default_value = "10")]
        digits: usize,

        /// Target label (digit sum).
        #[arg(long)]
        label: usize,

        /// "query" or "evidence".
        #[arg(long, default_value = "query")]
        mode: String,

        /// Also query the joint digit assignment.
        #[arg(long)]
        digit_query: bool,
    },

    /// Experiment run-ledger operations.
    Ledger {
        #[command(subcommand)]
        action: LedgerAction,
    },
}

#[derive(Subcommand)]
enum LedgerAction {
    /// Check how many runs remain for a hyperparameter configuration.
    Plan {
        /// Experiment root directory.
        #[arg(long)]
        dir: PathBuf,

        /// Experiment class (names the CSV file).
        #[arg(long)]
        class: String,

        /// Required run count per configuration.
        #[arg(long, default_value = "1")]
        runs: usize,

        /// Hyperparameters as comma-separated key=value pairs.
        #[arg(long)]
        params: String,

        /// Metric column names the ledger carries, comma-separated.
        #[arg(long, default_value = "")]
        metrics: String,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Tasks => cmd_tasks(),
        Commands::Build {
            task,
            config,
            len,
            digits,
            concepts,
            values,
            out,
        } => cmd_build(task, config, len, digits, concepts, values, out),
        Commands::Inspect {
            task,
            world,
            len,
            digits,
            concepts,
            values,
        } => cmd_inspect(&task, &world, len, digits, concepts, values),
        Commands::Program {
            len,
            digits,
            label,
            mode,
            digit_query,
        } => cmd_program(len, digits, label, &mode, digit_query),
        Commands::Ledger {
            action: LedgerAction::Plan {
                dir,
                class,
                runs,
                params,
                metrics,
            },
        } => cmd_ledger_plan(&dir, class, runs, &params, &metrics),
    }
}

fn default_params_for(task: Task) -> TaskParams {
    // Shapes the fixed-arity tasks decode; everything else takes the defaults.
    match task {
        Task::Xor => TaskParams {
            sequence_len: 4,
            n_digits: 2,
            ..Default::default()
        },
        Task::MnmathSum | Task::MnmathProd => TaskParams {
            sequence_len: 4,
            n_digits: 4,
            ..Default::default()
        },
        Task::MultiOp => TaskParams {
            sequence_len: 2,
            n_digits: 4,
            ..Default::default()
        },
        Task::Base => TaskParams {
            n_concepts: 8,
            ..Default::default()
        },
        _ => TaskParams::default(),
    }
}

fn cmd_tasks() -> Result<()> {
    println!("{:<24} {:>8} {:>8}  gates", "task", "worlds", "queries");
    for task in Task::ALL {
        let bundle = task.build(&default_params_for(task))?;
        let (worlds, queries) = bundle.worlds_queries.shape();
        let gates: Vec<&str> = bundle.gates.iter().map(|g| g.name).collect();
        println!(
            "{:<24} {:>8} {:>8}  {}",
            task.name(),
            worlds,
            queries,
            if gates.is_empty() {
                "-".to_string()
            } else {
                gates.join(", ")
            }
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_build(
    task: Option<String>,
    config: Option<PathBuf>,
    len: usize,
    digits: usize,
    concepts: usize,
    values: usize,
    out: Option<PathBuf>,
) -> Result<()> {
    let (task, params, out) = match (task, config) {
        (_, Some(path)) => {
            let cfg = TaskConfig::load(&path)?;
            (cfg.task()?, cfg.params(), out.or(cfg.out.clone()))
        }
        (Some(name), None) => {
            let params = TaskParams {
                sequence_len: len,
                n_digits: digits,
                n_concepts: concepts,
                n_values: values,
            };
            (Task::parse(&name)?, params, out)
        }
        (None, None) => {
            return Err(miette::miette!(
                "pass either --task <name> or --config <file>"
            ));
        }
    };

    let bundle = task.build(&params)?;
    let wq = &bundle.worlds_queries;
    let (worlds, queries) = wq.shape();
    println!("task:      {task}");
    println!("shape:     {worlds} worlds x {queries} queries");
    println!("mass:      {}", wq.total_mass());
    println!("zero rows: {}", wq.zero_rows());
    for gate in &bundle.gates {
        let (gw, gq) = gate.matrix.shape();
        println!("gate:      {} ({gw} x {gq})", gate.name);
    }

    if let Some(path) = out {
        let json = serde_json::to_string_pretty(&bundle).into_diagnostic()?;
        std::fs::write(&path, json).into_diagnostic()?;
        println!("wrote:     {}", path.display());
    }
    Ok(())
}

fn cmd_inspect(
    task: &str,
    world: &str,
    len: usize,
    digits: usize,
    concepts: usize,
    values: usize,
) -> Result<()> {
    let task = Task::parse(task)?;
    let params = TaskParams {
        sequence_len: len,
        n_digits: digits,
        n_concepts: concepts,
        n_values: values,
    };
    let bundle = task.build(&params)?;
    let wq = &bundle.worlds_queries;

    let tuple: Vec<u8> = world
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<std::result::Result<_, _>>()
        .into_diagnostic()?;

    let space = task.world_space(&params)?;
    let index = space.index_of(&tuple)?;

    println!("world {tuple:?} -> index {index}");
    println!("row: {:?}", wq.row(index));
    Ok(())
}

fn cmd_program(len: usize, digits: usize, label: usize, mode: &str, digit_query: bool) -> Result<()> {
    let mode = match mode {
        "query" => Mode::Query,
        "evidence" => Mode::Evidence,
        other => return Err(miette::miette!("mode must be query or evidence, got \"{other}\"")),
    };
    let facts = annotated_disjunctions(len, digits);
    let digit_query = digit_query.then_some("digits(X,Y)");
    let program = compose_program(&facts, ADDITION_RULES, label, digit_query, mode);
    println!("{program}");
    Ok(())
}

fn cmd_ledger_plan(
    dir: &std::path::Path,
    class: String,
    runs: usize,
    params: &str,
    metrics: &str,
) -> Result<()> {
    let mut columns = Vec::new();
    let mut values = Vec::new();
    for pair in params.split(',').filter(|p| !p.trim().is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| miette::miette!("expected key=value, got \"{pair}\""))?;
        columns.push(key.trim().to_string());
        values.push(value.trim().to_string());
    }

    let metric_columns: Vec<String> = metrics
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
        .collect();

    let ledger = RunLedger::open(
        dir,
        LedgerSchema {
            class,
            param_columns: columns,
            metric_columns,
        },
    )?;
    let plan = ledger.plan_run(&values, runs)?;

    println!("exp_ID:    {}", plan.exp_id);
    println!("remaining: {}", plan.remaining);
    match plan.run_id {
        Some(run_id) => println!("run_ID:    {run_id}"),
        None => println!("run_ID:    - (all runs already executed)"),
    }
    Ok(())
}
