//! lmn command-line interface.
//!
//! Two subcommands: `run` executes a program and reports its terminating
//! result, `check` only parses it and reports syntax errors.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser as ClapParser, Subcommand};
use lmn_core::{Program, VmConfig};
use lmn_runtime::{ExecutionResult, Vm};
use serde::Deserialize;

#[derive(ClapParser)]
#[command(name = "lmn")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run and inspect lmn state-transition scripts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a program and print its terminating result
    Run {
        /// Input .lmn source file
        input: PathBuf,

        /// TOML file of budget overrides, layered under the flags below
        #[arg(long)]
        config: Option<PathBuf>,

        /// Record a WITNESS trace in the result
        #[arg(long)]
        trace: bool,

        /// Maximum operations before TERM_OP_LIMIT
        #[arg(long)]
        max_ops: Option<u64>,

        /// Maximum stack depth before ERR_STACK_OVERFLOW
        #[arg(long)]
        max_stack: Option<usize>,

        /// Maximum SATURATE iterations before TERM_CYCLE_LIMIT
        #[arg(long)]
        max_saturate: Option<u64>,

        /// Maximum live bindings before ERR_BINDINGS_OVERFLOW
        #[arg(long)]
        max_bindings: Option<usize>,

        /// Print the result as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },

    /// Parse a program and report syntax errors without executing it
    Check {
        /// Input .lmn source file
        input: PathBuf,

        /// Print the parsed program tree as JSON
        #[arg(long)]
        dump_ast: bool,
    },
}

/// Budget overrides loadable from a TOML file; any field left unset falls
/// through to `VmConfig::default()` (and then to a matching CLI flag, which
/// takes precedence over both).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
struct FileConfig {
    max_operations: Option<u64>,
    max_stack_depth: Option<usize>,
    max_saturate_iterations: Option<u64>,
    max_bindings: Option<usize>,
    trace: Option<bool>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            config,
            trace,
            max_ops,
            max_stack,
            max_saturate,
            max_bindings,
            json,
        } => run_command(
            &input,
            config.as_deref(),
            trace,
            max_ops,
            max_stack,
            max_saturate,
            max_bindings,
            json,
        ),
        Commands::Check { input, dump_ast } => check_command(&input, dump_ast),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_command(
    input: &Path,
    config_path: Option<&Path>,
    trace: bool,
    max_ops: Option<u64>,
    max_stack: Option<usize>,
    max_saturate: Option<u64>,
    max_bindings: Option<usize>,
    json: bool,
) {
    let source = read_source(input);
    let program = parse_or_exit(&source, input);
    let config = build_config(
        config_path,
        trace,
        max_ops,
        max_stack,
        max_saturate,
        max_bindings,
    );

    let result = Vm::new(config).execute(&program);

    if json {
        print_json(&result);
    } else {
        print_human(&result);
    }

    process::exit(if result.is_success() { 0 } else { 1 });
}

fn check_command(input: &Path, dump_ast: bool) {
    let source = read_source(input);
    match lmn_compiler::parse_program(&source) {
        Ok(program) => {
            if dump_ast {
                print_ast(&program);
            } else {
                println!("OK: {} ({} phase(s))", input.display(), program.phases.len());
            }
        }
        Err(err) => {
            eprintln!("{}: {err}", input.display());
            process::exit(1);
        }
    }
}

fn read_source(input: &Path) -> String {
    fs::read_to_string(input).unwrap_or_else(|err| {
        eprintln!("error reading {}: {err}", input.display());
        process::exit(2);
    })
}

fn parse_or_exit(source: &str, input: &Path) -> Program {
    lmn_compiler::parse_program(source).unwrap_or_else(|err| {
        eprintln!("{}: {err}", input.display());
        process::exit(1);
    })
}

fn build_config(
    config_path: Option<&Path>,
    trace: bool,
    max_ops: Option<u64>,
    max_stack: Option<usize>,
    max_saturate: Option<u64>,
    max_bindings: Option<usize>,
) -> VmConfig {
    let mut config = VmConfig::default();

    if let Some(path) = config_path {
        let file = load_file_config(path);
        if let Some(v) = file.max_operations {
            config.max_operations = v;
        }
        if let Some(v) = file.max_stack_depth {
            config.max_stack_depth = v;
        }
        if let Some(v) = file.max_saturate_iterations {
            config.max_saturate_iterations = v;
        }
        if let Some(v) = file.max_bindings {
            config.max_bindings = v;
        }
        if let Some(v) = file.trace {
            config.trace_enabled = v;
        }
    }

    if let Some(v) = max_ops {
        config.max_operations = v;
    }
    if let Some(v) = max_stack {
        config.max_stack_depth = v;
    }
    if let Some(v) = max_saturate {
        config.max_saturate_iterations = v;
    }
    if let Some(v) = max_bindings {
        config.max_bindings = v;
    }
    if trace {
        config.trace_enabled = true;
    }

    config
}

fn load_file_config(path: &Path) -> FileConfig {
    let content = fs::read_to_string(path).unwrap_or_else(|err| {
        eprintln!("error reading config {}: {err}", path.display());
        process::exit(2);
    });
    toml::from_str(&content).unwrap_or_else(|err| {
        eprintln!("error parsing config {}: {err}", path.display());
        process::exit(2);
    })
}

fn print_human(result: &ExecutionResult) {
    println!("status: {}", result.status);
    println!("phases_executed: {}", result.phases_executed);
    println!("operations_executed: {}", result.operations_executed);
    println!("stack: {:?}", result.final_state.stack);
    println!(
        "bindings: {:?}",
        result.final_state.bindings.iter().collect::<Vec<_>>()
    );
    if let Some(msg) = &result.error_message {
        println!("error: {msg}");
    }
    for record in &result.trace {
        println!(
            "  witness[{}] phase={} stack={:?}",
            record.operation, record.phase, record.stack
        );
    }
}

fn print_json(result: &ExecutionResult) {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("error serializing result: {err}");
            process::exit(2);
        }
    }
}

fn print_ast(program: &Program) {
    match serde_json::to_string_pretty(program) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("error serializing program: {err}");
            process::exit(2);
        }
    }
}
