use clap::{Parser, Subcommand, ValueEnum};
use kaiwa::error::ErrorCategory;
use kaiwa::prelude::*;
use kaiwa::variables::{self, system_variables};
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Which shape the input graph file has.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum InputFormat {
    /// The serialized `Graph` (raw graph kept by the flow store)
    Raw,
    /// The visual editor's saved `graph_data`
    Editor,
}

/// Compiles and inspects chatbot conversation graphs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Format of the input graph file
    #[arg(short, long, value_enum, default_value = "raw", global = true)]
    format: InputFormat,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a graph into a flow document
    Compile {
        /// Path to the graph JSON file
        graph_path: String,
        /// Write the JSON document here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
        /// Also write the binary artifact to this path
        #[arg(long)]
        binary: Option<String>,
        /// Path to a JSON file with compiler options
        #[arg(long)]
        options: Option<String>,
        /// Fail when two steps declare the same variable
        #[arg(long)]
        strict: bool,
    },
    /// Check every graph invariant without compiling
    Validate {
        /// Path to the graph JSON file
        graph_path: String,
    },
    /// List the tokens available to message editors
    Variables {
        /// Path to the graph JSON file
        graph_path: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Compile {
            graph_path,
            output,
            binary,
            options,
            strict,
        } => run_compile(cli.format, &graph_path, output, binary, options, strict),
        Command::Validate { graph_path } => run_validate(cli.format, &graph_path),
        Command::Variables { graph_path } => run_variables(cli.format, &graph_path),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_graph(format: InputFormat, path: &str) -> Graph {
    let json = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read graph file '{}': {}", path, e)));
    match format {
        InputFormat::Raw => Graph::from_json(&json)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse graph: {}", e))),
        InputFormat::Editor => EditorGraph::from_json(&json)
            .and_then(IntoGraph::into_graph)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to import editor graph: {}", e))),
    }
}

fn run_compile(
    format: InputFormat,
    graph_path: &str,
    output: Option<String>,
    binary: Option<String>,
    options_path: Option<String>,
    strict: bool,
) {
    let total_start = Instant::now();
    let graph = load_graph(format, graph_path);

    let mut options = match options_path {
        Some(path) => {
            let json = fs::read_to_string(&path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read options file '{}': {}", path, e))
            });
            CompilerOptions::from_json(&json)
                .unwrap_or_else(|e| exit_with_error(&format!("Invalid compiler options: {}", e)))
        }
        None => CompilerOptions::default(),
    };
    if strict {
        options.duplicate_variables = DuplicateVariablePolicy::Reject;
    }

    let compile_start = Instant::now();
    let document = Compiler::builder(&graph)
        .with_options(options)
        .build()
        .compile()
        .unwrap_or_else(|e| exit_with_error(&format!("Compilation failed: {}", e)));
    let compile_duration = compile_start.elapsed();

    let json = document
        .to_json_pretty()
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    match output {
        Some(path) => {
            fs::write(&path, json).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to write document to '{}': {}", path, e))
            });
            eprintln!("Wrote flow document to '{}'", path);
        }
        None => println!("{}", json),
    }

    if let Some(path) = binary {
        document
            .save(&path)
            .unwrap_or_else(|e| exit_with_error(&e.to_string()));
        eprintln!("Wrote binary artifact to '{}'", path);
    }

    let terminal = document.screens.iter().filter(|s| s.terminal).count();
    eprintln!("\n--- Compilation Summary ---");
    eprintln!("Graph:            {}", graph.name());
    eprintln!("Screens:          {}", document.screens.len());
    eprintln!("Terminal screens: {}", terminal);
    eprintln!("Start:            {}", document.start.as_deref().unwrap_or("-"));
    eprintln!("Compilation:      {:?}", compile_duration);
    eprintln!("Total:            {:?}", total_start.elapsed());
}

fn run_validate(format: InputFormat, graph_path: &str) {
    let graph = load_graph(format, graph_path);
    match graph.validate() {
        Ok(()) => {
            let reachable = graph.reachable_from_entry().len();
            println!(
                "'{}' is valid: {} nodes ({} reachable), {} edges",
                graph.name(),
                graph.nodes().len(),
                reachable,
                graph.edges().len()
            );
        }
        Err(e) => {
            let category = match e.category() {
                ErrorCategory::Structural => "structural",
                ErrorCategory::Payload => "payload",
            };
            exit_with_error(&format!("{} error: {}", category, e));
        }
    }
}

fn run_variables(format: InputFormat, graph_path: &str) {
    let graph = load_graph(format, graph_path);

    println!("System variables:");
    for system in system_variables() {
        println!("  {:<14} {}", system.label, system.token());
    }

    println!("\nGraph variables:");
    let declared = collect_variables(&graph);
    if declared.is_empty() {
        println!("  (none)");
    }
    for variable in &declared {
        println!(
            "  {:<14} {}  (step {} in node {})",
            variable.name, variable.token, variable.declaring_step_id, variable.node_id
        );
    }

    let duplicates = variables::duplicate_names(&graph);
    if !duplicates.is_empty() {
        println!("\nDeclared more than once: {}", duplicates.join(", "));
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
