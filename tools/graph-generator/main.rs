use clap::Parser;
use kaiwa::compiler::Compiler;
use kaiwa::graph::{ENTRY_NODE_ID, Graph, SourcePort};
use kaiwa::step::{Step, StepKind};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::fs;

/// A CLI tool to generate random conversation graphs through the mutator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated graph JSON to
    #[arg(short, long, default_value = "generated_graph.json")]
    output: String,

    /// Number of non-entry nodes to generate
    #[arg(short, long, default_value_t = 25)]
    nodes: usize,

    /// Maximum number of steps per node
    #[arg(long, default_value_t = 4)]
    max_steps: usize,

    /// Seed for reproducible graphs; random if omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Compile the result twice and fail if the documents differ
    #[arg(long)]
    check: bool,
}

const MESSAGES: [&str; 5] = [
    "Hi {{contact.first_name}}!",
    "Thanks for reaching out.",
    "We will get back to you shortly.",
    "Here is what we found for {{vars.topic}}.",
    "Anything else?",
];

const REPLIES: [&str; 6] = ["Yes", "No", "Maybe", "Sales", "Support", "Later"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let seed = cli.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);

    println!(
        "Generating graph with {} nodes (up to {} steps each, seed {})...",
        cli.nodes, cli.max_steps, seed
    );

    let graph = generate_graph(&mut rng, cli.nodes, cli.max_steps.max(1))?;
    println!(
        "-> {} nodes, {} edges",
        graph.nodes().len(),
        graph.edges().len()
    );

    if cli.check {
        let first = Compiler::builder(&graph).build().compile()?;
        let second = Compiler::builder(&graph).build().compile()?;
        if first.to_json()? != second.to_json()? {
            eprintln!("Error: compiling the same graph twice produced different documents");
            std::process::exit(1);
        }
        println!("-> Compilation is deterministic ({} screens)", first.screens.len());
    }

    fs::write(&cli.output, graph.to_json()?)?;
    println!("Successfully generated and saved graph to '{}'", cli.output);

    Ok(())
}

fn random_step(rng: &mut StdRng, index: usize) -> Step {
    match rng.random_range(0..6) {
        0 => Step::quick_reply(
            "Pick one",
            &REPLIES[..rng.random_range(1..=3)],
        ),
        1 => Step::list_menu(
            "Choose a department",
            "Departments",
            &REPLIES[..rng.random_range(1..=REPLIES.len())],
        ),
        2 => Step::input(
            StepKind::TextInput,
            "Tell us more",
            &format!("answer_{}", index),
        ),
        3 => Step::input(StepKind::EmailInput, "Your email?", "email"),
        4 => Step::media(StepKind::Image, &format!("media-{}", index), None),
        _ => Step::text(MESSAGES.choose(rng).copied().unwrap_or("Hello")),
    }
}

fn generate_graph(
    rng: &mut StdRng,
    node_count: usize,
    max_steps: usize,
) -> Result<Graph, Box<dyn std::error::Error>> {
    let mut graph = Graph::new("Generated Flow");
    let mut node_ids = Vec::with_capacity(node_count);

    for n in 0..node_count {
        let step_count = rng.random_range(1..=max_steps);
        let steps = (0..step_count)
            .map(|s| random_step(rng, n * max_steps + s))
            .collect();
        let (next, node_id) = graph.add_node(steps)?;
        graph = next;
        node_ids.push(node_id);
    }

    if let Some(first) = node_ids.first() {
        graph = graph.connect(ENTRY_NODE_ID, SourcePort::Default, first)?;
    }

    // Wire a random subset of every node's ports; leaving some open keeps
    // terminal screens and unconnected options in the mix.
    for source in &node_ids {
        let ports = graph.node_ports(source)?;
        for port in ports {
            if !rng.random_bool(0.6) {
                continue;
            }
            if let Some(target) = node_ids.choose(rng) {
                graph = graph.connect(source, port, target)?;
            }
        }
    }

    Ok(graph)
}
