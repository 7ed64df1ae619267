use clap::{Parser, Subcommand};
use seqgraph::prelude::*;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Inspect, flatten, materialize and round-trip command sequences
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Accept a foreign kind name as an alias, e.g. `--alias move_abs=move_absolute`
    #[arg(long = "alias", global = true, value_parser = parse_alias)]
    aliases: Vec<(String, NodeKind)>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the sequence as a tree
    Tree { sequence_path: String },
    /// Print the Flat-IR of the sequence
    Flatten { sequence_path: String },
    /// Materialize the sequence and print its primary and edge records
    Materialize {
        sequence_path: String,
        /// Write a bincode store snapshot to this path
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Materialize, reconstruct and compare against the original tree
    Roundtrip { sequence_path: String },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut reader = NodeReader::builder();
    for (name, kind) in &cli.aliases {
        reader = reader.with_kind_alias(name, *kind);
    }
    let reader = reader.build();

    match cli.command {
        Command::Tree { sequence_path } => {
            let root = load_sequence(&reader, &sequence_path);
            print!("{}", DisplayNode { node: &root });
        }
        Command::Flatten { sequence_path } => {
            let root = load_sequence(&reader, &sequence_path);
            for entry in flatten(&root) {
                println!("{}", entry);
            }
        }
        Command::Materialize {
            sequence_path,
            output,
        } => run_materialize(&reader, &sequence_path, output),
        Command::Roundtrip { sequence_path } => run_roundtrip(&reader, &sequence_path),
    }
}

fn run_materialize(reader: &NodeReader, sequence_path: &str, output: Option<String>) {
    let root = load_sequence(reader, sequence_path);
    let sequence = Sequence::new(SequenceId(1), sequence_path, root)
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid sequence: {}", e)));

    let store = MemoryStore::new();
    let graph = store
        .save_sequence(&sequence)
        .unwrap_or_else(|e| exit_with_error(&format!("Materialization failed: {}", e)));

    println!("--- Primary Records ({}) ---", graph.primaries.len());
    for primary in &graph.primaries {
        println!("{:>6}  {}", primary.id.to_string(), primary.kind);
    }
    println!("\n--- Edge Records ({}) ---", graph.edges.len());
    for edge in &graph.edges {
        let target = match &edge.target {
            EdgeTarget::Node(id) => id.to_string(),
            EdgeTarget::Literal(value) => value.to_string(),
        };
        println!(
            "{:>6}  {:>6} {:<20} -> {}",
            edge.id.to_string(),
            edge.owner_primary_id.to_string(),
            edge.slot.to_string(),
            target
        );
    }

    if let Some(path) = output {
        store
            .save(&path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to save snapshot: {}", e)));
        println!("\nSnapshot written to '{}'", path);
    }
}

fn run_roundtrip(reader: &NodeReader, sequence_path: &str) {
    let total_start = Instant::now();
    let root = load_sequence(reader, sequence_path);

    let flatten_start = Instant::now();
    let entries = flatten(&root);
    let entry_count = entries.len();
    let flatten_duration = flatten_start.elapsed();

    let materialize_start = Instant::now();
    let mut pass = SecondPass::new(SequenceId(1), SequentialIds::new());
    let primaries = pass
        .run(entries)
        .unwrap_or_else(|e| exit_with_error(&format!("Materialization failed: {}", e)));
    let materialize_duration = materialize_start.elapsed();

    let reconstruct_start = Instant::now();
    let root_id = primaries
        .first()
        .map(|p| p.id)
        .unwrap_or_else(|| exit_with_error("Materialization produced no records"));
    let rebuilt = reconstruct(root_id, &primaries, pass.edges())
        .unwrap_or_else(|e| exit_with_error(&format!("Reconstruction failed: {}", e)));
    let reconstruct_duration = reconstruct_start.elapsed();

    println!("\n--- Round Trip Summary ---");
    println!("Flat entries:         {}", entry_count);
    println!("Primary records:      {}", primaries.len());
    println!("Edge records:         {}", pass.edges().len());
    println!(
        "Result:               {}",
        if rebuilt == root { "identical" } else { "MISMATCH" }
    );

    println!("\n--- Performance Summary ---");
    println!("Flattening:           {:?}", flatten_duration);
    println!("Materialization:      {:?}", materialize_duration);
    println!("Reconstruction:       {:?}", reconstruct_duration);
    println!("-----------------------------");
    println!("Total Execution:      {:?}", total_start.elapsed());

    if rebuilt != root {
        std::process::exit(2);
    }
}

fn load_sequence(reader: &NodeReader, path: &str) -> Node {
    let json = fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read sequence file '{}': {}", path, e))
    });
    reader
        .read_str(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load sequence: {}", e)))
}

fn parse_alias(raw: &str) -> std::result::Result<(String, NodeKind), String> {
    let (name, kind) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=KIND, got '{}'", raw))?;
    let kind = NodeKind::from_name(kind).ok_or_else(|| format!("unknown node kind '{}'", kind))?;
    Ok((name.to_string(), kind))
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
