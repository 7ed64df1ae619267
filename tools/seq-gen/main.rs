use clap::Parser;
use rand::{Rng, rngs::ThreadRng};
use seqgraph::ast::{Node, NodeKind, Scalar};
use seqgraph::error::NodeError;
use std::fs;

/// A CLI tool to generate random, well-formed sequence JSON
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_sequence.json")]
    output: String,

    /// The minimum number of top-level steps
    #[arg(long, default_value_t = 1)]
    min: usize,

    /// The maximum number of top-level steps
    #[arg(long, default_value_t = 12)]
    max: usize,

    /// How deep loops may nest
    #[arg(long, default_value_t = 2)]
    depth: usize,
}

type StepGenerator = fn(&mut ThreadRng) -> Result<Node, NodeError>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.min > cli.max {
        eprintln!(
            "Error: --min ({}) cannot be greater than --max ({})",
            cli.min, cli.max
        );
        std::process::exit(1);
    }

    println!(
        "Generating a new sequence (top-level steps: {} to {}, loop depth {})...",
        cli.min, cli.max, cli.depth
    );

    let count = rng.random_range(cli.min..=cli.max);
    let steps = generate_steps(&mut rng, count, cli.depth)?;
    let root = Node::builder(NodeKind::Sequence)
        .arg("version", 4)
        .steps(steps)
        .build()?;

    let json_output = serde_json::to_string_pretty(&root.to_json())?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated a sequence of {} nodes and saved it to '{}'",
        root.node_count(),
        cli.output
    );

    Ok(())
}

fn generate_steps(rng: &mut ThreadRng, count: usize, depth: usize) -> Result<Vec<Node>, NodeError> {
    let generators: [StepGenerator; 7] = [
        generate_move_absolute,
        generate_move_relative,
        generate_write_pin,
        generate_wait,
        generate_send_message,
        generate_if,
        generate_take_photo,
    ];

    (0..count)
        .map(|_| {
            if depth > 0 && rng.random_bool(0.15) {
                generate_loop(rng, depth - 1)
            } else {
                let index = rng.random_range(0..generators.len());
                generators[index](rng)
            }
        })
        .collect()
}

// --- Generator Functions for Each Step Kind ---

fn generate_loop(rng: &mut ThreadRng, depth: usize) -> Result<Node, NodeError> {
    let count = rng.random_range(1..=4);
    Node::builder(NodeKind::Loop)
        .arg("times", rng.random_range(2..10))
        .steps(generate_steps(rng, count, depth)?)
        .build()
}

fn generate_location(rng: &mut ThreadRng) -> Result<Node, NodeError> {
    match rng.random_range(0..3) {
        0 => Node::builder(NodeKind::Point)
            .arg("pointer_type", "Plant")
            .arg("pointer_id", rng.random_range(1..500))
            .build(),
        1 => Node::builder(NodeKind::Tool)
            .arg("tool_id", rng.random_range(1..20))
            .build(),
        _ => Node::builder(NodeKind::Identifier)
            .arg("label", Scalar::ident("parent"))
            .build(),
    }
}

fn generate_coordinate(rng: &mut ThreadRng) -> Result<Node, NodeError> {
    Node::builder(NodeKind::Coordinate)
        .arg("x", rng.random_range(0..3000))
        .arg("y", rng.random_range(0..1500))
        .arg("z", rng.random_range(-400..0))
        .build()
}

fn generate_move_absolute(rng: &mut ThreadRng) -> Result<Node, NodeError> {
    Node::builder(NodeKind::MoveAbsolute)
        .arg("location", generate_location(rng)?)
        .arg("offset", generate_coordinate(rng)?)
        .arg("speed", 100)
        .build()
}

fn generate_move_relative(rng: &mut ThreadRng) -> Result<Node, NodeError> {
    Node::builder(NodeKind::MoveRelative)
        .arg("x", rng.random_range(-100..100))
        .arg("y", rng.random_range(-100..100))
        .arg("z", rng.random_range(-50..50))
        .arg("speed", rng.random_range(10..=100))
        .build()
}

fn generate_write_pin(rng: &mut ThreadRng) -> Result<Node, NodeError> {
    Node::builder(NodeKind::WritePin)
        .arg("pin_number", rng.random_range(2..14))
        .arg("pin_value", rng.random_range(0..2))
        .arg("pin_mode", 0)
        .build()
}

fn generate_wait(rng: &mut ThreadRng) -> Result<Node, NodeError> {
    Node::builder(NodeKind::Wait)
        .arg("milliseconds", rng.random_range(100..5000))
        .build()
}

fn generate_send_message(rng: &mut ThreadRng) -> Result<Node, NodeError> {
    let mut builder = Node::builder(NodeKind::SendMessage)
        .arg("message", "Reached step")
        .arg("message_type", "info");
    if rng.random_bool(0.5) {
        builder = builder.step(
            Node::builder(NodeKind::Channel)
                .arg("channel_name", "toast")
                .build()?,
        );
    }
    builder.build()
}

fn generate_if(rng: &mut ThreadRng) -> Result<Node, NodeError> {
    Node::builder(NodeKind::If)
        .arg("lhs", "pin13")
        .arg("op", "is")
        .arg("rhs", rng.random_range(0..2))
        .arg(
            "_then",
            Node::builder(NodeKind::Execute)
                .arg("sequence_id", rng.random_range(1..100))
                .build()?,
        )
        .arg("_else", Node::builder(NodeKind::Nothing).build()?)
        .build()
}

fn generate_take_photo(_rng: &mut ThreadRng) -> Result<Node, NodeError> {
    Node::builder(NodeKind::TakePhoto).build()
}
