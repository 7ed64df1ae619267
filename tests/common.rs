//! Common test utilities for building sequence trees and record graphs.
use seqgraph::prelude::*;

/// `wait` step with the given delay.
#[allow(dead_code)]
pub fn wait(milliseconds: i32) -> Node {
    Node::builder(NodeKind::Wait)
        .arg("milliseconds", milliseconds)
        .build()
        .expect("wait is well-formed")
}

#[allow(dead_code)]
pub fn coordinate(x: i32, y: i32, z: i32) -> Node {
    Node::builder(NodeKind::Coordinate)
        .arg("x", x)
        .arg("y", y)
        .arg("z", z)
        .build()
        .expect("coordinate is well-formed")
}

#[allow(dead_code)]
pub fn write_pin(pin: i32, value: i32) -> Node {
    Node::builder(NodeKind::WritePin)
        .arg("pin_number", pin)
        .arg("pin_value", value)
        .arg("pin_mode", 0)
        .build()
        .expect("write_pin is well-formed")
}

/// `move_absolute` to a plant, offset by a coordinate.
#[allow(dead_code)]
pub fn move_to_plant(plant_id: i32) -> Node {
    let location = Node::builder(NodeKind::Point)
        .arg("pointer_type", "Plant")
        .arg("pointer_id", plant_id)
        .build()
        .expect("point is well-formed");
    Node::builder(NodeKind::MoveAbsolute)
        .arg("location", location)
        .arg("offset", coordinate(0, 0, 50))
        .arg("speed", 100)
        .build()
        .expect("move_absolute is well-formed")
}

/// A sequence exercising nested bodies, node-valued arguments and a body
/// nested inside a loop. It holds 12 nodes.
///
/// ```text
/// sequence (version: 4)
/// ├── move_absolute -> point, coordinate
/// ├── loop (times: 3)
/// │   ├── write_pin
/// │   └── wait
/// ├── _if -> execute, nothing
/// └── send_message
///     └── channel
/// ```
#[allow(dead_code)]
pub fn create_sample_sequence() -> Node {
    let repeat = Node::builder(NodeKind::Loop)
        .arg("times", 3)
        .step(write_pin(13, 1))
        .step(wait(250))
        .build()
        .expect("loop is well-formed");

    let branch = Node::builder(NodeKind::If)
        .arg("lhs", "pin13")
        .arg("op", "is")
        .arg("rhs", 1)
        .arg(
            "_then",
            Node::builder(NodeKind::Execute)
                .arg("sequence_id", 42)
                .build()
                .expect("execute is well-formed"),
        )
        .arg(
            "_else",
            Node::builder(NodeKind::Nothing)
                .build()
                .expect("nothing is well-formed"),
        )
        .build()
        .expect("_if is well-formed");

    let message = Node::builder(NodeKind::SendMessage)
        .arg("message", "Watered {{ x }}")
        .arg("message_type", "success")
        .step(
            Node::builder(NodeKind::Channel)
                .arg("channel_name", "toast")
                .build()
                .expect("channel is well-formed"),
        )
        .build()
        .expect("send_message is well-formed");

    Node::builder(NodeKind::Sequence)
        .arg("version", 4)
        .step(move_to_plant(7))
        .step(repeat)
        .step(branch)
        .step(message)
        .build()
        .expect("sequence is well-formed")
}

/// A sequence whose body is exactly the given steps.
#[allow(dead_code)]
pub fn create_sequence(steps: Vec<Node>) -> Sequence {
    let root = Node::builder(NodeKind::Sequence)
        .steps(steps)
        .build()
        .expect("sequence is well-formed");
    Sequence::new(SequenceId(1), "Test sequence", root).expect("root is a sequence")
}

/// Flattens and materializes a tree with fresh sequential ids.
#[allow(dead_code)]
pub fn materialize(root: &Node) -> (Vec<PrimaryNode>, Vec<EdgeNode>) {
    let mut pass = SecondPass::new(SequenceId(1), SequentialIds::new());
    let primaries = pass.run(flatten(root)).expect("Failed to materialize");
    (primaries, pass.into_edges())
}

#[allow(dead_code)]
pub const SAMPLE_SEQUENCE_JSON: &str = r#"{
    "kind": "sequence",
    "args": { "version": 4 },
    "body": [
        {
            "kind": "move_absolute",
            "args": {
                "location": { "kind": "identifier", "args": { "label": "parent" } },
                "offset": { "kind": "coordinate", "args": { "x": 0, "y": 0, "z": 0 } },
                "speed": 100
            }
        },
        { "kind": "take_photo", "args": {} },
        { "kind": "wait", "args": { "milliseconds": 1500.5 } },
        {
            "kind": "read_pin",
            "args": { "pin_number": 59, "label": "soil", "pin_mode": 1 }
        }
    ]
}"#;
