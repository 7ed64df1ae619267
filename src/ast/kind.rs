use super::{Node, Scalar, Value};
use crate::error::NodeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// What a single argument slot is allowed to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accepts {
    /// Text, number or boolean.
    Literal,
    /// An identifier reference only.
    Ident,
    /// A nested node only.
    Node,
    /// A literal or a nested node.
    LiteralOrNode,
}

impl Accepts {
    pub fn allows(&self, value: &Value) -> bool {
        match (self, value) {
            (Accepts::Node | Accepts::LiteralOrNode, Value::Node(_)) => true,
            (Accepts::Ident, Value::Scalar(Scalar::Ident(_))) => true,
            (Accepts::Literal | Accepts::LiteralOrNode, Value::Scalar(s)) => !s.is_ident(),
            _ => false,
        }
    }
}

impl fmt::Display for Accepts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accepts::Literal => write!(f, "a literal"),
            Accepts::Ident => write!(f, "an identifier"),
            Accepts::Node => write!(f, "a node"),
            Accepts::LiteralOrNode => write!(f, "a literal or a node"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// Whether a kind may, or must, carry a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRule {
    Forbidden,
    Optional,
    /// At least one child.
    Required,
}

#[derive(Debug, Clone, Copy)]
pub struct ArgSpec {
    pub name: &'static str,
    pub accepts: Accepts,
    pub presence: Presence,
}

/// The legal shape of a node of a given kind.
#[derive(Debug)]
pub struct NodeShape {
    pub body: BodyRule,
    pub args: &'static [ArgSpec],
}

impl NodeShape {
    pub fn arg(&self, name: &str) -> Option<&ArgSpec> {
        self.args.iter().find(|spec| spec.name == name)
    }

    /// Checks a prospective node against this shape.
    pub(crate) fn check(
        &self,
        kind: NodeKind,
        args: &BTreeMap<String, Value>,
        body: &[Arc<Node>],
    ) -> Result<(), NodeError> {
        for (name, value) in args {
            let spec = self.arg(name).ok_or_else(|| NodeError::UnknownArg {
                kind,
                slot: name.clone(),
            })?;
            if !spec.accepts.allows(value) {
                return Err(NodeError::IllegalValue {
                    kind,
                    slot: name.clone(),
                    expected: spec.accepts,
                });
            }
            if value.as_scalar().is_some_and(|s| !s.is_finite()) {
                return Err(NodeError::NonFiniteNumber {
                    kind,
                    slot: name.clone(),
                });
            }
        }

        if let Some(missing) = self
            .args
            .iter()
            .find(|spec| spec.presence == Presence::Required && !args.contains_key(spec.name))
        {
            return Err(NodeError::MissingArg {
                kind,
                slot: missing.name.to_string(),
            });
        }

        match (self.body, body.is_empty()) {
            (BodyRule::Forbidden, false) => Err(NodeError::BodyForbidden { kind }),
            (BodyRule::Required, true) => Err(NodeError::BodyRequired { kind }),
            _ => Ok(()),
        }
    }
}

/// Master macro defining every node kind, its wire name and its shape table.
macro_rules! define_node_kinds {
    ( $( $variant:ident => $name:literal, body: $body:ident, args: [ $( ($arg:literal, $accepts:ident, $presence:ident) ),* $(,)? ] );* $(;)? ) => {
        /// The closed set of command and operator kinds.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum NodeKind {
            $( #[serde(rename = $name)] $variant, )*
        }

        impl NodeKind {
            pub const ALL: &'static [NodeKind] = &[ $( NodeKind::$variant, )* ];

            /// The canonical name of this kind, as used in sequence JSON.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( NodeKind::$variant => $name, )*
                }
            }

            pub fn from_name(name: &str) -> Option<NodeKind> {
                match name {
                    $( $name => Some(NodeKind::$variant), )*
                    _ => None,
                }
            }

            pub fn shape(&self) -> &'static NodeShape {
                match self {
                    $(
                        NodeKind::$variant => {
                            const SHAPE: NodeShape = NodeShape {
                                body: BodyRule::$body,
                                args: &[ $( ArgSpec {
                                    name: $arg,
                                    accepts: Accepts::$accepts,
                                    presence: Presence::$presence,
                                }, )* ],
                            };
                            &SHAPE
                        }
                    )*
                }
            }
        }
    };
}

define_node_kinds! {
    // Containers
    Sequence => "sequence", body: Optional, args: [("version", Literal, Optional)];
    Loop => "loop", body: Required, args: [("times", LiteralOrNode, Required)];

    // Movement
    MoveAbsolute => "move_absolute", body: Forbidden, args: [
        ("location", Node, Required),
        ("offset", Node, Required),
        ("speed", Literal, Required),
    ];
    MoveRelative => "move_relative", body: Forbidden, args: [
        ("x", Literal, Required),
        ("y", Literal, Required),
        ("z", Literal, Required),
        ("speed", Literal, Required),
    ];
    FindHome => "find_home", body: Forbidden, args: [
        ("axis", Literal, Required),
        ("speed", Literal, Required),
    ];

    // Peripherals
    WritePin => "write_pin", body: Forbidden, args: [
        ("pin_number", LiteralOrNode, Required),
        ("pin_value", Literal, Required),
        ("pin_mode", Literal, Required),
    ];
    ReadPin => "read_pin", body: Forbidden, args: [
        ("pin_number", LiteralOrNode, Required),
        ("label", Literal, Required),
        ("pin_mode", Literal, Required),
    ];
    TakePhoto => "take_photo", body: Forbidden, args: [];

    // Flow control
    Wait => "wait", body: Forbidden, args: [("milliseconds", Literal, Required)];
    If => "_if", body: Forbidden, args: [
        ("lhs", LiteralOrNode, Required),
        ("op", Literal, Required),
        ("rhs", Literal, Required),
        ("_then", Node, Required),
        ("_else", Node, Required),
    ];
    Execute => "execute", body: Forbidden, args: [("sequence_id", Literal, Required)];
    Nothing => "nothing", body: Forbidden, args: [];

    // Messaging
    SendMessage => "send_message", body: Optional, args: [
        ("message", Literal, Required),
        ("message_type", Literal, Required),
    ];
    Channel => "channel", body: Forbidden, args: [("channel_name", Literal, Required)];

    // Locations and references
    Coordinate => "coordinate", body: Forbidden, args: [
        ("x", Literal, Required),
        ("y", Literal, Required),
        ("z", Literal, Required),
    ];
    Point => "point", body: Forbidden, args: [
        ("pointer_type", Literal, Required),
        ("pointer_id", Literal, Required),
    ];
    Tool => "tool", body: Forbidden, args: [("tool_id", Literal, Required)];
    Identifier => "identifier", body: Forbidden, args: [("label", Ident, Required)];
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
