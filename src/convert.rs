//! Conversion between node trees and sequence JSON.
//!
//! The JSON shape is the usual command-tree layout:
//!
//! ```json
//! { "kind": "sequence", "args": { "version": 4 }, "body": [
//!     { "kind": "wait", "args": { "milliseconds": 500 } }
//! ] }
//! ```
//!
//! An argument is a node when it is an object with a `kind` field, otherwise a
//! scalar. Strings placed in identifier slots become [`Scalar::Ident`].

use crate::ast::{Accepts, Node, NodeKind, Scalar, Value};
use crate::error::NodeError;
use ahash::AHashMap;
use serde_json::{Map, Value as Json, json};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Reads sequence JSON into validated node trees.
pub struct NodeReader {
    aliases: AHashMap<String, NodeKind>,
}

pub struct NodeReaderBuilder {
    aliases: AHashMap<String, NodeKind>,
}

impl NodeReaderBuilder {
    pub fn new() -> Self {
        Self {
            aliases: AHashMap::new(),
        }
    }

    /// Accepts `user_kind_name` in input JSON as a synonym for `kind`.
    pub fn with_kind_alias(mut self, user_kind_name: &str, kind: NodeKind) -> Self {
        self.aliases.insert(user_kind_name.to_string(), kind);
        self
    }

    pub fn build(self) -> NodeReader {
        NodeReader {
            aliases: self.aliases,
        }
    }
}

impl Default for NodeReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for NodeReader {
    fn default() -> Self {
        NodeReaderBuilder::new().build()
    }
}

impl NodeReader {
    pub fn builder() -> NodeReaderBuilder {
        NodeReaderBuilder::new()
    }

    pub fn read_str(&self, json: &str) -> Result<Node, NodeError> {
        let value: Json =
            serde_json::from_str(json).map_err(|e| NodeError::Json(e.to_string()))?;
        self.read_value(&value)
    }

    pub fn read_value(&self, json: &Json) -> Result<Node, NodeError> {
        let object = json
            .as_object()
            .ok_or_else(|| NodeError::Json(format!("expected a node object, found {}", json)))?;
        let kind_name = object
            .get("kind")
            .and_then(Json::as_str)
            .ok_or_else(|| NodeError::Json("node object has no string 'kind'".to_string()))?;
        let kind = self.resolve_kind(kind_name)?;
        let shape = kind.shape();

        let mut args = BTreeMap::new();
        if let Some(raw_args) = object.get("args") {
            let raw_args = raw_args
                .as_object()
                .ok_or_else(|| NodeError::Json(format!("'args' of '{}' must be an object", kind)))?;
            for (name, raw) in raw_args {
                let accepts = shape.arg(name).map(|spec| spec.accepts);
                args.insert(name.clone(), self.read_arg(kind, name, accepts, raw)?);
            }
        }

        let mut body = Vec::new();
        if let Some(raw_body) = object.get("body") {
            let items = raw_body
                .as_array()
                .ok_or_else(|| NodeError::Json(format!("'body' of '{}' must be an array", kind)))?;
            for item in items {
                body.push(Arc::new(self.read_value(item)?));
            }
        }

        Node::new(kind, args, body)
    }

    fn resolve_kind(&self, name: &str) -> Result<NodeKind, NodeError> {
        NodeKind::from_name(name)
            .or_else(|| self.aliases.get(name).copied())
            .ok_or_else(|| NodeError::UnknownKind(name.to_string()))
    }

    fn read_arg(
        &self,
        kind: NodeKind,
        name: &str,
        accepts: Option<Accepts>,
        raw: &Json,
    ) -> Result<Value, NodeError> {
        let scalar = match raw {
            Json::Object(map) if map.contains_key("kind") => {
                return Ok(Value::Node(Arc::new(self.read_value(raw)?)));
            }
            Json::String(s) if accepts == Some(Accepts::Ident) => Scalar::Ident(s.clone()),
            Json::String(s) => Scalar::Text(s.clone()),
            Json::Bool(b) => Scalar::Bool(*b),
            Json::Number(n) => Scalar::Number(n.as_f64().ok_or_else(|| {
                NodeError::Json(format!("argument '{}' of '{}' is not a finite number", name, kind))
            })?),
            other => {
                return Err(NodeError::Json(format!(
                    "argument '{}' of '{}' has unsupported value {}",
                    name, kind, other
                )));
            }
        };
        Ok(Value::Scalar(scalar))
    }
}

impl Node {
    /// Serializes this tree back into sequence JSON.
    pub fn to_json(&self) -> Json {
        let args: Map<String, Json> = self
            .args()
            .iter()
            .map(|(name, value)| {
                let json = match value {
                    Value::Scalar(s) => scalar_to_json(s),
                    Value::Node(n) => n.to_json(),
                };
                (name.clone(), json)
            })
            .collect();

        let mut object = Map::new();
        object.insert("kind".to_string(), json!(self.kind().as_str()));
        object.insert("args".to_string(), Json::Object(args));
        if !self.body().is_empty() {
            let body = self.body().iter().map(|n| n.to_json()).collect();
            object.insert("body".to_string(), Json::Array(body));
        }
        Json::Object(object)
    }
}

fn scalar_to_json(scalar: &Scalar) -> Json {
    match scalar {
        Scalar::Text(s) | Scalar::Ident(s) => json!(s),
        Scalar::Bool(b) => json!(b),
        Scalar::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => json!(*n as i64),
        Scalar::Number(n) => json!(n),
    }
}
