use super::{Node, Value};
use std::fmt;

/// Renders a node tree with box-drawing guides, one node per line.
///
/// Scalar arguments are printed inline after the kind; node-valued arguments
/// are printed as labelled children, followed by the body in order.
pub struct DisplayNode<'a> {
    pub node: &'a Node,
}

impl<'a> fmt::Display for DisplayNode<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", Self::header(self.node))?;
        self.fmt_children(self.node, f, "")
    }
}

impl<'a> DisplayNode<'a> {
    fn header(node: &Node) -> String {
        let scalars: Vec<String> = node
            .args()
            .iter()
            .filter_map(|(name, value)| value.as_scalar().map(|s| format!("{}: {}", name, s)))
            .collect();
        if scalars.is_empty() {
            node.kind().to_string()
        } else {
            format!("{} ({})", node.kind(), scalars.join(", "))
        }
    }

    fn fmt_children(&self, node: &Node, f: &mut fmt::Formatter<'_>, prefix: &str) -> fmt::Result {
        let nested: Vec<(&String, &Node)> = node
            .args()
            .iter()
            .filter_map(|(name, value)| match value {
                Value::Node(child) => Some((name, child.as_ref())),
                Value::Scalar(_) => None,
            })
            .collect();
        let total = nested.len() + node.body().len();

        let labelled = nested
            .into_iter()
            .map(|(name, child)| (Some(name.as_str()), child));
        let steps = node.body().iter().map(|child| (None, child.as_ref()));

        for (i, (label, child)) in labelled.chain(steps).enumerate() {
            let is_last = i + 1 == total;
            self.fmt_as_tree(label, child, f, prefix, is_last)?;
        }
        Ok(())
    }

    fn fmt_as_tree(
        &self,
        label: Option<&str>,
        node: &Node,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let node_marker = if is_last { "└── " } else { "├── " };
        match label {
            Some(name) => writeln!(f, "{}{}{}: {}", prefix, node_marker, name, Self::header(node))?,
            None => writeln!(f, "{}{}{}", prefix, node_marker, Self::header(node))?,
        }

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        self.fmt_children(node, f, &child_prefix)
    }
}
