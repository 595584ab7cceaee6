use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a node name stands for. Chosen when the node is declared or first targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeKind {
    /// A real page, or a flow's synthetic start page.
    #[default]
    Page,
    /// A transition out of the current flow, named `"FLOW: <target>"`.
    FlowTransition,
    /// A transition route group attached to a page.
    RouteGroup,
}

/// A minimal directed graph of conversational states.
///
/// Edges do not imply node membership: a name can be a target (and therefore
/// "used") without ever being declared with [`Graph::add_node`]. The analysis
/// passes rely on that distinction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: AHashSet<String>,
    pub edges: AHashMap<String, AHashSet<String>>,
    pub used_nodes: AHashSet<String>,
    kinds: AHashMap<String, NodeKind>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a node, regardless of whether anything routes to it.
    pub fn add_node(&mut self, node: &str) {
        self.nodes.insert(node.to_string());
    }

    pub fn add_edge(&mut self, source: &str, target: &str) {
        self.edges
            .entry(source.to_string())
            .or_default()
            .insert(target.to_string());
    }

    /// Marks a node as the target of some route.
    pub fn add_used_node(&mut self, node: &str) {
        self.used_nodes.insert(node.to_string());
    }

    /// Records the kind of a node name. The first tag wins.
    pub fn tag_node(&mut self, node: &str, kind: NodeKind) {
        self.kinds.entry(node.to_string()).or_insert(kind);
    }

    /// The recorded kind of `node`, `NodeKind::Page` when never tagged.
    pub fn kind(&self, node: &str) -> NodeKind {
        self.kinds.get(node).copied().unwrap_or_default()
    }

    pub fn is_flow_transition(&self, node: &str) -> bool {
        self.kind(node) == NodeKind::FlowTransition
    }

    pub fn children(&self, node: &str) -> Option<&AHashSet<String>> {
        self.edges.get(node)
    }

    pub fn has_outgoing_edges(&self, node: &str) -> bool {
        self.edges.contains_key(node)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(|targets| targets.len()).sum()
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes = self.nodes.iter().sorted().join(", ");
        let edges = self
            .edges
            .iter()
            .sorted_by(|a, b| a.0.cmp(b.0))
            .map(|(source, targets)| {
                format!("{} -> [{}]", source, targets.iter().sorted().join(", "))
            })
            .join(", ");
        write!(f, "Graph({{{}}}, {{{}}})", nodes, edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_sorted() {
        let mut graph = Graph::new();
        graph.add_node("b");
        graph.add_node("a");
        graph.add_edge("a", "c");
        graph.add_edge("a", "b");
        assert_eq!(graph.to_string(), "Graph({a, b}, {a -> [b, c]})");
    }

    #[test]
    fn first_tag_wins() {
        let mut graph = Graph::new();
        graph.tag_node("FLOW: Billing", NodeKind::FlowTransition);
        graph.tag_node("FLOW: Billing", NodeKind::Page);
        assert!(graph.is_flow_transition("FLOW: Billing"));
        assert_eq!(graph.kind("never tagged"), NodeKind::Page);
    }
}
