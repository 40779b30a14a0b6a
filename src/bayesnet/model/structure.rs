use crate::bayesnet::common::errors::{NetworkError, Result};
use log::debug;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// The DAG over variable names.
///
/// Only constructed through [`Structure::build`] or [`Structure::from_edges`],
/// both of which validate the whole graph, so a `Structure` value is always
/// acyclic. There is no API to add or remove edges afterwards.
#[derive(Debug, Clone)]
pub struct Structure {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
    topological: Vec<NodeIndex>,
}

impl Structure {
    /// Build a structure over the declared `nodes`.
    ///
    /// Node order is declaration order. Repeated nodes and repeated edges are
    /// collapsed.
    pub fn build<N, S>(nodes: N, edges: &[(S, S)]) -> Result<Self>
    where
        N: IntoIterator,
        N::Item: AsRef<str>,
        S: AsRef<str>,
    {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        for node in nodes {
            let name = node.as_ref();
            if !index.contains_key(name) {
                let ix = graph.add_node(name.to_string());
                index.insert(name.to_string(), ix);
            }
        }

        for (parent, child) in edges {
            let (parent, child) = (parent.as_ref(), child.as_ref());
            let from = *index
                .get(parent)
                .ok_or_else(|| NetworkError::UnknownVariable(parent.to_string()))?;
            let to = *index
                .get(child)
                .ok_or_else(|| NetworkError::UnknownVariable(child.to_string()))?;
            if graph.find_edge(from, to).is_none() {
                graph.add_edge(from, to, ());
            }
        }

        let topological = kahn_order(&graph)?;
        debug!(
            "built structure with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(Structure {
            graph,
            index,
            topological,
        })
    }

    /// Build a structure whose nodes are exactly the endpoints of `edges`, in
    /// order of first appearance.
    pub fn from_edges<S: AsRef<str>>(edges: &[(S, S)]) -> Result<Self> {
        let nodes: Vec<&str> = edges
            .iter()
            .flat_map(|(p, c)| [p.as_ref(), c.as_ref()])
            .collect();
        Self::build(nodes, edges)
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.graph.node_indices().map(move |ix| self.graph[ix].as_str())
    }

    /// Edges as `(parent, child)` pairs in insertion order.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].as_str(),
                    self.graph[e.target()].as_str(),
                )
            })
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn contains(&self, node: &str) -> bool {
        self.index.contains_key(node)
    }

    /// Position of `node` in declaration order.
    pub fn position(&self, node: &str) -> Option<usize> {
        self.index.get(node).map(|ix| ix.index())
    }

    /// Parents of `node`, in declaration order.
    pub fn parents_of(&self, node: &str) -> Result<Vec<&str>> {
        self.neighbors(node, Direction::Incoming)
    }

    /// Children of `node`, in declaration order.
    pub fn children_of(&self, node: &str) -> Result<Vec<&str>> {
        self.neighbors(node, Direction::Outgoing)
    }

    /// Every node after all of its parents; ties go to the earlier declared node.
    pub fn topological_order(&self) -> Vec<&str> {
        self.topological
            .iter()
            .map(|&ix| self.graph[ix].as_str())
            .collect()
    }

    fn neighbors(&self, node: &str, direction: Direction) -> Result<Vec<&str>> {
        let ix = *self
            .index
            .get(node)
            .ok_or_else(|| NetworkError::UnknownVariable(node.to_string()))?;
        let mut found: Vec<NodeIndex> = self.graph.neighbors_directed(ix, direction).collect();
        found.sort();
        Ok(found.into_iter().map(|n| self.graph[n].as_str()).collect())
    }
}

fn kahn_order(graph: &DiGraph<String, ()>) -> Result<Vec<NodeIndex>> {
    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|ix| graph.neighbors_directed(ix, Direction::Incoming).count())
        .collect();
    let mut ready: BinaryHeap<Reverse<NodeIndex>> = graph
        .node_indices()
        .filter(|ix| in_degree[ix.index()] == 0)
        .map(Reverse)
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(Reverse(ix)) = ready.pop() {
        order.push(ix);
        for child in graph.neighbors_directed(ix, Direction::Outgoing) {
            in_degree[child.index()] -= 1;
            if in_degree[child.index()] == 0 {
                ready.push(Reverse(child));
            }
        }
    }

    if order.len() < graph.node_count() {
        let stuck = graph
            .node_indices()
            .filter(|ix| in_degree[ix.index()] > 0)
            .map(|ix| graph[ix].clone())
            .collect();
        return Err(NetworkError::Cycle(stuck));
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parents_and_order() {
        let structure = Structure::from_edges(&[
            ("cloudy", "rain"),
            ("cloudy", "sprinkler"),
            ("sprinkler", "wet"),
            ("rain", "wet"),
        ])
        .unwrap();
        assert_eq!(
            structure.nodes().collect::<Vec<_>>(),
            vec!["cloudy", "rain", "sprinkler", "wet"]
        );
        assert_eq!(structure.parents_of("wet").unwrap(), vec!["rain", "sprinkler"]);
        assert_eq!(structure.children_of("cloudy").unwrap(), vec!["rain", "sprinkler"]);
        assert!(structure.parents_of("cloudy").unwrap().is_empty());
        assert_eq!(
            structure.topological_order(),
            vec!["cloudy", "rain", "sprinkler", "wet"]
        );
        assert_eq!(structure.edges().len(), 4);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let result = Structure::from_edges(&[("r", "a"), ("a", "b"), ("b", "c"), ("c", "a")]);
        match result {
            // r drains, everything downstream of the loop stays stuck
            Err(NetworkError::Cycle(nodes)) => {
                assert_eq!(nodes, vec!["a".to_string(), "b".to_string(), "c".to_string()])
            }
            other => panic!("expected cycle, got {:?}", other),
        }
        assert!(matches!(
            Structure::from_edges(&[("a", "a")]),
            Err(NetworkError::Cycle(_))
        ));
    }

    #[test]
    fn test_unknown_endpoint() {
        let result = Structure::build(["a", "b"], &[("a", "c")]);
        assert_eq!(result.unwrap_err(), NetworkError::UnknownVariable("c".into()));
    }

    #[test]
    fn test_isolated_nodes_and_duplicate_edges() {
        let structure = Structure::build(["x", "a", "b"], &[("a", "b"), ("a", "b")]).unwrap();
        assert_eq!(structure.node_count(), 3);
        assert_eq!(structure.edges(), vec![("a", "b")]);
        assert_eq!(structure.topological_order(), vec!["x", "a", "b"]);
        assert!(matches!(
            structure.parents_of("zzz"),
            Err(NetworkError::UnknownVariable(_))
        ));
    }
}
