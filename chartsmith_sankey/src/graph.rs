// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input graph for the Sankey solver.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::SankeyError;

/// A node as supplied by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct SankeyNodeInput {
    /// Unique node id, referenced by links.
    pub id: String,
    /// Overrides the value computed from link sums.
    pub fixed_value: Option<f64>,
}

impl SankeyNodeInput {
    /// Creates a node with a computed value.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fixed_value: None,
        }
    }

    /// Sets a fixed value for this node.
    pub fn with_fixed_value(mut self, value: f64) -> Self {
        self.fixed_value = Some(value);
        self
    }
}

/// A weighted link between two node ids.
#[derive(Clone, Debug, PartialEq)]
pub struct SankeyLinkInput {
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Link magnitude.
    pub value: f64,
}

impl SankeyLinkInput {
    /// Creates a link.
    pub fn new(source: impl Into<String>, target: impl Into<String>, value: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            value,
        }
    }
}

/// A node-link graph ready for layout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SankeyGraph {
    /// Nodes in input order.
    pub nodes: Vec<SankeyNodeInput>,
    /// Links in input order.
    pub links: Vec<SankeyLinkInput>,
}

impl SankeyGraph {
    /// Creates a graph from explicit nodes and links.
    pub fn new(nodes: Vec<SankeyNodeInput>, links: Vec<SankeyLinkInput>) -> Self {
        Self { nodes, links }
    }

    /// Creates a graph whose nodes are the link endpoints, in order of first appearance.
    pub fn from_links(links: Vec<SankeyLinkInput>) -> Self {
        let nodes = {
            let mut seen: HashMap<&str, ()> = HashMap::new();
            let mut nodes = Vec::new();
            for link in &links {
                for id in [link.source.as_str(), link.target.as_str()] {
                    if seen.insert(id, ()).is_none() {
                        nodes.push(SankeyNodeInput::new(id));
                    }
                }
            }
            nodes
        };
        Self { nodes, links }
    }

    /// Resolves link endpoints to node indices, in link order.
    pub(crate) fn link_endpoints(&self) -> Result<Vec<(usize, usize)>, SankeyError> {
        let index: HashMap<&str, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.as_str(), i))
            .collect();
        let lookup = |id: &str| {
            index
                .get(id)
                .copied()
                .ok_or_else(|| SankeyError::MissingNode { id: String::from(id) })
        };
        self.links
            .iter()
            .map(|link| Ok((lookup(&link.source)?, lookup(&link.target)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    #[test]
    fn nodes_are_derived_from_links_in_first_appearance_order() {
        let graph = SankeyGraph::from_links(vec![
            SankeyLinkInput::new("b", "c", 1.0),
            SankeyLinkInput::new("a", "b", 2.0),
        ]);
        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[test]
    fn repeated_endpoints_yield_one_node_and_keep_every_link() {
        let links = vec![
            SankeyLinkInput::new("a", "b", 1.0),
            SankeyLinkInput::new("a", "b", 2.0),
            SankeyLinkInput::new("b", "a", 3.0),
        ];
        let graph = SankeyGraph::from_links(links.clone());
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.links, links);
        assert_eq!(graph.link_endpoints(), Ok(vec![(0, 1), (0, 1), (1, 0)]));
    }

    #[test]
    fn unknown_endpoint_is_reported() {
        let graph = SankeyGraph::new(
            vec![SankeyNodeInput::new("a")],
            vec![SankeyLinkInput::new("a", "z", 1.0)],
        );
        assert_eq!(
            graph.link_endpoints(),
            Err(SankeyError::MissingNode {
                id: String::from("z")
            })
        );
    }
}
