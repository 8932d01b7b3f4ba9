// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sankey node-link layout.
//!
//! Given a graph of nodes and weighted links, this crate assigns each node a column (layer)
//! and a vertical span, then gives every link a breadth and endpoint offsets. The algorithm is
//! the classic multi-pass relaxation used by d3-sankey:
//! 1. index nodes and build source/target adjacency,
//! 2. compute node values from link sums (or a fixed value),
//! 3. compute depth and height by breadth-first layering, rejecting cycles,
//! 4. assign columns (justified by default),
//! 5. stack nodes per column proportionally to value, then center them,
//! 6. relax positions for a fixed number of iterations, resolving collisions,
//! 7. compute link breadths and endpoint offsets.
//!
//! Nodes and links are stored in flat arrays and reference each other by index. The layout is
//! fully deterministic: identical input produces bit-identical output.

#![no_std]

extern crate alloc;

mod graph;
mod layout;

pub use graph::{SankeyGraph, SankeyLinkInput, SankeyNodeInput};
pub use layout::{NodeAlign, SankeyLayout, SankeyLink, SankeyNode, SankeySolver};

use alloc::string::String;

/// Errors produced while laying out a Sankey graph.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SankeyError {
    /// The graph contains a cycle, so layering never terminates.
    #[error("circular link")]
    CircularLink,
    /// A link names a node id that is not part of the node list.
    #[error("missing node `{id}`")]
    MissingNode {
        /// The unresolved node id.
        id: String,
    },
}
