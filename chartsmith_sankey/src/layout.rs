// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The Sankey relaxation solver.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::mem;

use kurbo::{BezPath, Point, Rect};

use crate::{SankeyError, SankeyGraph};

/// How nodes are assigned to columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeAlign {
    /// Column is the node depth (distance from a source node).
    Left,
    /// Column counts back from the right edge by node height.
    Right,
    /// Like [`NodeAlign::Left`], but sink nodes are pushed to the last column.
    #[default]
    Justify,
    /// Like [`NodeAlign::Left`], but source nodes are pulled next to their first target.
    Center,
}

/// A positioned node.
#[derive(Clone, Debug, PartialEq)]
pub struct SankeyNode {
    /// The node id from the input graph.
    pub id: String,
    /// Fixed value, or the larger of incoming and outgoing link sums.
    pub value: f64,
    /// Longest path length from a source node.
    pub depth: usize,
    /// Longest path length to a sink node.
    pub height: usize,
    /// Assigned column.
    pub layer: usize,
    /// Left edge.
    pub x0: f64,
    /// Right edge.
    pub x1: f64,
    /// Top edge.
    pub y0: f64,
    /// Bottom edge.
    pub y1: f64,
    /// Outgoing link indices, ordered by target position.
    pub source_links: Vec<usize>,
    /// Incoming link indices, ordered by source position.
    pub target_links: Vec<usize>,
}

impl SankeyNode {
    /// Returns the node rectangle.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x0, self.y0, self.x1, self.y1)
    }
}

/// A positioned link.
#[derive(Clone, Debug, PartialEq)]
pub struct SankeyLink {
    /// Index of the source node.
    pub source: usize,
    /// Index of the target node.
    pub target: usize,
    /// Link magnitude.
    pub value: f64,
    /// Stroke breadth in pixels.
    pub width: f64,
    /// Vertical center of the link at the source node.
    pub y0: f64,
    /// Vertical center of the link at the target node.
    pub y1: f64,
}

/// Result of [`SankeySolver::solve`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SankeyLayout {
    /// Nodes, in input order.
    pub nodes: Vec<SankeyNode>,
    /// Links, in input order.
    pub links: Vec<SankeyLink>,
}

impl SankeyLayout {
    /// Returns the horizontal cubic path along the center of link `index`.
    ///
    /// Stroke the path with the link's `width` to draw the band.
    #[must_use]
    pub fn link_path(&self, index: usize) -> Option<BezPath> {
        let link = self.links.get(index)?;
        let x0 = self.nodes.get(link.source)?.x1;
        let x1 = self.nodes.get(link.target)?.x0;
        let mid = (x0 + x1) * 0.5;
        let mut path = BezPath::new();
        path.move_to(Point::new(x0, link.y0));
        path.curve_to(
            Point::new(mid, link.y0),
            Point::new(mid, link.y1),
            Point::new(x1, link.y1),
        );
        Some(path)
    }
}

/// Lays out a [`SankeyGraph`] inside an extent.
#[derive(Clone, Debug, PartialEq)]
pub struct SankeySolver {
    extent: Rect,
    node_width: f64,
    node_padding: f64,
    iterations: usize,
    align: NodeAlign,
}

impl SankeySolver {
    /// Creates a solver for the given extent with default node width (24), padding (8),
    /// six relaxation iterations and justified columns.
    #[must_use]
    pub fn new(extent: Rect) -> Self {
        Self {
            extent: extent.abs(),
            node_width: 24.0,
            node_padding: 8.0,
            iterations: 6,
            align: NodeAlign::Justify,
        }
    }

    /// Sets the node rectangle width.
    #[must_use]
    pub fn with_node_width(mut self, node_width: f64) -> Self {
        self.node_width = node_width.max(0.0);
        self
    }

    /// Sets the minimum vertical gap between nodes in a column.
    #[must_use]
    pub fn with_node_padding(mut self, node_padding: f64) -> Self {
        self.node_padding = node_padding.max(0.0);
        self
    }

    /// Sets the number of relaxation passes.
    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the column alignment.
    #[must_use]
    pub fn with_align(mut self, align: NodeAlign) -> Self {
        self.align = align;
        self
    }

    /// Computes node and link geometry.
    ///
    /// Returns [`SankeyError::CircularLink`] if the graph has a cycle and
    /// [`SankeyError::MissingNode`] if a link references an unknown id.
    pub fn solve(&self, graph: &SankeyGraph) -> Result<SankeyLayout, SankeyError> {
        let endpoints = graph.link_endpoints()?;
        let links: Vec<SankeyLink> = endpoints
            .iter()
            .zip(&graph.links)
            .map(|(&(source, target), input)| SankeyLink {
                source,
                target,
                value: input.value,
                width: 0.0,
                y0: 0.0,
                y1: 0.0,
            })
            .collect();
        let mut nodes: Vec<SankeyNode> = graph
            .nodes
            .iter()
            .map(|input| SankeyNode {
                id: input.id.clone(),
                value: 0.0,
                depth: 0,
                height: 0,
                layer: 0,
                x0: 0.0,
                x1: 0.0,
                y0: 0.0,
                y1: 0.0,
                source_links: Vec::new(),
                target_links: Vec::new(),
            })
            .collect();
        for (i, link) in links.iter().enumerate() {
            nodes[link.source].source_links.push(i);
            nodes[link.target].target_links.push(i);
        }
        for (node, input) in nodes.iter_mut().zip(&graph.nodes) {
            node.value = match input.fixed_value {
                Some(value) => value,
                None => {
                    let out: f64 = node.source_links.iter().map(|&l| links[l].value).sum();
                    let inc: f64 = node.target_links.iter().map(|&l| links[l].value).sum();
                    out.max(inc)
                }
            };
        }

        log::debug!(
            "sankey: solving {} nodes, {} links in {:?}",
            nodes.len(),
            links.len(),
            self.extent
        );

        compute_depths(&mut nodes, &links)?;
        compute_heights(&mut nodes, &links)?;

        let mut state = Solve {
            solver: self,
            py: self.node_padding,
            nodes,
            links,
        };
        state.compute_node_breadths();
        state.compute_link_breadths();

        Ok(SankeyLayout {
            nodes: state.nodes,
            links: state.links,
        })
    }
}

/// Breadth-first layering: each frontier is assigned the current step until it empties.
fn layer_by(
    nodes: &[SankeyNode],
    links: &[SankeyLink],
    forward: bool,
) -> Result<Vec<usize>, SankeyError> {
    let n = nodes.len();
    let mut out = vec![0_usize; n];
    let mut current: Vec<usize> = (0..n).collect();
    let mut in_next = vec![false; n];
    let mut x = 0;
    while !current.is_empty() {
        let mut next = Vec::new();
        for &node in &current {
            out[node] = x;
            let adjacent = if forward {
                &nodes[node].source_links
            } else {
                &nodes[node].target_links
            };
            for &l in adjacent {
                let other = if forward {
                    links[l].target
                } else {
                    links[l].source
                };
                if !in_next[other] {
                    in_next[other] = true;
                    next.push(other);
                }
            }
        }
        x += 1;
        if x > n {
            log::warn!("sankey: cycle detected after {x} layering steps");
            return Err(SankeyError::CircularLink);
        }
        for &node in &next {
            in_next[node] = false;
        }
        current = next;
    }
    Ok(out)
}

fn compute_depths(nodes: &mut [SankeyNode], links: &[SankeyLink]) -> Result<(), SankeyError> {
    let depths = layer_by(nodes, links, true)?;
    for (node, depth) in nodes.iter_mut().zip(depths) {
        node.depth = depth;
    }
    Ok(())
}

fn compute_heights(nodes: &mut [SankeyNode], links: &[SankeyLink]) -> Result<(), SankeyError> {
    let heights = layer_by(nodes, links, false)?;
    for (node, height) in nodes.iter_mut().zip(heights) {
        node.height = height;
    }
    Ok(())
}

struct Solve<'a> {
    solver: &'a SankeySolver,
    py: f64,
    nodes: Vec<SankeyNode>,
    links: Vec<SankeyLink>,
}

impl Solve<'_> {
    fn align(&self, node: usize, columns: usize) -> usize {
        let n = &self.nodes[node];
        let last = columns.saturating_sub(1);
        match self.solver.align {
            NodeAlign::Left => n.depth,
            NodeAlign::Right => last.saturating_sub(n.height),
            NodeAlign::Justify => {
                if n.source_links.is_empty() {
                    last
                } else {
                    n.depth
                }
            }
            NodeAlign::Center => {
                if !n.target_links.is_empty() {
                    n.depth
                } else {
                    n.source_links
                        .iter()
                        .map(|&l| self.nodes[self.links[l].target].depth)
                        .min()
                        .map_or(0, |d| d.saturating_sub(1))
                }
            }
        }
    }

    fn compute_node_layers(&mut self) -> Vec<Vec<usize>> {
        let count = self.nodes.iter().map(|n| n.depth).max().map_or(0, |d| d + 1);
        let extent = self.solver.extent;
        let dx = self.solver.node_width;
        let kx = if count > 1 {
            (extent.width() - dx) / (count - 1) as f64
        } else {
            0.0
        };
        let mut columns: Vec<Vec<usize>> = vec![Vec::new(); count];
        for i in 0..self.nodes.len() {
            let layer = self.align(i, count).min(count.saturating_sub(1));
            let node = &mut self.nodes[i];
            node.layer = layer;
            node.x0 = extent.x0 + layer as f64 * kx;
            node.x1 = node.x0 + dx;
            columns[layer].push(i);
        }
        columns.retain(|c| !c.is_empty());
        columns
    }

    fn compute_node_breadths(&mut self) {
        let mut columns = self.compute_node_layers();
        let extent = self.solver.extent;
        let max_len = columns.iter().map(Vec::len).max().unwrap_or(0);
        if max_len > 1 {
            self.py = self
                .solver
                .node_padding
                .min(extent.height() / (max_len - 1) as f64);
        }
        self.initialize_node_breadths(&columns);

        let iterations = self.solver.iterations;
        let mut alpha: f64 = 1.0;
        for i in 0..iterations {
            let beta = (1.0 - alpha).max((i + 1) as f64 / iterations as f64);
            log::trace!("sankey: relaxation pass {i} (alpha {alpha:.4}, beta {beta:.4})");
            self.relax_right_to_left(&mut columns, alpha, beta);
            self.relax_left_to_right(&mut columns, alpha, beta);
            alpha *= 0.99;
        }
    }

    fn initialize_node_breadths(&mut self, columns: &[Vec<usize>]) {
        let extent = self.solver.extent;
        let py = self.py;
        let ky = columns
            .iter()
            .filter_map(|column| {
                let sum: f64 = column.iter().map(|&n| self.nodes[n].value).sum();
                (sum > 0.0)
                    .then(|| (extent.height() - (column.len() - 1) as f64 * py) / sum)
            })
            .reduce(f64::min)
            .unwrap_or(0.0)
            .max(0.0);

        for column in columns {
            let mut y = extent.y0;
            for &n in column {
                let node = &mut self.nodes[n];
                node.y0 = y;
                node.y1 = y + node.value * ky;
                y = node.y1 + py;
                for l in node.source_links.clone() {
                    self.links[l].width = self.links[l].value * ky;
                }
            }
            let spare = (extent.y1 - y + py) / (column.len() + 1) as f64;
            for (i, &n) in column.iter().enumerate() {
                let shift = spare * (i + 1) as f64;
                self.nodes[n].y0 += shift;
                self.nodes[n].y1 += shift;
            }
            self.reorder_links(column);
        }
    }

    fn relax_left_to_right(&mut self, columns: &mut [Vec<usize>], alpha: f64, beta: f64) {
        for i in 1..columns.len() {
            for &target in &columns[i] {
                let mut y = 0.0;
                let mut w = 0.0;
                for &l in &self.nodes[target].target_links {
                    let source = self.links[l].source;
                    let v = self.links[l].value * self.layer_span(source, target);
                    y += self.target_top(source, target) * v;
                    w += v;
                }
                if w <= 0.0 || w.is_nan() {
                    continue;
                }
                let dy = (y / w - self.nodes[target].y0) * alpha;
                self.nodes[target].y0 += dy;
                self.nodes[target].y1 += dy;
                self.reorder_node_links(target);
            }
            self.sort_by_breadth(&mut columns[i]);
            self.resolve_collisions(&columns[i], beta);
        }
    }

    fn relax_right_to_left(&mut self, columns: &mut [Vec<usize>], alpha: f64, beta: f64) {
        for i in (0..columns.len().saturating_sub(1)).rev() {
            for &source in &columns[i] {
                let mut y = 0.0;
                let mut w = 0.0;
                for &l in &self.nodes[source].source_links {
                    let target = self.links[l].target;
                    let v = self.links[l].value * self.layer_span(source, target);
                    y += self.source_top(source, target) * v;
                    w += v;
                }
                if w <= 0.0 || w.is_nan() {
                    continue;
                }
                let dy = (y / w - self.nodes[source].y0) * alpha;
                self.nodes[source].y0 += dy;
                self.nodes[source].y1 += dy;
                self.reorder_node_links(source);
            }
            self.sort_by_breadth(&mut columns[i]);
            self.resolve_collisions(&columns[i], beta);
        }
    }

    fn layer_span(&self, source: usize, target: usize) -> f64 {
        self.nodes[target].layer as f64 - self.nodes[source].layer as f64
    }

    fn sort_by_breadth(&self, column: &mut [usize]) {
        column.sort_by(|&a, &b| self.nodes[a].y0.total_cmp(&self.nodes[b].y0));
    }

    fn resolve_collisions(&mut self, column: &[usize], alpha: f64) {
        if column.is_empty() {
            return;
        }
        let extent = self.solver.extent;
        let py = self.py;
        let mid = column.len() >> 1;
        let subject = &self.nodes[column[mid]];
        let (above, below) = (subject.y0 - py, subject.y1 + py);
        if mid > 0 {
            self.push_up(column, above, mid - 1, alpha);
        }
        self.push_down(column, below, mid + 1, alpha);
        self.push_up(column, extent.y1, column.len() - 1, alpha);
        self.push_down(column, extent.y0, 0, alpha);
    }

    /// Moves overlapping nodes at `start..` down, starting below `y`.
    fn push_down(&mut self, column: &[usize], mut y: f64, start: usize, alpha: f64) {
        for &n in column.iter().skip(start) {
            let node = &mut self.nodes[n];
            let dy = (y - node.y0) * alpha;
            if dy > 1e-6 {
                node.y0 += dy;
                node.y1 += dy;
            }
            y = node.y1 + self.py;
        }
    }

    /// Moves overlapping nodes at `..=start` up, starting above `y`.
    fn push_up(&mut self, column: &[usize], mut y: f64, start: usize, alpha: f64) {
        for &n in column[..=start].iter().rev() {
            let node = &mut self.nodes[n];
            let dy = (node.y1 - y) * alpha;
            if dy > 1e-6 {
                node.y0 -= dy;
                node.y1 -= dy;
            }
            y = node.y0 - self.py;
        }
    }

    fn by_target_breadth(&self, a: usize, b: usize) -> Ordering {
        let (ta, tb) = (self.links[a].target, self.links[b].target);
        self.nodes[ta]
            .y0
            .total_cmp(&self.nodes[tb].y0)
            .then(a.cmp(&b))
    }

    fn by_source_breadth(&self, a: usize, b: usize) -> Ordering {
        let (sa, sb) = (self.links[a].source, self.links[b].source);
        self.nodes[sa]
            .y0
            .total_cmp(&self.nodes[sb].y0)
            .then(a.cmp(&b))
    }

    fn sort_source_links(&mut self, node: usize) {
        let mut list = mem::take(&mut self.nodes[node].source_links);
        list.sort_by(|&a, &b| self.by_target_breadth(a, b));
        self.nodes[node].source_links = list;
    }

    fn sort_target_links(&mut self, node: usize) {
        let mut list = mem::take(&mut self.nodes[node].target_links);
        list.sort_by(|&a, &b| self.by_source_breadth(a, b));
        self.nodes[node].target_links = list;
    }

    /// Re-sorts the link lists of every neighbor after `node` moved.
    fn reorder_node_links(&mut self, node: usize) {
        for l in self.nodes[node].target_links.clone() {
            self.sort_source_links(self.links[l].source);
        }
        for l in self.nodes[node].source_links.clone() {
            self.sort_target_links(self.links[l].target);
        }
    }

    fn reorder_links(&mut self, column: &[usize]) {
        for &n in column {
            self.sort_source_links(n);
            self.sort_target_links(n);
        }
    }

    /// The `target.y0` that would make the link from `source` straight.
    fn target_top(&self, source: usize, target: usize) -> f64 {
        let (s, t) = (&self.nodes[source], &self.nodes[target]);
        let mut y = s.y0 - (s.source_links.len() as f64 - 1.0) * self.py / 2.0;
        for &l in &s.source_links {
            if self.links[l].target == target {
                break;
            }
            y += self.links[l].width + self.py;
        }
        for &l in &t.target_links {
            if self.links[l].source == source {
                break;
            }
            y -= self.links[l].width;
        }
        y
    }

    /// The `source.y0` that would make the link into `target` straight.
    fn source_top(&self, source: usize, target: usize) -> f64 {
        let (s, t) = (&self.nodes[source], &self.nodes[target]);
        let mut y = t.y0 - (t.target_links.len() as f64 - 1.0) * self.py / 2.0;
        for &l in &t.target_links {
            if self.links[l].source == source {
                break;
            }
            y += self.links[l].width + self.py;
        }
        for &l in &s.source_links {
            if self.links[l].target == target {
                break;
            }
            y -= self.links[l].width;
        }
        y
    }

    fn compute_link_breadths(&mut self) {
        for node in &self.nodes {
            let mut y0 = node.y0;
            let mut y1 = node.y0;
            for &l in &node.source_links {
                let link = &mut self.links[l];
                link.y0 = y0 + link.width / 2.0;
                y0 += link.width;
            }
            for &l in &node.target_links {
                let link = &mut self.links[l];
                link.y1 = y1 + link.width / 2.0;
                y1 += link.width;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::{SankeyLinkInput, SankeyNodeInput};

    fn energy() -> SankeyGraph {
        SankeyGraph::from_links(vec![
            SankeyLinkInput::new("coal", "power", 40.0),
            SankeyLinkInput::new("gas", "power", 20.0),
            SankeyLinkInput::new("gas", "heat", 15.0),
            SankeyLinkInput::new("power", "homes", 35.0),
            SankeyLinkInput::new("power", "industry", 25.0),
            SankeyLinkInput::new("heat", "homes", 15.0),
            SankeyLinkInput::new("gas", "export", 5.0),
        ])
    }

    fn solver() -> SankeySolver {
        SankeySolver::new(Rect::new(0.0, 0.0, 600.0, 400.0))
    }

    fn node<'a>(layout: &'a SankeyLayout, id: &str) -> &'a SankeyNode {
        layout
            .nodes
            .iter()
            .find(|n| n.id == id)
            .expect("node should exist")
    }

    #[test]
    fn identical_input_gives_identical_output() {
        let a = solver().solve(&energy()).unwrap();
        let b = solver().solve(&energy()).unwrap();
        assert_eq!(a, b);
        for (na, nb) in a.nodes.iter().zip(&b.nodes) {
            assert_eq!(na.y0.to_bits(), nb.y0.to_bits(), "y0 of {} drifted", na.id);
        }
    }

    #[test]
    fn cycle_is_rejected() {
        let graph = SankeyGraph::from_links(vec![
            SankeyLinkInput::new("a", "b", 1.0),
            SankeyLinkInput::new("b", "c", 1.0),
            SankeyLinkInput::new("c", "a", 1.0),
        ]);
        assert_eq!(solver().solve(&graph), Err(SankeyError::CircularLink));
    }

    #[test]
    fn values_depths_and_justified_layers() {
        let layout = solver().solve(&energy()).unwrap();
        let power = node(&layout, "power");
        assert_eq!(power.value, 60.0);
        assert_eq!(power.depth, 1);
        assert_eq!(power.height, 1);

        // Sinks are justified to the last column, even the shallow `export`.
        assert_eq!(node(&layout, "export").depth, 1);
        assert_eq!(node(&layout, "export").layer, 2);
        assert_eq!(node(&layout, "homes").layer, 2);
        assert_eq!(node(&layout, "coal").layer, 0);
        assert_eq!(node(&layout, "coal").x0, 0.0);
        assert_eq!(node(&layout, "homes").x1, 600.0);
        assert_eq!(node(&layout, "power").x0, (600.0 - 24.0) / 2.0);
    }

    #[test]
    fn fixed_value_overrides_link_sums() {
        let graph = SankeyGraph::new(
            vec![
                SankeyNodeInput::new("a").with_fixed_value(10.0),
                SankeyNodeInput::new("b"),
            ],
            vec![SankeyLinkInput::new("a", "b", 2.0)],
        );
        let layout = solver().solve(&graph).unwrap();
        assert_eq!(layout.nodes[0].value, 10.0);
        assert_eq!(layout.nodes[1].value, 2.0);
    }

    #[test]
    fn nodes_stay_inside_the_extent_without_overlap() {
        let layout = solver().solve(&energy()).unwrap();
        for n in &layout.nodes {
            assert!(n.y0 >= -1e-5 && n.y1 <= 400.0 + 1e-5, "{} escapes: {n:?}", n.id);
        }
        let mut last: std::vec::Vec<&SankeyNode> =
            layout.nodes.iter().filter(|n| n.layer == 2).collect();
        last.sort_by(|a, b| a.y0.total_cmp(&b.y0));
        for pair in last.windows(2) {
            assert!(pair[0].y1 <= pair[1].y0 + 1e-5, "overlap: {pair:?}");
        }
    }

    #[test]
    fn link_widths_fill_their_source_node() {
        let layout = solver().solve(&energy()).unwrap();
        let power_index = layout.nodes.iter().position(|n| n.id == "power").unwrap();
        let power = &layout.nodes[power_index];
        let out: f64 = power
            .source_links
            .iter()
            .map(|&l| layout.links[l].width)
            .sum();
        assert!((out - (power.y1 - power.y0)).abs() < 1e-9, "outgoing breadth mismatch");

        let first = &layout.links[power.source_links[0]];
        assert!((first.y0 - (power.y0 + first.width / 2.0)).abs() < 1e-9, "bad offset");
    }

    #[test]
    fn single_column_graph_does_not_produce_nan() {
        let graph = SankeyGraph::new(vec![SankeyNodeInput::new("only")], vec![]);
        let layout = solver().solve(&graph).unwrap();
        let only = &layout.nodes[0];
        assert_eq!(only.x0, 0.0);
        assert!(only.y0.is_finite() && only.y1.is_finite(), "{only:?}");
    }

    #[test]
    fn link_path_runs_between_node_edges() {
        let layout = solver().solve(&energy()).unwrap();
        let path = layout.link_path(0).unwrap();
        let link = &layout.links[0];
        let elements = path.elements();
        assert_eq!(elements.len(), 2);
        assert_eq!(
            elements[0],
            kurbo::PathEl::MoveTo(Point::new(layout.nodes[link.source].x1, link.y0))
        );
        assert!(layout.link_path(99).is_none());
    }
}
