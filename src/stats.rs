//! Structural statistics of a generated graph.
//!
//! Used by `meshgen inspect` and handy when tuning cluster tables: a table
//! whose bridges all vanish, or whose clusters come out nearly empty, shows
//! up here before anyone looks at a picture.

use crate::graph::{EdgeKind, Graph, Group};
use serde::Serialize;
use std::collections::HashSet;

/// Counts for one cluster or layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub label: String,
    pub nodes: usize,
    /// Edges with both endpoints in this group.
    pub internal_edges: usize,
    /// Edges with exactly one endpoint in this group.
    pub external_edges: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub intra_edges: usize,
    pub bridge_edges: usize,
    pub forward_edges: usize,
    pub mean_degree: f64,
    /// Edges over possible node pairs; parallel edges count twice.
    pub density: f64,
    /// Mean local clustering coefficient, nodes with degree < 2 counting 0.
    pub clustering: f64,
    /// Nodes without any edge.
    pub isolated: usize,
    pub groups: Vec<GroupStats>,
}

impl GraphStats {
    pub fn of<G: Group>(graph: &Graph<G>) -> Self {
        let n = graph.nodes().len();
        let edges = graph.edges();

        let count = |kind: EdgeKind| edges.iter().filter(|e| e.kind == kind).count();

        let mut groups: Vec<GroupStats> = graph
            .groups()
            .iter()
            .enumerate()
            .map(|(index, group)| GroupStats {
                label: group.label().to_string(),
                nodes: graph.members(index).count(),
                internal_edges: 0,
                external_edges: 0,
            })
            .collect();

        let mut degree = vec![0usize; n];
        for edge in edges {
            let (Some(a), Some(b)) = (graph.node(edge.from), graph.node(edge.to)) else {
                continue;
            };
            degree[a.id] += 1;
            degree[b.id] += 1;
            if a.group == b.group {
                groups[a.group].internal_edges += 1;
            } else {
                groups[a.group].external_edges += 1;
                groups[b.group].external_edges += 1;
            }
        }

        let pairs = n * n.saturating_sub(1) / 2;
        let mean_degree = if n > 0 {
            2.0 * edges.len() as f64 / n as f64
        } else {
            0.0
        };
        let density = if pairs > 0 {
            edges.len() as f64 / pairs as f64
        } else {
            0.0
        };
        let coefficients = clustering_coefficients(graph);
        let clustering = if n > 0 {
            coefficients.iter().sum::<f64>() / n as f64
        } else {
            0.0
        };

        Self {
            nodes: n,
            edges: edges.len(),
            intra_edges: count(EdgeKind::Intra),
            bridge_edges: count(EdgeKind::Bridge),
            forward_edges: count(EdgeKind::Forward),
            mean_degree,
            density,
            clustering,
            isolated: degree.iter().filter(|&&d| d == 0).count(),
            groups,
        }
    }
}

/// Local clustering coefficient per node, treating edges as undirected.
pub fn clustering_coefficients<G>(graph: &Graph<G>) -> Vec<f64> {
    let mut neighbors: Vec<HashSet<usize>> = vec![HashSet::new(); graph.nodes().len()];
    for edge in graph.edges() {
        if edge.from < neighbors.len() && edge.to < neighbors.len() {
            neighbors[edge.from].insert(edge.to);
            neighbors[edge.to].insert(edge.from);
        }
    }

    neighbors
        .iter()
        .map(|around| {
            let k = around.len();
            if k < 2 {
                return 0.0;
            }

            // Count edges between neighbors
            let around: Vec<usize> = around.iter().copied().collect();
            let mut linked = 0;
            for i in 0..around.len() {
                for j in (i + 1)..around.len() {
                    if neighbors[around[i]].contains(&around[j]) {
                        linked += 1;
                    }
                }
            }

            linked as f64 / (k * (k - 1) / 2) as f64
        })
        .collect()
}
