//! Clustered layout generator.
//!
//! Scatters each cluster's nodes on a jittered ring around its centre,
//! wires nodes inside a cluster at random, then bridges clusters whose
//! centroids sit close together:
//! - Angles step evenly around the ring with a small random lead
//! - Radial distance keeps nodes out of the exact centre
//! - Node size follows the cluster tier
//! - Nearby clusters get one bridge, very close ones get two

use crate::error::{GraphError, Result};
use crate::generators::Generator;
use crate::graph::{
    mean_position, Cluster, ClusterGraph, Edge, EdgeKind, Graph, Group, Node, Tier,
};
use crate::rng::RandomStream;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

/// Probability that a pair of nodes in the same cluster is connected.
pub const INTRA_EDGE_PROBABILITY: f64 = 0.55;

/// Maximum random angular lead added to each ring slot, in radians.
const ANGLE_JITTER: f64 = 0.6;

/// Nodes sit between 30% and 100% of the cluster radius.
const MIN_RADIAL_FRACTION: f64 = 0.3;
const RADIAL_SPAN: f64 = 0.7;

/// Random growth added on top of the tier's base node size.
const SIZE_JITTER: f64 = 0.8;

/// When and how densely clusters are bridged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BridgeRule {
    /// Centroids closer than this are bridged.
    #[serde(default = "default_max_distance")]
    pub max_distance: f64,

    /// Centroids closer than this get `dense_count` bridges instead of one.
    #[serde(default = "default_dense_distance")]
    pub dense_distance: f64,

    #[serde(default = "default_dense_count")]
    pub dense_count: usize,
}

impl Default for BridgeRule {
    fn default() -> Self {
        Self {
            max_distance: default_max_distance(),
            dense_distance: default_dense_distance(),
            dense_count: default_dense_count(),
        }
    }
}

fn default_max_distance() -> f64 {
    350.0
}

fn default_dense_distance() -> f64 {
    200.0
}

fn default_dense_count() -> usize {
    2
}

impl BridgeRule {
    /// Number of bridges for two centroids `distance` apart.
    pub fn bridges_for(&self, distance: f64) -> usize {
        if distance >= self.max_distance {
            0
        } else if distance < self.dense_distance {
            self.dense_count
        } else {
            1
        }
    }
}

/// Base node size for a tier, before jitter.
pub fn tier_base_size(tier: Tier) -> f64 {
    match tier {
        Tier::Core => 4.5,
        Tier::Primary => 3.2,
        Tier::Peripheral => 2.2,
    }
}

/// Builds a [`ClusterGraph`] from a literal cluster table.
#[derive(Debug, Clone)]
pub struct ClusterGenerator {
    pub clusters: Vec<Cluster>,
    pub bridges: BridgeRule,
}

impl ClusterGenerator {
    pub fn new(clusters: Vec<Cluster>) -> Self {
        Self {
            clusters,
            bridges: BridgeRule::default(),
        }
    }

    pub fn with_bridges(mut self, bridges: BridgeRule) -> Self {
        self.bridges = bridges;
        self
    }

    /// Place every cluster's nodes, in table order.
    ///
    /// Three draws per node: angle lead, radial fraction, size jitter.
    fn place_nodes(&self, rng: &mut RandomStream) -> Vec<Node> {
        let mut nodes = Vec::with_capacity(self.clusters.iter().map(|c| c.node_count).sum());

        for (group, cluster) in self.clusters.iter().enumerate() {
            for slot in 0..cluster.node_count {
                let angle = (slot as f64 / cluster.node_count as f64) * PI * 2.0
                    + rng.next_f64() * ANGLE_JITTER;
                let dist = cluster.radius * (MIN_RADIAL_FRACTION + rng.next_f64() * RADIAL_SPAN);
                let size = tier_base_size(cluster.tier) + rng.next_f64() * SIZE_JITTER;

                nodes.push(Node {
                    id: nodes.len(),
                    x: cluster.center_x + angle.cos() * dist,
                    y: cluster.center_y + angle.sin() * dist,
                    size,
                    group,
                    tier: cluster.tier,
                    label: None,
                });
            }
        }

        nodes
    }

    /// One draw per unordered pair inside each cluster.
    fn intra_edges(&self, nodes: &[Node], rng: &mut RandomStream) -> Vec<Edge> {
        let mut edges = Vec::new();
        let mut start = 0;

        for cluster in &self.clusters {
            let members = &nodes[start..start + cluster.node_count];
            for (i, a) in members.iter().enumerate() {
                for b in &members[i + 1..] {
                    if rng.next_f64() < INTRA_EDGE_PROBABILITY {
                        edges.push(Edge::new(a.id, b.id, EdgeKind::Intra));
                    }
                }
            }
            start += cluster.node_count;
        }

        edges
    }

    /// Bridge every close cluster pair.
    ///
    /// Endpoints are sampled independently with replacement, so two bridges
    /// between one pair can land on the same two nodes. That is kept as-is.
    fn bridge_edges(&self, nodes: &[Node], rng: &mut RandomStream) -> Vec<Edge> {
        let mut ranges = Vec::with_capacity(self.clusters.len());
        let mut start = 0;
        for cluster in &self.clusters {
            ranges.push(start..start + cluster.node_count);
            start += cluster.node_count;
        }

        let centroids: Vec<Option<(f64, f64)>> = ranges
            .iter()
            .map(|range| mean_position(&nodes[range.clone()]))
            .collect();

        let mut edges = Vec::new();
        for a in 0..self.clusters.len() {
            for b in (a + 1)..self.clusters.len() {
                let (Some(ca), Some(cb)) = (centroids[a], centroids[b]) else {
                    continue;
                };
                let distance = ((cb.0 - ca.0).powi(2) + (cb.1 - ca.1).powi(2)).sqrt();
                let count = self.bridges.bridges_for(distance);
                let first_bridge = edges.len();

                for _ in 0..count {
                    let from = Self::sample(&ranges[a], rng);
                    let to = Self::sample(&ranges[b], rng);
                    edges.push(Edge::new(from, to, EdgeKind::Bridge));
                }

                let added = &edges[first_bridge..];
                let duplicated = added
                    .iter()
                    .enumerate()
                    .any(|(i, edge)| added[i + 1..].contains(edge));
                if duplicated {
                    debug!(
                        from = %self.clusters[a].label,
                        to = %self.clusters[b].label,
                        "parallel duplicate bridge between the same node pair"
                    );
                }
            }
        }

        edges
    }

    fn sample(range: &std::ops::Range<usize>, rng: &mut RandomStream) -> usize {
        // Ranges reaching here are non-empty: empty clusters have no centroid.
        range.start + rng.next_index(range.len()).unwrap_or(0)
    }
}

impl Generator for ClusterGenerator {
    type Group = Cluster;

    fn name(&self) -> &'static str {
        "clusters"
    }

    fn check(&self) -> Result<()> {
        for cluster in &self.clusters {
            cluster.validate()?;
        }
        let distances = [
            ("clusters.bridges.max_distance", self.bridges.max_distance),
            ("clusters.bridges.dense_distance", self.bridges.dense_distance),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(GraphError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }

    fn generate(&self, seed: i64) -> ClusterGraph {
        for cluster in self.clusters.iter().filter(|c| c.node_count == 0) {
            debug!(cluster = %cluster.label, "empty cluster contributes no nodes");
        }

        let mut rng = RandomStream::new(seed);
        let nodes = self.place_nodes(&mut rng);
        let mut edges = self.intra_edges(&nodes, &mut rng);
        let intra = edges.len();
        edges.extend(self.bridge_edges(&nodes, &mut rng));

        debug!(
            seed,
            nodes = nodes.len(),
            intra,
            bridges = edges.len() - intra,
            "generated cluster graph"
        );

        Graph::from_parts(self.clusters.clone(), nodes, edges).assert_well_formed(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_clusters() -> Vec<Cluster> {
        vec![
            Cluster::new("core", (350.0, 210.0), 30.0, 5, Tier::Core),
            Cluster::new("left", (160.0, 110.0), 60.0, 6, Tier::Primary),
        ]
    }

    #[test]
    fn seed_42_places_eleven_nodes() {
        let graph = ClusterGenerator::new(scenario_clusters()).generate(42);
        assert_eq!(graph.nodes().len(), 11);
        let ids: Vec<usize> = graph.nodes().iter().map(|n| n.id).collect();
        assert_eq!(ids, (0..11).collect::<Vec<_>>());
        assert!(graph.nodes()[..5].iter().all(|n| n.group == 0));
        assert!(graph.nodes()[5..].iter().all(|n| n.group == 1));
    }

    #[test]
    fn first_node_follows_ring_formula() {
        let graph = ClusterGenerator::new(scenario_clusters()).generate(42);

        let mut rng = RandomStream::new(42);
        let angle = 0.0 + rng.next_f64() * 0.6;
        let dist = 30.0 * (0.3 + rng.next_f64() * 0.7);
        let size = 4.5 + rng.next_f64() * 0.8;

        let first = &graph.nodes()[0];
        assert_eq!(first.x, 350.0 + angle.cos() * dist);
        assert_eq!(first.y, 210.0 + angle.sin() * dist);
        assert_eq!(first.size, size);
        assert_eq!(first.tier, Tier::Core);
    }

    #[test]
    fn nodes_stay_within_cluster_radius() {
        let graph = ClusterGenerator::new(scenario_clusters()).generate(7);
        for node in graph.nodes() {
            let cluster = &graph.clusters()[node.group];
            let d = ((node.x - cluster.center_x).powi(2) + (node.y - cluster.center_y).powi(2))
                .sqrt();
            assert!(d <= cluster.radius + 1e-9);
            assert!(d >= cluster.radius * MIN_RADIAL_FRACTION - 1e-9);
        }
    }

    #[test]
    fn sizes_follow_tier() {
        let graph = ClusterGenerator::new(scenario_clusters()).generate(5);
        for node in graph.nodes() {
            let base = tier_base_size(node.tier);
            assert!(node.size >= base && node.size < base + SIZE_JITTER);
        }
    }

    #[test]
    fn empty_cluster_is_skipped() {
        let clusters = vec![
            Cluster::new("a", (0.0, 0.0), 20.0, 4, Tier::Core),
            Cluster::new("empty", (30.0, 0.0), 20.0, 0, Tier::Primary),
            Cluster::new("b", (60.0, 0.0), 20.0, 3, Tier::Peripheral),
        ];
        let graph = ClusterGenerator::new(clusters).generate(11);
        assert_eq!(graph.nodes().len(), 7);
        assert!(graph.nodes().iter().all(|n| n.group != 1));
        assert!(graph.edges().iter().all(|e| {
            graph.nodes()[e.from].group != 1 && graph.nodes()[e.to].group != 1
        }));
    }

    #[test]
    fn single_node_cluster_has_no_intra_edges() {
        let clusters = vec![Cluster::new("solo", (0.0, 0.0), 10.0, 1, Tier::Core)];
        let graph = ClusterGenerator::new(clusters).generate(3);
        assert_eq!(graph.nodes().len(), 1);
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn bridge_rule_thresholds() {
        let rule = BridgeRule::default();
        assert_eq!(rule.bridges_for(120.0), 2);
        assert_eq!(rule.bridges_for(199.9), 2);
        assert_eq!(rule.bridges_for(200.0), 1);
        assert_eq!(rule.bridges_for(349.9), 1);
        assert_eq!(rule.bridges_for(350.0), 0);
        assert_eq!(rule.bridges_for(400.0), 0);
    }

    #[test]
    fn custom_bridge_rule_is_honoured() {
        let clusters = vec![
            Cluster::new("a", (0.0, 0.0), 5.0, 3, Tier::Core),
            Cluster::new("b", (500.0, 0.0), 5.0, 3, Tier::Core),
        ];
        let rule = BridgeRule {
            max_distance: 1000.0,
            dense_distance: 600.0,
            dense_count: 3,
        };
        let graph = ClusterGenerator::new(clusters).with_bridges(rule).generate(9);
        let bridges = graph
            .edges()
            .iter()
            .filter(|e| e.kind == EdgeKind::Bridge)
            .count();
        assert_eq!(bridges, 3);
    }

    #[test]
    fn check_flags_bad_tables() {
        let mut clusters = scenario_clusters();
        assert_eq!(ClusterGenerator::new(clusters.clone()).check(), Ok(()));
        clusters[1].radius = -5.0;
        assert!(matches!(
            ClusterGenerator::new(clusters).check(),
            Err(GraphError::InvalidCluster { .. })
        ));
    }

    #[test]
    fn bridge_counts_follow_graph_centroids() {
        let clusters = crate::presets::site_clusters();
        let rule = BridgeRule::default();
        let graph = ClusterGenerator::new(clusters.clone()).generate(42);

        for a in 0..clusters.len() {
            for b in (a + 1)..clusters.len() {
                let (ca, cb) = (graph.centroid(a).unwrap(), graph.centroid(b).unwrap());
                let distance = ((cb.0 - ca.0).powi(2) + (cb.1 - ca.1).powi(2)).sqrt();
                let bridges = graph
                    .edges()
                    .iter()
                    .filter(|e| e.kind == EdgeKind::Bridge)
                    .filter(|e| graph.nodes()[e.from].group == a && graph.nodes()[e.to].group == b)
                    .count();
                assert_eq!(bridges, rule.bridges_for(distance), "clusters {a} and {b}");
            }
        }
    }

    #[test]
    fn parallel_bridges_are_kept() {
        // One node each, so both bridges must join the same pair.
        let clusters = vec![
            Cluster::new("a", (100.0, 100.0), 0.0, 1, Tier::Core),
            Cluster::new("b", (150.0, 100.0), 0.0, 1, Tier::Primary),
        ];
        let graph = ClusterGenerator::new(clusters).generate(42);
        assert_eq!(
            graph.edges(),
            &[
                Edge::new(0, 1, EdgeKind::Bridge),
                Edge::new(0, 1, EdgeKind::Bridge)
            ]
        );
        assert_eq!(graph.validate(), Ok(()));
    }

    #[test]
    fn intra_edges_are_ordered_pairs() {
        let graph = ClusterGenerator::new(scenario_clusters()).generate(42);
        for edge in graph.edges().iter().filter(|e| e.is_intra_cluster()) {
            assert!(edge.from < edge.to);
        }
    }
}
