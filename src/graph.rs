//! Graph model shared by the generators, the scheduler and the renderer.
//!
//! A [`Graph`] is built once by a generator and read-only afterwards. Nodes
//! are grouped either by [`Cluster`] (free-form clustered layouts) or by
//! [`Layer`] (strictly layered pipelines); the grouping table travels with
//! the graph so renderers can colour and label without a second lookup.

use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Visual weight of a cluster. Does not affect connectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Central cluster, drawn largest.
    Core,
    /// Primary satellites.
    Primary,
    /// Peripheral clusters, drawn smallest.
    Peripheral,
}

impl Tier {
    /// Numeric rank: 0 core, 1 primary, 2 peripheral.
    pub fn index(self) -> u8 {
        match self {
            Tier::Core => 0,
            Tier::Primary => 1,
            Tier::Peripheral => 2,
        }
    }

    /// Inverse of [`Tier::index`].
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Tier::Core),
            1 => Some(Tier::Primary),
            2 => Some(Tier::Peripheral),
            _ => None,
        }
    }
}

/// Something nodes can be grouped by.
pub trait Group {
    /// Display label.
    fn label(&self) -> &str;

    /// Number of nodes the generator places in this group.
    fn node_count(&self) -> usize;

    /// Check the entry itself, independent of any graph.
    fn validate(&self) -> Result<()>;
}

/// A hand-placed cluster of nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Stable slug, e.g. `"core"`.
    pub id: String,
    pub center_x: f64,
    pub center_y: f64,
    /// Outer radius of the node scatter.
    pub radius: f64,
    pub node_count: usize,
    pub label: String,
    pub tier: Tier,
}

impl Cluster {
    /// Cluster labelled by its id.
    pub fn new(
        id: impl Into<String>,
        center: (f64, f64),
        radius: f64,
        node_count: usize,
        tier: Tier,
    ) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            center_x: center.0,
            center_y: center.1,
            radius,
            node_count,
            tier,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

impl Group for Cluster {
    fn label(&self) -> &str {
        &self.label
    }

    fn node_count(&self) -> usize {
        self.node_count
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| GraphError::InvalidCluster {
            label: self.label.clone(),
            reason: reason.to_string(),
        };
        if !self.center_x.is_finite() || !self.center_y.is_finite() {
            return Err(invalid("center must be finite"));
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(invalid("radius must be finite and non-negative"));
        }
        Ok(())
    }
}

/// One column of a layered pipeline diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Horizontal position of the column.
    pub x: f64,
    pub node_count: usize,
    /// Drawn radius of each node.
    pub radius: f64,
    pub label: String,
    /// Per-node captions, top to bottom. May be shorter than `node_count`.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Fill colour used by renderers.
    pub color: String,
}

impl Layer {
    pub fn new(label: impl Into<String>, x: f64, node_count: usize, radius: f64) -> Self {
        Self {
            x,
            node_count,
            radius,
            label: label.into(),
            tags: Vec::new(),
            color: "#6b7280".to_string(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Caption for the node at `index`, if one was configured.
    pub fn tag(&self, index: usize) -> Option<&str> {
        self.tags.get(index).map(String::as_str)
    }
}

impl Group for Layer {
    fn label(&self) -> &str {
        &self.label
    }

    fn node_count(&self) -> usize {
        self.node_count
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| GraphError::InvalidLayer {
            label: self.label.clone(),
            reason: reason.to_string(),
        };
        if !self.x.is_finite() {
            return Err(invalid("x must be finite"));
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(invalid("radius must be finite and non-negative"));
        }
        Ok(())
    }
}

/// A placed node. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    /// Dense sequential id, equal to the node's position in the graph.
    pub id: usize,
    pub x: f64,
    pub y: f64,
    /// Drawn radius.
    pub size: f64,
    /// Index of the owning cluster or layer in the graph's group table.
    pub group: usize,
    pub tier: Tier,
    /// Caption (pipeline tags); `None` when no caption applies.
    pub label: Option<String>,
}

/// How an edge relates its endpoints' groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Both endpoints in the same cluster.
    Intra,
    /// Endpoints in two different clusters.
    Bridge,
    /// From layer i to layer i + 1.
    Forward,
}

impl EdgeKind {
    fn tag(self) -> u8 {
        match self {
            EdgeKind::Intra => 0,
            EdgeKind::Bridge => 1,
            EdgeKind::Forward => 2,
        }
    }
}

/// An undirected (for rendering) connection between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(from: usize, to: usize, kind: EdgeKind) -> Self {
        Self { from, to, kind }
    }

    pub fn is_intra_cluster(&self) -> bool {
        self.kind == EdgeKind::Intra
    }
}

/// Mean position of `nodes`, or `None` when there are none.
pub fn mean_position<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Option<(f64, f64)> {
    let (mut sx, mut sy, mut count) = (0.0, 0.0, 0usize);
    for node in nodes {
        sx += node.x;
        sy += node.y;
        count += 1;
    }
    (count > 0).then(|| (sx / count as f64, sy / count as f64))
}

/// Generated graph: nodes, edges and the group table they were built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Graph<G> {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    groups: Vec<G>,
}

/// Graph grouped by clusters.
pub type ClusterGraph = Graph<Cluster>;

/// Graph grouped by pipeline layers.
pub type PipelineGraph = Graph<Layer>;

impl<G> Graph<G> {
    pub(crate) fn from_parts(groups: Vec<G>, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            nodes,
            edges,
            groups,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn groups(&self) -> &[G] {
        &self.groups
    }

    pub fn node(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Both endpoints of the edge at `index`.
    pub fn endpoints(&self, index: usize) -> Option<(&Node, &Node)> {
        let edge = self.edges.get(index)?;
        Some((self.node(edge.from)?, self.node(edge.to)?))
    }

    /// Nodes belonging to group `group`, in id order.
    pub fn members(&self, group: usize) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(move |n| n.group == group)
    }

    /// Mean position of a group's nodes; `None` for an empty group.
    pub fn centroid(&self, group: usize) -> Option<(f64, f64)> {
        mean_position(self.members(group))
    }

    /// SHA-256 over ids, coordinate bit patterns, groups and edges.
    ///
    /// Two graphs with the same fingerprint are identical for every purpose
    /// the renderer cares about.
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update((self.nodes.len() as u64).to_le_bytes());
        for node in &self.nodes {
            hasher.update((node.id as u64).to_le_bytes());
            hasher.update(node.x.to_bits().to_le_bytes());
            hasher.update(node.y.to_bits().to_le_bytes());
            hasher.update(node.size.to_bits().to_le_bytes());
            hasher.update((node.group as u64).to_le_bytes());
            hasher.update([node.tier.index()]);
            if let Some(label) = &node.label {
                hasher.update(label.as_bytes());
            }
            hasher.update([0xff]);
        }
        hasher.update((self.edges.len() as u64).to_le_bytes());
        for edge in &self.edges {
            hasher.update((edge.from as u64).to_le_bytes());
            hasher.update((edge.to as u64).to_le_bytes());
            hasher.update([edge.kind.tag()]);
        }
        hasher.finalize().into()
    }

    /// [`Graph::fingerprint`] as lowercase hex.
    pub fn fingerprint_hex(&self) -> String {
        self.fingerprint()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}

impl<G: Group> Graph<G> {
    /// Check every structural invariant.
    ///
    /// Ids are dense and grouped in table order, group sizes match the
    /// table, edges reference distinct existing nodes, and each edge kind
    /// respects its grouping rule.
    pub fn validate(&self) -> Result<()> {
        for group in &self.groups {
            group.validate()?;
        }

        let mut counts = vec![0usize; self.groups.len()];
        let mut last_group = 0;
        for (position, node) in self.nodes.iter().enumerate() {
            if node.id != position {
                return Err(GraphError::NonDenseIds {
                    position,
                    id: node.id,
                });
            }
            if node.group >= self.groups.len() {
                return Err(GraphError::UnknownGroup {
                    node: node.id,
                    group: node.group,
                });
            }
            if node.group < last_group {
                return Err(GraphError::GroupOrder {
                    node: node.id,
                    group: node.group,
                });
            }
            last_group = node.group;
            counts[node.group] += 1;
        }
        for (index, (group, actual)) in self.groups.iter().zip(&counts).enumerate() {
            if group.node_count() != *actual {
                return Err(GraphError::GroupSizeMismatch {
                    group: index,
                    label: group.label().to_string(),
                    expected: group.node_count(),
                    actual: *actual,
                });
            }
        }

        for (index, edge) in self.edges.iter().enumerate() {
            let from = self.node(edge.from).ok_or(GraphError::DanglingEdge {
                edge: index,
                node: edge.from,
            })?;
            let to = self.node(edge.to).ok_or(GraphError::DanglingEdge {
                edge: index,
                node: edge.to,
            })?;
            if from.id == to.id {
                return Err(GraphError::SelfLoop {
                    edge: index,
                    node: from.id,
                });
            }
            match edge.kind {
                EdgeKind::Intra if from.group != to.group => {
                    return Err(GraphError::IntraCrossesGroups {
                        edge: index,
                        from_group: from.group,
                        to_group: to.group,
                    });
                }
                EdgeKind::Bridge if from.group == to.group => {
                    return Err(GraphError::BridgeWithinGroup {
                        edge: index,
                        group: from.group,
                    });
                }
                EdgeKind::Forward if to.group != from.group + 1 => {
                    return Err(GraphError::ForwardSkipsLayer {
                        edge: index,
                        from_layer: from.group,
                        to_layer: to.group,
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Validate and panic on failure. Used by generators on their own output.
    pub(crate) fn assert_well_formed(self, generator: &str) -> Self {
        if let Err(err) = self.validate() {
            panic!("{generator} produced a malformed graph: {err}");
        }
        self
    }
}

impl ClusterGraph {
    pub fn clusters(&self) -> &[Cluster] {
        &self.groups
    }
}

impl PipelineGraph {
    pub fn layers(&self) -> &[Layer] {
        &self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: usize, group: usize, x: f64, y: f64) -> Node {
        Node {
            id,
            x,
            y,
            size: 2.0,
            group,
            tier: Tier::Primary,
            label: None,
        }
    }

    fn two_cluster_graph(edges: Vec<Edge>) -> ClusterGraph {
        Graph::from_parts(
            vec![
                Cluster::new("a", (0.0, 0.0), 10.0, 2, Tier::Core),
                Cluster::new("b", (100.0, 0.0), 10.0, 1, Tier::Primary),
            ],
            vec![
                node(0, 0, -1.0, 0.0),
                node(1, 0, 1.0, 0.0),
                node(2, 1, 100.0, 0.0),
            ],
            edges,
        )
    }

    #[test]
    fn well_formed_graph_validates() {
        let graph = two_cluster_graph(vec![
            Edge::new(0, 1, EdgeKind::Intra),
            Edge::new(1, 2, EdgeKind::Bridge),
        ]);
        assert_eq!(graph.validate(), Ok(()));
        assert!(graph.edges()[0].is_intra_cluster());
        assert!(!graph.edges()[1].is_intra_cluster());
    }

    #[test]
    fn self_loop_is_rejected() {
        let graph = two_cluster_graph(vec![Edge::new(1, 1, EdgeKind::Intra)]);
        assert_eq!(
            graph.validate(),
            Err(GraphError::SelfLoop { edge: 0, node: 1 })
        );
    }

    #[test]
    fn dangling_edge_is_rejected() {
        let graph = two_cluster_graph(vec![Edge::new(0, 9, EdgeKind::Bridge)]);
        assert_eq!(
            graph.validate(),
            Err(GraphError::DanglingEdge { edge: 0, node: 9 })
        );
    }

    #[test]
    fn edge_kinds_must_respect_groups() {
        let crossing = two_cluster_graph(vec![Edge::new(0, 2, EdgeKind::Intra)]);
        assert!(matches!(
            crossing.validate(),
            Err(GraphError::IntraCrossesGroups { .. })
        ));

        let inner_bridge = two_cluster_graph(vec![Edge::new(0, 1, EdgeKind::Bridge)]);
        assert!(matches!(
            inner_bridge.validate(),
            Err(GraphError::BridgeWithinGroup { group: 0, .. })
        ));
    }

    #[test]
    fn forward_edges_must_step_one_layer() {
        let layers = vec![
            Layer::new("in", 0.0, 1, 4.0),
            Layer::new("mid", 50.0, 1, 4.0),
            Layer::new("out", 100.0, 1, 4.0),
        ];
        let nodes = vec![
            node(0, 0, 0.0, 0.0),
            node(1, 1, 50.0, 0.0),
            node(2, 2, 100.0, 0.0),
        ];
        let ok: PipelineGraph = Graph::from_parts(
            layers.clone(),
            nodes.clone(),
            vec![
                Edge::new(0, 1, EdgeKind::Forward),
                Edge::new(1, 2, EdgeKind::Forward),
            ],
        );
        assert_eq!(ok.validate(), Ok(()));

        let skipping: PipelineGraph =
            Graph::from_parts(layers, nodes, vec![Edge::new(0, 2, EdgeKind::Forward)]);
        assert_eq!(
            skipping.validate(),
            Err(GraphError::ForwardSkipsLayer {
                edge: 0,
                from_layer: 0,
                to_layer: 2
            })
        );
    }

    #[test]
    fn ids_must_be_dense() {
        let mut graph = two_cluster_graph(Vec::new());
        graph.nodes[2].id = 5;
        assert_eq!(
            graph.validate(),
            Err(GraphError::NonDenseIds {
                position: 2,
                id: 5
            })
        );
    }

    #[test]
    fn group_sizes_must_match_table() {
        let mut graph = two_cluster_graph(Vec::new());
        graph.groups[1].node_count = 3;
        assert!(matches!(
            graph.validate(),
            Err(GraphError::GroupSizeMismatch {
                group: 1,
                expected: 3,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn invalid_cluster_entry_is_reported() {
        let mut graph = two_cluster_graph(Vec::new());
        graph.groups[0].radius = f64::NAN;
        assert!(matches!(
            graph.validate(),
            Err(GraphError::InvalidCluster { .. })
        ));
    }

    #[test]
    fn centroid_ignores_other_groups() {
        let graph = two_cluster_graph(Vec::new());
        assert_eq!(graph.centroid(0), Some((0.0, 0.0)));
        assert_eq!(graph.centroid(1), Some((100.0, 0.0)));
        assert_eq!(graph.centroid(7), None);
        assert_eq!(mean_position(&graph.nodes()[..2]), graph.centroid(0));
        assert_eq!(mean_position(&[] as &[Node]), None);
    }

    #[test]
    fn fingerprint_tracks_coordinates() {
        let a = two_cluster_graph(Vec::new());
        let mut b = a.clone();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.nodes[0].x += 1e-9;
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint_hex().len(), 64);
    }

    #[test]
    fn layer_tag_lookup_is_bounded() {
        let layer = Layer::new("embed", 0.0, 3, 5.0).with_tags(["tok", "pos"]);
        assert_eq!(layer.tag(0), Some("tok"));
        assert_eq!(layer.tag(1), Some("pos"));
        assert_eq!(layer.tag(2), None);
    }

    #[test]
    fn tier_round_trips_through_index() {
        for tier in [Tier::Core, Tier::Primary, Tier::Peripheral] {
            assert_eq!(Tier::from_index(tier.index()), Some(tier));
        }
        assert_eq!(Tier::from_index(3), None);
    }
}
