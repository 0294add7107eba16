//! Layered pipeline generator.
//!
//! Lays each layer out as a vertical column and only ever wires layer i to
//! layer i + 1. Pairs near the "diagonal" (similar relative position in
//! their columns) are always connected; the rest are kept when a seeded
//! per-pair noise value is high, which keeps the bipartite wiring sparse.

use crate::error::{GraphError, Result};
use crate::generators::Generator;
use crate::graph::{Edge, EdgeKind, Graph, Group, Layer, Node, PipelineGraph, Tier};
use crate::rng::{RandomStream, MODULUS};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Vertical frame the columns are centred in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineCanvas {
    #[serde(default = "default_height")]
    pub height: f64,

    /// Vertical distance between neighbouring nodes of a column.
    #[serde(default = "default_pitch")]
    pub pitch: f64,
}

impl Default for PipelineCanvas {
    fn default() -> Self {
        Self {
            height: default_height(),
            pitch: default_pitch(),
        }
    }
}

fn default_height() -> f64 {
    400.0
}

fn default_pitch() -> f64 {
    56.0
}

impl PipelineCanvas {
    /// Vertical position of node `index` in a column of `count` nodes.
    pub fn node_y(&self, index: usize, count: usize) -> f64 {
        let middle = (count as f64 - 1.0) / 2.0;
        self.height / 2.0 + (index as f64 - middle) * self.pitch
    }
}

/// Builds a [`PipelineGraph`] from an ordered layer table.
#[derive(Debug, Clone)]
pub struct PipelineGenerator {
    pub layers: Vec<Layer>,
    pub canvas: PipelineCanvas,
    /// Pairs whose normalised index distance is below this are always wired.
    pub diagonal_band: f64,
    /// Off-diagonal pairs are wired when their noise exceeds this.
    pub noise_threshold: f64,
}

impl PipelineGenerator {
    pub fn new(layers: Vec<Layer>) -> Self {
        Self {
            layers,
            canvas: PipelineCanvas::default(),
            diagonal_band: 0.45,
            noise_threshold: 0.6,
        }
    }

    pub fn with_canvas(mut self, canvas: PipelineCanvas) -> Self {
        self.canvas = canvas;
        self
    }

    pub fn with_thresholds(mut self, diagonal_band: f64, noise_threshold: f64) -> Self {
        self.diagonal_band = diagonal_band;
        self.noise_threshold = noise_threshold;
        self
    }

    /// Columns of nodes, top to bottom, captioned from the layer tags.
    fn place_nodes(&self) -> Vec<Node> {
        let mut nodes = Vec::with_capacity(self.layers.iter().map(|l| l.node_count).sum());

        for (group, layer) in self.layers.iter().enumerate() {
            for index in 0..layer.node_count {
                nodes.push(Node {
                    id: nodes.len(),
                    x: layer.x,
                    y: self.canvas.node_y(index, layer.node_count),
                    size: layer.radius,
                    group,
                    tier: Tier::Primary,
                    label: layer.tag(index).map(str::to_string),
                });
            }
        }

        nodes
    }

    fn forward_edges(&self, seed: i64) -> Vec<Edge> {
        let mut edges = Vec::new();
        let mut start = 0;

        for (i, pair) in self.layers.windows(2).enumerate() {
            let (from_layer, to_layer) = (&pair[0], &pair[1]);
            let next_start = start + from_layer.node_count;

            for f in 0..from_layer.node_count {
                for t in 0..to_layer.node_count {
                    let d = (f as f64 / from_layer.node_count as f64
                        - t as f64 / to_layer.node_count as f64)
                        .abs();
                    if d < self.diagonal_band || pair_noise(seed, i, f, t) > self.noise_threshold {
                        edges.push(Edge::new(start + f, next_start + t, EdgeKind::Forward));
                    }
                }
            }

            start = next_start;
        }

        edges
    }
}

/// Deterministic noise in `[0, 1)` for the pair `(from, to)` between layer
/// `layer` and the next.
///
/// The pair is hashed multiplicatively into a Park–Miller state and a single
/// draw is taken, so wiring does not depend on visiting order.
pub fn pair_noise(seed: i64, layer: usize, from: usize, to: usize) -> f64 {
    let key = (layer as u64)
        .wrapping_mul(1_000_003)
        .wrapping_add((from as u64).wrapping_mul(7_919))
        .wrapping_add(to as u64)
        .wrapping_add(1)
        .wrapping_mul(2_654_435_761);
    let state = ((key % MODULUS) as i64).wrapping_add(seed);
    RandomStream::new(state).next_f64()
}

impl Generator for PipelineGenerator {
    type Group = Layer;

    fn name(&self) -> &'static str {
        "pipeline"
    }

    fn check(&self) -> Result<()> {
        for layer in &self.layers {
            layer.validate()?;
        }
        if !self.canvas.height.is_finite() || self.canvas.height <= 0.0 {
            return Err(GraphError::InvalidParameter {
                name: "pipeline.canvas.height",
                value: self.canvas.height,
            });
        }
        if !self.canvas.pitch.is_finite() || self.canvas.pitch <= 0.0 {
            return Err(GraphError::InvalidParameter {
                name: "pipeline.canvas.pitch",
                value: self.canvas.pitch,
            });
        }
        if !(0.0..=1.0).contains(&self.diagonal_band) {
            return Err(GraphError::InvalidParameter {
                name: "pipeline.diagonal_band",
                value: self.diagonal_band,
            });
        }
        if !(0.0..=1.0).contains(&self.noise_threshold) {
            return Err(GraphError::InvalidParameter {
                name: "pipeline.noise_threshold",
                value: self.noise_threshold,
            });
        }
        Ok(())
    }

    fn generate(&self, seed: i64) -> PipelineGraph {
        let nodes = self.place_nodes();
        let edges = self.forward_edges(seed);

        debug!(
            seed,
            layers = self.layers.len(),
            nodes = nodes.len(),
            edges = edges.len(),
            "generated pipeline graph"
        );

        Graph::from_parts(self.layers.clone(), nodes, edges).assert_well_formed(self.name())
    }
}
