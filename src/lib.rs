//! Meshgen - seeded node-and-edge diagrams with animated signals.
//!
//! Two generators turn a hand-written table into a graph: clustered layouts
//! (nodes scattered around cluster centres, bridges between nearby clusters)
//! and layered pipelines (columns of nodes, edges only between neighbouring
//! columns). A scheduler then picks which edges carry travelling signals and
//! when. Everything is driven by a Park-Miller stream, so the same seed gives
//! the same picture on every platform.

pub mod config;
pub mod diagram;
pub mod error;
pub mod generators;
pub mod graph;
pub mod presets;
pub mod render;
pub mod rng;
pub mod schedule;
pub mod stats;

pub use config::MeshgenConfig;
pub use diagram::Diagram;
pub use error::{GraphError, Result};
pub use generators::Generator;
pub use graph::{ClusterGraph, Graph, PipelineGraph};
pub use rng::RandomStream;
pub use schedule::{build_schedule, Schedule, ScheduleOptions};
