//! A generated graph paired with its animation schedule.
//!
//! Build a [`Diagram`] once (typically at startup) and hand references to
//! whatever renders it. Nothing here is cached behind the caller's back.

use crate::config::{ClusterSettings, PipelineSettings};
use crate::error::Result;
use crate::generators::cluster::ClusterGenerator;
use crate::generators::pipeline::PipelineGenerator;
use crate::generators::Generator;
use crate::graph::{Cluster, Graph, Group, Layer};
use crate::presets;
use crate::schedule::{build_schedule, Schedule, ScheduleOptions};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagram<G> {
    pub graph: Graph<G>,
    pub schedule: Schedule,
}

impl<G: Group> Diagram<G> {
    /// Check the inputs, generate the graph and schedule its signals.
    pub fn build<T>(
        generator: &T,
        seed: i64,
        schedule_seed: i64,
        options: &ScheduleOptions,
    ) -> Result<Self>
    where
        T: Generator<Group = G>,
    {
        generator.check()?;
        options.check()?;

        let graph = generator.generate(seed);
        let schedule = build_schedule(&graph, schedule_seed, options);

        info!(
            style = generator.name(),
            seed,
            nodes = graph.nodes().len(),
            edges = graph.edges().len(),
            signals = schedule.len(),
            "built diagram"
        );

        Ok(Self { graph, schedule })
    }
}

impl Diagram<Cluster> {
    /// Cluster diagram from settings, falling back to the site preset table.
    pub fn clusters(settings: &ClusterSettings) -> Result<Self> {
        let table = settings
            .table
            .clone()
            .unwrap_or_else(presets::site_clusters);
        let generator = ClusterGenerator::new(table).with_bridges(settings.bridges);
        Self::build(
            &generator,
            settings.seed,
            settings.schedule_seed,
            &settings.schedule_options(),
        )
    }
}

impl Diagram<Layer> {
    /// Pipeline diagram from settings, falling back to the site preset table.
    pub fn pipeline(settings: &PipelineSettings) -> Result<Self> {
        let table = settings.table.clone().unwrap_or_else(presets::site_layers);
        let generator = PipelineGenerator::new(table)
            .with_canvas(settings.canvas)
            .with_thresholds(settings.diagonal_band, settings.noise_threshold);
        Self::build(
            &generator,
            settings.seed,
            settings.schedule_seed,
            &settings.schedule_options(),
        )
    }
}
