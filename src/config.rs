//! Configuration loading for meshgen.
//!
//! Configuration is loaded from TOML files with environment variable overrides.

use crate::error::GraphError;
use crate::generators::cluster::BridgeRule;
use crate::generators::pipeline::PipelineCanvas;
use crate::graph::{Cluster, Layer};
use crate::presets;
use crate::render::ThemeName;
use crate::schedule::{ScheduleOptions, ScheduleOverrides};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "config.default.toml";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MeshgenConfig {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub clusters: ClusterSettings,

    #[serde(default)]
    pub pipeline: PipelineSettings,

    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_directory")]
    pub directory: String,

    /// Also write graph + schedule as JSON next to each SVG.
    #[serde(default)]
    pub save_graph: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            save_graph: false,
        }
    }
}

fn default_directory() -> String {
    "output".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterSettings {
    #[serde(default = "default_cluster_seed")]
    pub seed: i64,

    #[serde(default = "default_cluster_schedule_seed")]
    pub schedule_seed: i64,

    #[serde(default)]
    pub bridges: BridgeRule,

    /// Timings; unset fields keep the cluster preset.
    #[serde(default)]
    pub schedule: ScheduleOverrides,

    /// Replaces the built-in cluster table when present.
    #[serde(default)]
    pub table: Option<Vec<Cluster>>,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            seed: default_cluster_seed(),
            schedule_seed: default_cluster_schedule_seed(),
            bridges: BridgeRule::default(),
            schedule: ScheduleOverrides::default(),
            table: None,
        }
    }
}

impl ClusterSettings {
    pub fn schedule_options(&self) -> ScheduleOptions {
        self.schedule.over(ScheduleOptions::clusters())
    }
}

fn default_cluster_seed() -> i64 {
    presets::SITE_CLUSTER_SEED
}

fn default_cluster_schedule_seed() -> i64 {
    presets::SITE_CLUSTER_SCHEDULE_SEED
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    #[serde(default = "default_pipeline_seed")]
    pub seed: i64,

    #[serde(default = "default_pipeline_schedule_seed")]
    pub schedule_seed: i64,

    #[serde(default)]
    pub canvas: PipelineCanvas,

    #[serde(default = "default_diagonal_band")]
    pub diagonal_band: f64,

    #[serde(default = "default_noise_threshold")]
    pub noise_threshold: f64,

    /// Timings; unset fields keep the pipeline preset.
    #[serde(default)]
    pub schedule: ScheduleOverrides,

    /// Replaces the built-in layer table when present.
    #[serde(default)]
    pub table: Option<Vec<Layer>>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            seed: default_pipeline_seed(),
            schedule_seed: default_pipeline_schedule_seed(),
            canvas: PipelineCanvas::default(),
            diagonal_band: default_diagonal_band(),
            noise_threshold: default_noise_threshold(),
            schedule: ScheduleOverrides::default(),
            table: None,
        }
    }
}

impl PipelineSettings {
    pub fn schedule_options(&self) -> ScheduleOptions {
        self.schedule.over(ScheduleOptions::pipeline())
    }
}

fn default_pipeline_seed() -> i64 {
    presets::SITE_PIPELINE_SEED
}

fn default_pipeline_schedule_seed() -> i64 {
    presets::SITE_PIPELINE_SCHEDULE_SEED
}

fn default_diagonal_band() -> f64 {
    0.45
}

fn default_noise_threshold() -> f64 {
    0.6
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub theme: ThemeName,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    /// Seconds a signal takes to cross its edge.
    #[serde(default = "default_travel")]
    pub travel: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            theme: ThemeName::default(),
            width: default_width(),
            height: default_height(),
            travel: default_travel(),
        }
    }
}

fn default_width() -> u32 {
    presets::CANVAS_WIDTH
}

fn default_height() -> u32 {
    presets::CANVAS_HEIGHT
}

fn default_travel() -> f64 {
    1.2
}

impl RenderConfig {
    /// `travel` must be finite and positive.
    pub fn check(&self) -> crate::error::Result<()> {
        if !self.travel.is_finite() || self.travel <= 0.0 {
            return Err(GraphError::InvalidParameter {
                name: "render.travel",
                value: self.travel,
            });
        }
        Ok(())
    }
}

impl MeshgenConfig {
    /// Layer the default file, the user file and `MESHGEN_*` variables.
    ///
    /// Nested keys use a double underscore, e.g. `MESHGEN_CLUSTERS__SEED=7`.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with(path, environment())
    }

    fn load_with(path: &Path, env: Environment) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false))
            .add_source(File::from(path).required(false))
            .add_source(env)
            .build()
            .with_context(|| format!("reading configuration from {}", path.display()))?;

        let meshgen_config: MeshgenConfig = config
            .try_deserialize()
            .context("configuration does not match the expected layout")?;
        meshgen_config
            .render
            .check()
            .context("invalid [render] section")?;
        Ok(meshgen_config)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("MESHGEN")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Selection;

    #[test]
    fn defaults_match_presets() {
        let config = MeshgenConfig::default();
        assert_eq!(config.clusters.seed, presets::SITE_CLUSTER_SEED);
        assert_eq!(config.pipeline.seed, presets::SITE_PIPELINE_SEED);
        assert_eq!(config.clusters.schedule_options(), ScheduleOptions::clusters());
        assert_eq!(config.pipeline.schedule_options().selection, Selection::Stride(3));
        assert_eq!(config.render.width, 700);
        assert_eq!(config.output.directory, "output");
        assert!(config.clusters.table.is_none());
    }

    #[test]
    fn custom_cluster_table_deserializes() {
        let toml = r#"
            [clusters]
            seed = 5

            [[clusters.table]]
            id = "a"
            center_x = 10.0
            center_y = 20.0
            radius = 5.0
            node_count = 3
            label = "Alpha"
            tier = "core"

            [render]
            theme = "light"
        "#;
        let config: MeshgenConfig = Config::builder()
            .add_source(File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.clusters.seed, 5);
        assert_eq!(config.clusters.schedule_seed, presets::SITE_CLUSTER_SCHEDULE_SEED);
        let table = config.clusters.table.unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].tier, crate::graph::Tier::Core);
        assert_eq!(table[0].label, "Alpha");
        assert_eq!(config.render.theme, ThemeName::Light);
    }

    #[test]
    fn missing_files_fall_back_to_defaults() {
        let config = MeshgenConfig::load(Path::new("does-not-exist.toml")).unwrap();
        assert_eq!(config.clusters.bridges, BridgeRule::default());
        assert_eq!(config.render.travel, 1.2);
    }

    fn from_toml(toml: &str) -> MeshgenConfig {
        Config::builder()
            .add_source(File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    fn env_vars(vars: &[(&str, &str)]) -> Environment {
        let mut map = config::Map::new();
        for (key, value) in vars {
            map.insert(key.to_string(), value.to_string());
        }
        environment().source(Some(map))
    }

    #[test]
    fn partial_schedule_table_keeps_preset_fields() {
        let config = from_toml(
            r#"
            [clusters.schedule]
            base_spacing = 0.2

            [pipeline.schedule]
            min_gap = 0.5
        "#,
        );

        let clusters = config.clusters.schedule_options();
        assert_eq!(clusters.base_spacing, 0.2);
        assert_eq!(clusters.selection, ScheduleOptions::clusters().selection);
        assert_eq!(clusters.gap_range, ScheduleOptions::clusters().gap_range);

        let pipeline = config.pipeline.schedule_options();
        assert_eq!(pipeline.min_gap, 0.5);
        assert_eq!(pipeline.selection, Selection::Stride(3));
        assert_eq!(pipeline.base_spacing, ScheduleOptions::pipeline().base_spacing);
    }

    #[test]
    fn selection_can_be_replaced() {
        let config = from_toml(
            r#"
            [pipeline.schedule]
            selection = { stride = 2 }
        "#,
        );
        assert_eq!(config.pipeline.schedule_options().selection, Selection::Stride(2));
    }

    #[test]
    fn environment_overrides_files() {
        let env = env_vars(&[
            ("MESHGEN_CLUSTERS__SEED", "7"),
            ("MESHGEN_CLUSTERS__SCHEDULE__BASE_SPACING", "0.2"),
            ("MESHGEN_RENDER__THEME", "light"),
        ]);
        let config = MeshgenConfig::load_with(Path::new("does-not-exist.toml"), env).unwrap();

        assert_eq!(config.clusters.seed, 7);
        assert_eq!(config.clusters.schedule_options().base_spacing, 0.2);
        assert_eq!(
            config.clusters.schedule_options().min_gap,
            ScheduleOptions::clusters().min_gap
        );
        assert_eq!(config.render.theme, ThemeName::Light);
        assert_eq!(config.pipeline.seed, presets::SITE_PIPELINE_SEED);
    }

    #[test]
    fn non_positive_travel_is_rejected() {
        for travel in ["0", "-1.5"] {
            let env = env_vars(&[("MESHGEN_RENDER__TRAVEL", travel)]);
            let err = MeshgenConfig::load_with(Path::new("does-not-exist.toml"), env).unwrap_err();
            assert!(
                format!("{err:#}").contains("render.travel"),
                "travel {travel}: {err:#}"
            );
        }

        let render = RenderConfig {
            travel: f64::NAN,
            ..RenderConfig::default()
        };
        assert!(render.check().is_err());
        assert_eq!(RenderConfig::default().check(), Ok(()));
    }
}
