//! Hand-placed cluster and layer tables used by the site diagrams.
//!
//! Coordinates assume a 700 x 420 canvas.

use crate::graph::{Cluster, Layer, Tier};

/// Seed of the hero cluster diagram.
pub const SITE_CLUSTER_SEED: i64 = 42;

/// Seed of the hero cluster diagram's signal schedule.
pub const SITE_CLUSTER_SCHEDULE_SEED: i64 = 1337;

/// Seed of the pipeline diagram.
pub const SITE_PIPELINE_SEED: i64 = 7;

/// Seed of the pipeline diagram's signal schedule.
pub const SITE_PIPELINE_SCHEDULE_SEED: i64 = 99;

/// Canvas the presets are laid out for.
pub const CANVAS_WIDTH: u32 = 700;
pub const CANVAS_HEIGHT: u32 = 420;

/// The "brain" diagram: a core cluster ringed by satellites.
pub fn site_clusters() -> Vec<Cluster> {
    vec![
        Cluster::new("core", (350.0, 210.0), 30.0, 5, Tier::Core).with_label("Core model"),
        Cluster::new("perception", (160.0, 110.0), 60.0, 6, Tier::Primary)
            .with_label("Perception"),
        Cluster::new("memory", (540.0, 110.0), 60.0, 6, Tier::Primary).with_label("Memory"),
        Cluster::new("planning", (160.0, 320.0), 55.0, 5, Tier::Primary).with_label("Planning"),
        Cluster::new("action", (540.0, 320.0), 55.0, 5, Tier::Primary).with_label("Action"),
        Cluster::new("sensors", (45.0, 210.0), 30.0, 4, Tier::Peripheral).with_label("Sensors"),
        Cluster::new("tools", (655.0, 210.0), 30.0, 4, Tier::Peripheral).with_label("Tools"),
    ]
}

/// The retrieval pipeline diagram, left to right.
pub fn site_layers() -> Vec<Layer> {
    vec![
        Layer::new("Ingest", 70.0, 4, 7.0)
            .with_tags(["Docs", "Tickets", "Chats", "Logs"])
            .with_color("#38bdf8"),
        Layer::new("Embed", 210.0, 5, 6.0)
            .with_tags(["Chunk", "Tokenize", "Vector", "Index", "Cache"])
            .with_color("#818cf8"),
        Layer::new("Retrieve", 350.0, 4, 6.0)
            .with_tags(["Search", "Rank", "Filter", "Merge"])
            .with_color("#a78bfa"),
        Layer::new("Reason", 490.0, 3, 7.0)
            .with_tags(["Plan", "Draft", "Verify"])
            .with_color("#f472b6"),
        Layer::new("Respond", 630.0, 2, 8.0)
            .with_tags(["Answer", "Act"])
            .with_color("#fb923c"),
    ]
}
