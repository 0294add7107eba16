//! Meshgen CLI - render seeded cluster and pipeline diagrams to animated SVG.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use meshgen::config::MeshgenConfig;
use meshgen::render::{self, Frame, GroupStyle, Theme, ThemeName};
use meshgen::stats::GraphStats;
use meshgen::Diagram;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "meshgen")]
#[command(about = "Generate seeded neural-network style diagrams with animated signals")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(long, default_value = "meshgen.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Generate a single diagram
    Generate {
        /// Diagram kind
        #[arg(short, long, value_enum, default_value = "clusters")]
        kind: KindArg,

        /// Layout seed (defaults to the configured seed)
        #[arg(short = 'S', long, conflicts_with = "random_seed")]
        seed: Option<i64>,

        /// Pick a fresh layout seed
        #[arg(long)]
        random_seed: bool,

        /// Seed for the signal schedule (defaults to the configured one)
        #[arg(long)]
        schedule_seed: Option<i64>,

        /// Colour theme
        #[arg(short, long, value_enum)]
        theme: Option<ThemeArg>,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Width of the output
        #[arg(long)]
        width: Option<u32>,

        /// Height of the output
        #[arg(long)]
        height: Option<u32>,

        /// Also save graph and schedule as JSON
        #[arg(long)]
        save_graph: bool,
    },

    /// Generate every kind in every theme
    Showcase {
        /// Output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Print structural statistics of a generated graph
    Inspect {
        /// Diagram kind
        #[arg(short, long, value_enum, default_value = "clusters")]
        kind: KindArg,

        /// Layout seed (defaults to the configured seed)
        #[arg(short = 'S', long)]
        seed: Option<i64>,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum, Debug)]
enum KindArg {
    /// Clusters joined by bridges
    Clusters,
    /// Left-to-right layered pipeline
    Pipeline,
}

impl KindArg {
    fn name(&self) -> &'static str {
        match self {
            KindArg::Clusters => "clusters",
            KindArg::Pipeline => "pipeline",
        }
    }

    fn all() -> Vec<KindArg> {
        vec![KindArg::Clusters, KindArg::Pipeline]
    }
}

#[derive(Clone, Copy, ValueEnum, Debug)]
enum ThemeArg {
    /// Dark background with glowing nodes
    Dark,
    /// Light background, flat nodes
    Light,
}

impl ThemeArg {
    fn to_theme_name(self) -> ThemeName {
        match self {
            ThemeArg::Dark => ThemeName::Dark,
            ThemeArg::Light => ThemeName::Light,
        }
    }
}

/// Per-invocation overrides applied on top of the loaded configuration.
struct Overrides {
    seed: Option<i64>,
    schedule_seed: Option<i64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("meshgen=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = MeshgenConfig::load(Path::new(&cli.config))?;

    match cli.command {
        Commands::Generate {
            kind,
            seed,
            random_seed,
            schedule_seed,
            theme,
            output,
            width,
            height,
            save_graph,
        } => {
            let seed = if random_seed {
                Some(i64::from(rand::random::<u32>()))
            } else {
                seed
            };
            let overrides = Overrides {
                seed,
                schedule_seed,
            };
            let theme = Theme::named(theme.map_or(config.render.theme, ThemeArg::to_theme_name));
            let frame = Frame {
                width: width.unwrap_or(config.render.width),
                height: height.unwrap_or(config.render.height),
                travel: config.render.travel,
            };
            let save_graph = save_graph || config.output.save_graph;

            let output_dir = PathBuf::from(&config.output.directory);
            fs::create_dir_all(&output_dir)
                .with_context(|| format!("creating {}", output_dir.display()))?;

            let used_seed = match kind {
                KindArg::Clusters => overrides.seed.unwrap_or(config.clusters.seed),
                KindArg::Pipeline => overrides.seed.unwrap_or(config.pipeline.seed),
            };
            let output_path = output.unwrap_or_else(|| {
                output_dir.join(format!(
                    "{}_{}_{}.svg",
                    kind.name(),
                    used_seed,
                    theme.name.as_str()
                ))
            });

            println!("Generating {} with seed {}...", kind.name(), used_seed);
            write_kind(
                kind,
                &config,
                &overrides,
                &theme,
                frame,
                &output_path,
                save_graph,
            )?;
        }

        Commands::Showcase { output_dir } => {
            let output_dir = output_dir
                .unwrap_or_else(|| PathBuf::from(&config.output.directory).join("showcase"));
            fs::create_dir_all(&output_dir)
                .with_context(|| format!("creating {}", output_dir.display()))?;

            let frame = Frame {
                width: config.render.width,
                height: config.render.height,
                travel: config.render.travel,
            };
            let overrides = Overrides {
                seed: None,
                schedule_seed: None,
            };

            println!("Generating showcase...");
            for kind in KindArg::all() {
                for theme in [Theme::dark(), Theme::light()] {
                    let filename = format!("{}_{}.svg", kind.name(), theme.name.as_str());
                    let path = output_dir.join(&filename);
                    write_kind(
                        kind,
                        &config,
                        &overrides,
                        &theme,
                        frame,
                        &path,
                        config.output.save_graph,
                    )?;
                }
            }

            println!("Done! Showcase saved to {}", output_dir.display());
        }

        Commands::Inspect { kind, seed, json } => match kind {
            KindArg::Clusters => {
                let mut settings = config.clusters.clone();
                if let Some(seed) = seed {
                    settings.seed = seed;
                }
                let diagram = Diagram::clusters(&settings)?;
                print_inspection(kind, settings.seed, &diagram, json)?;
            }
            KindArg::Pipeline => {
                let mut settings = config.pipeline.clone();
                if let Some(seed) = seed {
                    settings.seed = seed;
                }
                let diagram = Diagram::pipeline(&settings)?;
                print_inspection(kind, settings.seed, &diagram, json)?;
            }
        },
    }

    Ok(())
}

fn write_kind(
    kind: KindArg,
    config: &MeshgenConfig,
    overrides: &Overrides,
    theme: &Theme,
    frame: Frame,
    path: &Path,
    save_graph: bool,
) -> Result<()> {
    match kind {
        KindArg::Clusters => {
            let mut settings = config.clusters.clone();
            if let Some(seed) = overrides.seed {
                settings.seed = seed;
            }
            if let Some(seed) = overrides.schedule_seed {
                settings.schedule_seed = seed;
            }
            let diagram = Diagram::clusters(&settings)?;
            write_diagram(&diagram, theme, frame, path, save_graph)
        }
        KindArg::Pipeline => {
            let mut settings = config.pipeline.clone();
            if let Some(seed) = overrides.seed {
                settings.seed = seed;
            }
            if let Some(seed) = overrides.schedule_seed {
                settings.schedule_seed = seed;
            }
            let diagram = Diagram::pipeline(&settings)?;
            write_diagram(&diagram, theme, frame, path, save_graph)
        }
    }
}

fn write_diagram<G>(
    diagram: &Diagram<G>,
    theme: &Theme,
    frame: Frame,
    path: &Path,
    save_graph: bool,
) -> Result<()>
where
    G: GroupStyle + Serialize,
{
    println!(
        "  {} nodes, {} edges, {} signals",
        diagram.graph.nodes().len(),
        diagram.graph.edges().len(),
        diagram.schedule.len()
    );

    let scene = render::render(&diagram.graph, &diagram.schedule, theme, frame);
    fs::write(path, scene.to_svg()).with_context(|| format!("writing {}", path.display()))?;
    println!("  Created {}", path.display());

    if save_graph {
        let graph_path = path.with_extension("json");
        let graph_json = serde_json::to_string_pretty(diagram)?;
        fs::write(&graph_path, graph_json)
            .with_context(|| format!("writing {}", graph_path.display()))?;
        println!("  Saved graph to {}", graph_path.display());
    }
    Ok(())
}

fn print_inspection<G>(kind: KindArg, seed: i64, diagram: &Diagram<G>, json: bool) -> Result<()>
where
    G: meshgen::graph::Group,
{
    let stats = GraphStats::of(&diagram.graph);
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{} (seed {})", kind.name(), seed);
    println!("  Fingerprint: {}", diagram.graph.fingerprint_hex());
    println!("\nTopology:");
    println!("  Nodes: {} ({} isolated)", stats.nodes, stats.isolated);
    println!(
        "  Edges: {} ({} intra, {} bridge, {} forward)",
        stats.edges, stats.intra_edges, stats.bridge_edges, stats.forward_edges
    );
    println!("  Mean degree: {:.2}", stats.mean_degree);
    println!("  Density: {:.3}", stats.density);
    println!("  Clustering: {:.3}", stats.clustering);
    println!("\nGroups:");
    for group in &stats.groups {
        println!(
            "  {:<12} {:>3} nodes, {:>3} internal, {:>3} external",
            group.label, group.nodes, group.internal_edges, group.external_edges
        );
    }
    println!("\nSignals: {}", diagram.schedule.len());
    Ok(())
}
