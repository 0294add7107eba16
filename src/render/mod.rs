//! Reference rendering layer.
//!
//! Maps a generated graph and its schedule to a flat list of visual
//! primitives. Generation never looks at anything in here: themes, glows and
//! captions are presentation only, and another target (canvas, a UI
//! framework) can consume the same [`Scene`] or skip it entirely and read the
//! graph directly.

pub mod palette;
mod svg;

use crate::graph::{Cluster, EdgeKind, Graph, Group, Layer, Node, Tier};
use crate::schedule::Schedule;
use serde::{Deserialize, Serialize};

/// Built-in colour schemes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
}

impl ThemeName {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeName::Dark => "dark",
            ThemeName::Light => "light",
        }
    }
}

/// Colours and effects for one colour scheme.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: ThemeName,
    pub background: String,
    pub edge_color: String,
    pub bridge_color: String,
    pub label_color: String,
    pub pulse_color: String,
    /// Base hue per tier (core, primary, peripheral).
    pub tier_hues: [f64; 3],
    pub saturation: f64,
    pub lightness: f64,
    /// Draw blurred halos behind nodes.
    pub glow: bool,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: ThemeName::Dark,
            background: "#05070d".to_string(),
            edge_color: "#94a3b8".to_string(),
            bridge_color: "#c4b5fd".to_string(),
            label_color: "#e2e8f0".to_string(),
            pulse_color: "#fde68a".to_string(),
            tier_hues: [190.0, 215.0, 255.0],
            saturation: 0.8,
            lightness: 0.62,
            glow: true,
        }
    }

    pub fn light() -> Self {
        Self {
            name: ThemeName::Light,
            background: "#f8fafc".to_string(),
            edge_color: "#64748b".to_string(),
            bridge_color: "#7c3aed".to_string(),
            label_color: "#0f172a".to_string(),
            pulse_color: "#f59e0b".to_string(),
            tier_hues: [195.0, 220.0, 260.0],
            saturation: 0.7,
            lightness: 0.45,
            glow: false,
        }
    }

    pub fn named(name: ThemeName) -> Self {
        match name {
            ThemeName::Dark => Self::dark(),
            ThemeName::Light => Self::light(),
        }
    }

    fn tier_hue(&self, tier: Tier) -> f64 {
        self.tier_hues[tier.index() as usize]
    }

    fn is_light(&self) -> bool {
        self.name == ThemeName::Light
    }
}

/// How a group table entry is painted.
pub trait GroupStyle: Group {
    /// Fill colour and hue (for halos) of this group's nodes.
    fn paint(&self, theme: &Theme) -> (String, f64);
}

impl GroupStyle for Cluster {
    fn paint(&self, theme: &Theme) -> (String, f64) {
        let hue = palette::nudged_hue(theme.tier_hue(self.tier), &self.id);
        // Core clusters are drawn slightly brighter.
        let lift = if self.tier == Tier::Core { 0.06 } else { 0.0 };
        (
            palette::hsl_to_hex(hue, theme.saturation, theme.lightness + lift),
            hue,
        )
    }
}

impl GroupStyle for Layer {
    fn paint(&self, theme: &Theme) -> (String, f64) {
        (self.color.clone(), palette::nudged_hue(theme.tier_hue(Tier::Primary), &self.label))
    }
}

/// Output frame and animation pacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Seconds a signal takes to cross its edge.
    pub travel: f64,
}

/// Text alignment relative to the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
}

/// One drawable element.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: String,
        width: f64,
        opacity: f64,
        dashed: bool,
    },
    Glow {
        cx: f64,
        cy: f64,
        r: f64,
        color: String,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: String,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        color: String,
        size: f64,
        anchor: Anchor,
    },
    /// A dot travelling along an edge, looping forever.
    Pulse {
        edge_id: usize,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        r: f64,
        color: String,
        delay: f64,
        travel: f64,
        period: f64,
    },
}

/// Everything needed to draw one diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub background: String,
    pub glow: bool,
    pub primitives: Vec<Primitive>,
}

impl Scene {
    pub fn count(&self, pred: impl Fn(&Primitive) -> bool) -> usize {
        self.primitives.iter().filter(|p| pred(p)).count()
    }
}

/// Map a graph and its schedule to primitives, back to front: edges, halos,
/// nodes, node captions, group captions, pulses.
pub fn render<G: GroupStyle>(
    graph: &Graph<G>,
    schedule: &Schedule,
    theme: &Theme,
    frame: Frame,
) -> Scene {
    let paints: Vec<(String, f64)> = graph.groups().iter().map(|g| g.paint(theme)).collect();
    let mut primitives = Vec::new();

    for edge in graph.edges() {
        let (Some(a), Some(b)) = (graph.node(edge.from), graph.node(edge.to)) else {
            continue;
        };
        let bridge = edge.kind == EdgeKind::Bridge;
        primitives.push(Primitive::Line {
            x1: a.x,
            y1: a.y,
            x2: b.x,
            y2: b.y,
            stroke: if bridge {
                theme.bridge_color.clone()
            } else {
                theme.edge_color.clone()
            },
            width: if bridge { 1.3 } else { 0.9 },
            opacity: if bridge { 0.55 } else { 0.35 },
            dashed: bridge,
        });
    }

    if theme.glow {
        for node in graph.nodes() {
            let (_, hue) = &paints[node.group];
            primitives.push(Primitive::Glow {
                cx: node.x,
                cy: node.y,
                r: node.size * 2.6,
                color: palette::glow_color(*hue, theme.is_light()),
            });
        }
    }

    for node in graph.nodes() {
        primitives.push(Primitive::Circle {
            cx: node.x,
            cy: node.y,
            r: node.size,
            fill: paints[node.group].0.clone(),
        });
    }

    for node in graph.nodes() {
        if let Some(label) = &node.label {
            primitives.push(Primitive::Text {
                x: node.x + node.size + 6.0,
                y: node.y + 4.0,
                text: label.clone(),
                color: theme.label_color.clone(),
                size: 10.0,
                anchor: Anchor::Start,
            });
        }
    }

    for (index, group) in graph.groups().iter().enumerate() {
        if let Some((x, y)) = caption_anchor(graph.members(index)) {
            primitives.push(Primitive::Text {
                x,
                y,
                text: group.label().to_string(),
                color: theme.label_color.clone(),
                size: 12.0,
                anchor: Anchor::Middle,
            });
        }
    }

    for signal in schedule {
        let Some((a, b)) = graph.endpoints(signal.edge_id) else {
            continue;
        };
        primitives.push(Primitive::Pulse {
            edge_id: signal.edge_id,
            x1: a.x,
            y1: a.y,
            x2: b.x,
            y2: b.y,
            r: 2.2,
            color: theme.pulse_color.clone(),
            delay: signal.delay,
            travel: frame.travel,
            period: signal.period(frame.travel),
        });
    }

    Scene {
        width: frame.width,
        height: frame.height,
        background: theme.background.clone(),
        glow: theme.glow,
        primitives,
    }
}

/// Centred above the group's topmost node.
fn caption_anchor<'a>(members: impl Iterator<Item = &'a Node>) -> Option<(f64, f64)> {
    let (mut sx, mut top, mut count) = (0.0, f64::INFINITY, 0usize);
    for node in members {
        sx += node.x;
        top = top.min(node.y - node.size);
        count += 1;
    }
    (count > 0).then(|| (sx / count as f64, top - 10.0))
}
