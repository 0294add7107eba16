//! Animation schedule: which edges carry travelling signals, and when.
//!
//! The schedule is computed once per graph and then looped forever by the
//! renderer. Every value is derived from the edge order and a seed, so
//! rebuilding it for the same graph gives the same timings.

use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::rng::RandomStream;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How edges are picked for animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    /// One draw per edge; the edge is animated when the draw is below `p`.
    Threshold(f64),
    /// Every n-th edge, starting with the first. No draw is spent on
    /// selection. A stride of zero selects nothing.
    Stride(usize),
}

/// Timing parameters, all in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOptions {
    pub selection: Selection,
    /// Delay added per edge index.
    pub base_spacing: f64,
    /// Upper bound of the random extra delay.
    pub jitter_range: f64,
    /// Minimum pause between two passes of the same signal.
    pub min_gap: f64,
    /// Upper bound of the random extra pause.
    pub gap_range: f64,
}

impl ScheduleOptions {
    /// Timings used for clustered diagrams.
    pub fn clusters() -> Self {
        Self {
            selection: Selection::Threshold(0.4),
            base_spacing: 0.15,
            jitter_range: 0.6,
            min_gap: 1.5,
            gap_range: 3.0,
        }
    }

    /// Timings used for pipeline diagrams.
    pub fn pipeline() -> Self {
        Self {
            selection: Selection::Stride(3),
            base_spacing: 0.12,
            jitter_range: 0.4,
            min_gap: 1.0,
            gap_range: 2.0,
        }
    }

    pub fn check(&self) -> Result<()> {
        if let Selection::Threshold(p) = self.selection {
            if !(0.0..=1.0).contains(&p) {
                return Err(GraphError::InvalidParameter {
                    name: "schedule.selection.threshold",
                    value: p,
                });
            }
        }
        let timings = [
            ("schedule.base_spacing", self.base_spacing),
            ("schedule.jitter_range", self.jitter_range),
            ("schedule.min_gap", self.min_gap),
            ("schedule.gap_range", self.gap_range),
        ];
        for (name, value) in timings {
            if !value.is_finite() || value < 0.0 {
                return Err(GraphError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self::clusters()
    }
}

/// Partial timings read from configuration.
///
/// Clustered and pipeline diagrams start from different presets, so unset
/// fields are filled from whichever preset the section belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct ScheduleOverrides {
    #[serde(default)]
    pub selection: Option<Selection>,

    #[serde(default)]
    pub base_spacing: Option<f64>,

    #[serde(default)]
    pub jitter_range: Option<f64>,

    #[serde(default)]
    pub min_gap: Option<f64>,

    #[serde(default)]
    pub gap_range: Option<f64>,
}

impl ScheduleOverrides {
    /// `preset` with every configured field replaced.
    pub fn over(&self, preset: ScheduleOptions) -> ScheduleOptions {
        ScheduleOptions {
            selection: self.selection.unwrap_or(preset.selection),
            base_spacing: self.base_spacing.unwrap_or(preset.base_spacing),
            jitter_range: self.jitter_range.unwrap_or(preset.jitter_range),
            min_gap: self.min_gap.unwrap_or(preset.min_gap),
            gap_range: self.gap_range.unwrap_or(preset.gap_range),
        }
    }
}

/// Timing for one animated edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScheduledSignal {
    /// Index of the edge in the graph's edge list.
    pub edge_id: usize,
    /// Seconds before the first pass starts.
    pub delay: f64,
    /// Seconds of pause after each pass.
    pub repeat_delay: f64,
}

impl ScheduledSignal {
    /// Length of one loop for a pass that takes `travel` seconds.
    pub fn period(&self, travel: f64) -> f64 {
        travel + self.repeat_delay
    }

    /// Progress along the edge in `[0, 1)` at loop time `t`, or `None` while
    /// the signal is waiting.
    pub fn progress_at(&self, t: f64, travel: f64) -> Option<f64> {
        if t < self.delay || travel <= 0.0 {
            return None;
        }
        let phase = (t - self.delay) % self.period(travel);
        (phase < travel).then(|| phase / travel)
    }
}

/// Ordered signal timings for one graph instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schedule {
    signals: Vec<ScheduledSignal>,
}

impl Schedule {
    pub fn signals(&self) -> &[ScheduledSignal] {
        &self.signals
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledSignal> {
        self.signals.iter()
    }

    /// Signals in flight at loop time `t`, with their progress.
    pub fn active_at(&self, t: f64, travel: f64) -> Vec<(&ScheduledSignal, f64)> {
        self.signals
            .iter()
            .filter_map(|s| s.progress_at(t, travel).map(|p| (s, p)))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a ScheduledSignal;
    type IntoIter = std::slice::Iter<'a, ScheduledSignal>;

    fn into_iter(self) -> Self::IntoIter {
        self.signals.iter()
    }
}

/// Pick animated edges and assign their timings.
///
/// Edges are visited in stored order. With [`Selection::Threshold`] each
/// edge spends one draw on selection; every selected edge then spends one
/// draw on delay jitter and one on its repeat gap.
pub fn build_schedule<G>(graph: &Graph<G>, seed: i64, options: &ScheduleOptions) -> Schedule {
    let mut rng = RandomStream::new(seed);
    let mut signals = Vec::new();

    for index in 0..graph.edges().len() {
        let selected = match options.selection {
            Selection::Threshold(p) => rng.next_f64() < p,
            Selection::Stride(n) => index.checked_rem(n) == Some(0),
        };
        if !selected {
            continue;
        }

        let delay = index as f64 * options.base_spacing + rng.next_f64() * options.jitter_range;
        let repeat_delay = options.min_gap + rng.next_f64() * options.gap_range;
        signals.push(ScheduledSignal {
            edge_id: index,
            delay,
            repeat_delay,
        });
    }

    debug!(
        seed,
        edges = graph.edges().len(),
        signals = signals.len(),
        "built animation schedule"
    );

    Schedule { signals }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::cluster::ClusterGenerator;
    use crate::generators::pipeline::PipelineGenerator;
    use crate::generators::Generator;
    use crate::presets;

    #[test]
    fn schedule_is_stable_for_one_graph() {
        let graph = ClusterGenerator::new(presets::site_clusters()).generate(42);
        let a = build_schedule(&graph, 9, &ScheduleOptions::clusters());
        let b = build_schedule(&graph, 9, &ScheduleOptions::clusters());
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn stride_selects_every_third_edge() {
        let graph = PipelineGenerator::new(presets::site_layers()).generate(42);
        let schedule = build_schedule(&graph, 1, &ScheduleOptions::pipeline());
        let ids: Vec<usize> = schedule.iter().map(|s| s.edge_id).collect();
        let expected: Vec<usize> = (0..graph.edges().len()).step_by(3).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn zero_stride_selects_nothing() {
        let graph = PipelineGenerator::new(presets::site_layers()).generate(42);
        let options = ScheduleOptions {
            selection: Selection::Stride(0),
            ..ScheduleOptions::pipeline()
        };
        assert!(build_schedule(&graph, 1, &options).is_empty());
    }

    #[test]
    fn threshold_extremes() {
        let graph = ClusterGenerator::new(presets::site_clusters()).generate(42);
        let all = ScheduleOptions {
            selection: Selection::Threshold(1.0),
            ..ScheduleOptions::clusters()
        };
        let none = ScheduleOptions {
            selection: Selection::Threshold(0.0),
            ..ScheduleOptions::clusters()
        };
        assert_eq!(build_schedule(&graph, 4, &all).len(), graph.edges().len());
        assert!(build_schedule(&graph, 4, &none).is_empty());
    }

    #[test]
    fn timings_stay_in_their_ranges() {
        let graph = ClusterGenerator::new(presets::site_clusters()).generate(42);
        let options = ScheduleOptions::clusters();
        for signal in &build_schedule(&graph, 5, &options) {
            let base = signal.edge_id as f64 * options.base_spacing;
            assert!(signal.delay >= base && signal.delay < base + options.jitter_range);
            assert!(signal.repeat_delay >= options.min_gap);
            assert!(signal.repeat_delay < options.min_gap + options.gap_range);
        }
    }

    #[test]
    fn signals_keep_edge_order() {
        let graph = ClusterGenerator::new(presets::site_clusters()).generate(3);
        let schedule = build_schedule(&graph, 3, &ScheduleOptions::clusters());
        let ids: Vec<usize> = schedule.iter().map(|s| s.edge_id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
        assert!(ids.iter().all(|&id| id < graph.edges().len()));
    }

    #[test]
    fn progress_loops_with_pause() {
        let signal = ScheduledSignal {
            edge_id: 0,
            delay: 1.0,
            repeat_delay: 2.0,
        };
        assert_eq!(signal.progress_at(0.5, 1.0), None);
        assert_eq!(signal.progress_at(1.5, 1.0), Some(0.5));
        assert_eq!(signal.progress_at(2.5, 1.0), None);
        assert_eq!(signal.progress_at(4.25, 1.0), Some(0.25));
        assert_eq!(signal.progress_at(4.25, 0.0), None);
    }

    #[test]
    fn active_at_filters_waiting_signals() {
        let graph = ClusterGenerator::new(presets::site_clusters()).generate(42);
        let schedule = build_schedule(&graph, 2, &ScheduleOptions::clusters());
        let active = schedule.active_at(0.0, 1.2);
        assert!(active.iter().all(|(s, p)| s.delay <= 0.0 && *p < 1.0));
        let later = schedule.active_at(1_000.0, 1.2);
        assert!(later.iter().all(|(_, p)| (0.0..1.0).contains(p)));
    }

    #[test]
    fn check_rejects_negative_timings() {
        let options = ScheduleOptions {
            min_gap: -1.0,
            ..ScheduleOptions::clusters()
        };
        assert_eq!(
            options.check(),
            Err(GraphError::InvalidParameter {
                name: "schedule.min_gap",
                value: -1.0
            })
        );
        assert_eq!(ScheduleOptions::pipeline().check(), Ok(()));
    }

    #[test]
    fn overrides_fill_gaps_from_the_preset() {
        let overrides = ScheduleOverrides {
            base_spacing: Some(0.2),
            ..ScheduleOverrides::default()
        };
        let options = overrides.over(ScheduleOptions::pipeline());
        assert_eq!(options.base_spacing, 0.2);
        assert_eq!(options.selection, Selection::Stride(3));
        assert_eq!(options.gap_range, ScheduleOptions::pipeline().gap_range);

        assert_eq!(
            ScheduleOverrides::default().over(ScheduleOptions::clusters()),
            ScheduleOptions::clusters()
        );
    }
}
