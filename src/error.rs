//! Error types for graph construction and configuration.

use thiserror::Error;

/// Invariant violations and invalid configuration.
///
/// Generated graphs are checked against these before they are handed out; a
/// violation there is a bug in the generator, so generators panic with the
/// error message. Configuration read from files is checked with the same
/// type and reported back to the caller.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Node ids must be `0..N` in storage order.
    #[error("node at position {position} has id {id}; ids must be dense and ordered")]
    NonDenseIds { position: usize, id: usize },

    /// A node names a group that does not exist.
    #[error("node {node} references unknown group {group}")]
    UnknownGroup { node: usize, group: usize },

    /// Nodes must be laid out group by group, in group order.
    #[error("node {node} (group {group}) follows a node of a later group")]
    GroupOrder { node: usize, group: usize },

    /// A group holds a different number of nodes than configured.
    #[error("group {group} ({label}) has {actual} nodes, expected {expected}")]
    GroupSizeMismatch {
        group: usize,
        label: String,
        expected: usize,
        actual: usize,
    },

    /// An edge endpoint does not exist.
    #[error("edge {edge} references missing node {node}")]
    DanglingEdge { edge: usize, node: usize },

    /// An edge starts and ends at the same node.
    #[error("edge {edge} is a self-loop on node {node}")]
    SelfLoop { edge: usize, node: usize },

    /// An intra-cluster edge joins two different clusters.
    #[error("intra-cluster edge {edge} joins groups {from_group} and {to_group}")]
    IntraCrossesGroups {
        edge: usize,
        from_group: usize,
        to_group: usize,
    },

    /// A bridge edge stays inside one cluster.
    #[error("bridge edge {edge} stays inside group {group}")]
    BridgeWithinGroup { edge: usize, group: usize },

    /// A pipeline edge does not go from layer i to layer i + 1.
    #[error("forward edge {edge} goes from layer {from_layer} to layer {to_layer}")]
    ForwardSkipsLayer {
        edge: usize,
        from_layer: usize,
        to_layer: usize,
    },

    /// A cluster table entry is unusable.
    #[error("invalid cluster '{label}': {reason}")]
    InvalidCluster { label: String, reason: String },

    /// A layer table entry is unusable.
    #[error("invalid layer '{label}': {reason}")]
    InvalidLayer { label: String, reason: String },

    /// A numeric generator or scheduler parameter is out of range.
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, GraphError>;
