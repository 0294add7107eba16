//! Graph generators - each turns a literal group table and a seed into a graph.

pub mod cluster;
pub mod pipeline;

use crate::error::Result;
use crate::graph::{Graph, Group};

/// Trait for all layout generators.
pub trait Generator {
    /// Grouping the generated graph carries (clusters or layers).
    type Group: Group;

    /// Name of this layout style.
    fn name(&self) -> &'static str;

    /// Check the group table and parameters before generating.
    ///
    /// Tables compiled into the binary always pass; tables read from
    /// configuration files may not.
    fn check(&self) -> Result<()>;

    /// Build the graph for `seed`.
    ///
    /// Pure in `(self, seed)`: the same generator and seed always produce an
    /// identical graph.
    fn generate(&self, seed: i64) -> Graph<Self::Group>;
}
