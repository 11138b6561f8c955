//! Roads, towns, farms and walls.

pub mod features;
pub mod roads;
pub mod walls;

pub use features::{create_features, grow_feature, FeatureKind};
pub use roads::{create_road, create_roads};
pub use walls::create_walls;

/// How much of a length budget a placement phase managed to spend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct BudgetOutcome {
    pub budget: usize,
    pub budget_remaining: usize,
    /// Roads or stamps that placed at least one segment.
    pub placed: usize,
}
