//! Branch-growth path generators
//!
//! Both generators grow a plan outward from a seed room. Terminal growth
//! extends dead ends (nodes with at most one neighbour); every placed room
//! adds `branch_ratio` percent to a pending-branch counter, and each full
//! 100 percent spends one growth step on a node that already has two or more
//! neighbours, forking the path. When terminal growth gets stuck the
//! generator forces a branch unless `no_forced_branches` is set. Growth stops
//! once the fill target is met or neither mode can make progress.

mod floor;
mod grid;

pub use floor::{FloorExpansion, FloorPathBranch};
pub use grid::GridPathBranch;

/// Attempts per expansion before giving up on it
pub const MAX_EXPANSION_ATTEMPTS: usize = 10;

/// Pending-branch units that buy one branch
const BRANCH_UNIT: i32 = 100;
