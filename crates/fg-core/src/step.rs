//! Step interfaces
//!
//! A step mutates one plan in place, drawing from the shared RNG. Steps are
//! run one after another by the caller; none of them re-enter the plan.

use core::fmt;

use fg_rng::LayoutRng;

use crate::error::Result;
use crate::floor::FloorPlan;
use crate::grid::GridPlan;

/// A step over the fine-grained plan
pub trait FloorStep: fmt::Debug {
    fn apply(&self, plan: &mut FloorPlan, rng: &mut dyn LayoutRng) -> Result<()>;
}

/// A step over the coarse grid
pub trait GridStep: fmt::Debug {
    fn apply(&self, grid: &mut GridPlan, rng: &mut dyn LayoutRng) -> Result<()>;
}
