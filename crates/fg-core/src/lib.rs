//! fg-core: room and hall floor plans for procedural level layout
//!
//! Two plan representations and the algorithms that operate on them:
//!
//! - [`floor::FloorPlan`]: a graph of placed room and hall rectangles
//! - [`grid::GridPlan`]: a coarse grid of cells joined by hall edges, which
//!   materializes into a `FloorPlan`
//! - [`path`]: randomized branch growth for both plans
//! - [`connect`]: shortcut insertion between dead ends and special-room
//!   replacement by border matching
//!
//! Nothing here draws random numbers on its own; every operation borrows a
//! [`fg_rng::LayoutRng`] and the order of its draws is fixed.

pub mod config;
pub mod connect;
pub mod error;
pub mod floor;
pub mod geom;
pub mod grid;
pub mod path;
pub mod room_gen;
pub mod spawn;
pub mod step;
pub mod tags;
pub mod tile;

pub use error::{LayoutError, Result};
pub use floor::{FloorPlan, NodeId, NodeKind, NodeRef, PlanNode};
pub use geom::{Axis4, Dir4, IntRange, Loc, RandRange, Rect};
pub use grid::GridPlan;
pub use room_gen::{HallGen, RoomGen, ShapeKind};
pub use spawn::SpawnList;
pub use step::{FloorStep, GridStep};
pub use tags::{NodeFilter, NodeTags, TagFilter};
pub use tile::{Tile, TileGrid, TileTarget};
