//! Structural faults raised by plan mutations

use thiserror::Error;

use crate::floor::NodeRef;
use crate::geom::{Loc, Rect};

/// Errors returned by mutating plan operations.
///
/// These are caller bugs when they escape a randomized search: every
/// mutating call that can fail has a non-mutating `can_*` pre-check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("rect {rect} lies outside the {size} floor")]
    OutOfBounds { rect: Rect, size: Loc },

    #[error("rect {rect} overlaps existing room {index}")]
    RoomCollision { rect: Rect, index: usize },

    #[error("rect {rect} overlaps existing hall {index}")]
    HallCollision { rect: Rect, index: usize },

    #[error("hall at {loc} would split room {index}")]
    HallInsideRoom { loc: Loc, index: usize },

    #[error("invalid hall direction from {loc}")]
    InvalidDirection { loc: Loc },

    #[error("node {0:?} does not exist")]
    MissingNode(NodeRef),

    #[error("grid cell {0} holds no room")]
    NoRoomAtCell(Loc),

    #[error("shape {0} is not permissive and cannot be used as a hall")]
    NotPermissive(&'static str),

    #[error("config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for LayoutError {
    fn from(e: serde_json::Error) -> Self {
        LayoutError::Config(e.to_string())
    }
}

impl From<std::io::Error> for LayoutError {
    fn from(e: std::io::Error) -> Self {
        LayoutError::Config(e.to_string())
    }
}

pub type Result<T> = core::result::Result<T, LayoutError>;
