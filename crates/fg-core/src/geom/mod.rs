//! Integer geometry used by every plan
//!
//! Points, half-open rectangles, spans and the four cardinal directions.

mod dir;
mod loc;
mod range;
mod rect;

pub use dir::{Axis4, Dir4};
pub use loc::Loc;
pub use range::{IntRange, RandRange};
pub use rect::Rect;
