//! Post-growth repair steps
//!
//! [`ConnectBranchStep`] closes loops by joining dead ends to whatever they
//! face across open floor. [`SpecialRoomStep`] swaps a room for a special
//! shape placed to share as much open border with the old neighbours as it
//! can, patching the rest with support halls.

mod branch;
mod special;

pub use branch::{ConnectBranchStep, ShortcutCandidate, branch_arms};
pub use special::{SpecialRoomStep, place_special_room};
