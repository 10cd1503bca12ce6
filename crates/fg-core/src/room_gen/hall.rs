//! Permissive (hall-like) generators

use serde::{Deserialize, Serialize};

use super::{RoomGen, ShapeKind};
use crate::error::{LayoutError, Result};
use crate::geom::RandRange;

/// A room generator known to be permissive.
///
/// Hall pools hold these so a non-hall shape can never be placed as a hall.
#[derive(Debug, Clone, PartialEq)]
pub struct HallGen(RoomGen);

impl HallGen {
    pub fn new(shape: RoomGen) -> Result<Self> {
        if !shape.is_permissive() {
            return Err(LayoutError::NotPermissive(shape.kind().name()));
        }
        Ok(Self(shape))
    }

    pub fn angled(width: RandRange, height: RandRange) -> Self {
        Self(RoomGen::angled_hall(width, height))
    }

    pub fn single() -> Self {
        Self(RoomGen::single())
    }

    pub fn room_gen(&self) -> &RoomGen {
        &self.0
    }

    pub fn into_gen(self) -> RoomGen {
        self.0
    }
}

impl TryFrom<ShapeKind> for HallGen {
    type Error = LayoutError;

    fn try_from(kind: ShapeKind) -> Result<Self> {
        HallGen::new(RoomGen::new(kind))
    }
}

impl Serialize for HallGen {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for HallGen {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let shape = RoomGen::deserialize(deserializer)?;
        HallGen::new(shape).map_err(serde::de::Error::custom)
    }
}
