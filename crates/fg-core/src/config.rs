//! Step configuration
//!
//! Every step is a plain serde struct with defaults, so a configuration only
//! names the fields it changes:
//!
//! ```json
//! { "step": "connect_branch", "connect_percent": 30 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::connect::{ConnectBranchStep, SpecialRoomStep};
use crate::error::Result;
use crate::path::{FloorPathBranch, GridPathBranch};
use crate::step::{FloorStep, GridStep};

/// Any configurable step, tagged by `"step"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepConfig {
    FloorPathBranch(FloorPathBranch),
    GridPathBranch(GridPathBranch),
    ConnectBranch(ConnectBranchStep),
    SpecialRoom(SpecialRoomStep),
}

impl StepConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a JSON array of steps, in run order
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn name(&self) -> &'static str {
        match self {
            StepConfig::FloorPathBranch(_) => "floor_path_branch",
            StepConfig::GridPathBranch(_) => "grid_path_branch",
            StepConfig::ConnectBranch(_) => "connect_branch",
            StepConfig::SpecialRoom(_) => "special_room",
        }
    }

    /// The step as a floor step, `None` for grid steps
    pub fn into_floor_step(self) -> Option<Box<dyn FloorStep>> {
        match self {
            StepConfig::FloorPathBranch(s) => Some(Box::new(s)),
            StepConfig::ConnectBranch(s) => Some(Box::new(s)),
            StepConfig::SpecialRoom(s) => Some(Box::new(s)),
            StepConfig::GridPathBranch(_) => None,
        }
    }

    /// The step as a grid step, `None` for floor steps
    pub fn into_grid_step(self) -> Option<Box<dyn GridStep>> {
        match self {
            StepConfig::GridPathBranch(s) => Some(Box::new(s)),
            _ => None,
        }
    }
}

impl From<FloorPathBranch> for StepConfig {
    fn from(step: FloorPathBranch) -> Self {
        StepConfig::FloorPathBranch(step)
    }
}

impl From<GridPathBranch> for StepConfig {
    fn from(step: GridPathBranch) -> Self {
        StepConfig::GridPathBranch(step)
    }
}

impl From<ConnectBranchStep> for StepConfig {
    fn from(step: ConnectBranchStep) -> Self {
        StepConfig::ConnectBranch(step)
    }
}

impl From<SpecialRoomStep> for StepConfig {
    fn from(step: SpecialRoomStep) -> Self {
        StepConfig::SpecialRoom(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LayoutError;
    use crate::geom::RandRange;
    use crate::room_gen::RoomGen;
    use crate::tags::{NodeTags, TagFilter};

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = StepConfig::from_json(r#"{ "step": "connect_branch", "connect_percent": 30 }"#).unwrap();
        let StepConfig::ConnectBranch(step) = config else {
            panic!("wrong step: {config:?}");
        };
        assert_eq!(step.connect_percent, 30);
        assert_eq!(step.tags, NodeTags::SHORTCUT);
        assert_eq!(step.filter, TagFilter::refuse(NodeTags::IMMUTABLE));
        assert_eq!(step.halls.len(), 1);
    }

    #[test]
    fn test_full_floor_branch() {
        let json = r#"{
            "step": "floor_path_branch",
            "fill_percent": { "min": 40, "max": 41 },
            "branch_ratio": { "min": 25, "max": 26 },
            "rooms": [
                [{ "shape": "square", "width": { "min": 3, "max": 6 }, "height": { "min": 3, "max": 6 } }, 3],
                [{ "shape": "round", "width": { "min": 5, "max": 8 }, "height": { "min": 5, "max": 8 } }, 1]
            ],
            "halls": [[{ "shape": "single" }, 1]]
        }"#;
        let StepConfig::FloorPathBranch(step) = StepConfig::from_json(json).unwrap() else {
            panic!("wrong step");
        };
        assert_eq!(step.fill_percent, RandRange::fixed(40));
        assert_eq!(step.branch_ratio, RandRange::fixed(25));
        assert_eq!(step.rooms.len(), 2);
        assert_eq!(step.rooms.total_weight(), 4);
        assert_eq!(
            step.rooms.get(0),
            Some(&RoomGen::square(RandRange::new(3, 6), RandRange::new(3, 6)))
        );
        assert_eq!(step.halls.len(), 1);
    }

    #[test]
    fn test_square_in_hall_pool_is_rejected() {
        let json = r#"{
            "step": "grid_path_branch",
            "halls": [[{ "shape": "square", "width": { "min": 1, "max": 2 }, "height": { "min": 1, "max": 2 } }, 1]]
        }"#;
        assert!(matches!(StepConfig::from_json(json), Err(LayoutError::Config(_))));
    }

    #[test]
    fn test_unknown_step() {
        let err = StepConfig::from_json(r#"{ "step": "teleport" }"#).unwrap_err();
        assert!(err.to_string().starts_with("config error"));
    }

    #[test]
    fn test_step_kinds() {
        let floor = StepConfig::from(SpecialRoomStep::default());
        assert_eq!(floor.name(), "special_room");
        assert!(floor.clone().into_grid_step().is_none());
        assert!(floor.into_floor_step().is_some());

        let grid = StepConfig::from(GridPathBranch::default());
        assert!(grid.clone().into_floor_step().is_none());
        assert!(grid.into_grid_step().is_some());
    }

    #[test]
    fn test_json_survives_a_trip() {
        let config = StepConfig::from(ConnectBranchStep {
            connect_percent: 80,
            ..Default::default()
        });
        let json = config.to_json().unwrap();
        assert!(json.contains("\"step\": \"connect_branch\""));
        assert_eq!(StepConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_step_list() {
        let steps = StepConfig::list_from_json(
            r#"[{ "step": "floor_path_branch" }, { "step": "connect_branch" }, { "step": "special_room" }]"#,
        )
        .unwrap();
        let names: Vec<_> = steps.iter().map(StepConfig::name).collect();
        assert_eq!(names, ["floor_path_branch", "connect_branch", "special_room"]);
    }

    #[test]
    fn test_missing_file() {
        let err = StepConfig::from_json_file("/nonexistent/steps.json").unwrap_err();
        assert!(matches!(err, LayoutError::Config(_)));
    }
}
